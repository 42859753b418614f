//! Mail/PDF collaborator
//!
//! The "download summary" action renders a project summary document and
//! mails it to the leader. Rendering and delivery are external concerns
//! behind [`SummaryMailer`]; the default implementation renders a minimal
//! document and logs the send, which keeps single-host deployments and
//! tests free of SMTP configuration.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Everything the summary document needs, denormalised
#[derive(Debug, Clone)]
pub struct ProjectSummaryData {
    pub title: String,
    pub leader_name: String,
    pub leader_email: String,
    pub team_members: Vec<String>,
    pub components: String,
    pub summary: String,
}

/// Mail/PDF collaborator errors
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Document rendering failed
    #[error("Failed to render summary document: {0}")]
    Render(String),

    /// Mail delivery failed
    #[error("Failed to send mail: {0}")]
    Send(String),
}

/// Renders summary documents and delivers them by mail
#[async_trait]
pub trait SummaryMailer: Send + Sync {
    /// Render the summary document for a project
    async fn render_summary_pdf(&self, data: &ProjectSummaryData) -> Result<Vec<u8>, NotifyError>;

    /// Send a document as an attachment
    async fn send_with_attachment(
        &self,
        to: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<(), NotifyError>;
}

/// Default mailer: renders a plain-text document and logs the delivery
pub struct LoggingMailer;

#[async_trait]
impl SummaryMailer for LoggingMailer {
    async fn render_summary_pdf(&self, data: &ProjectSummaryData) -> Result<Vec<u8>, NotifyError> {
        let mut doc = String::new();
        doc.push_str(&format!("Project: {}\n", data.title));
        doc.push_str(&format!(
            "Leader: {} <{}>\n",
            data.leader_name, data.leader_email
        ));
        doc.push_str(&format!("Team: {}\n", data.team_members.join(", ")));
        doc.push_str(&format!("Components: {}\n", data.components));
        doc.push_str("\n");
        doc.push_str(&data.summary);
        doc.push('\n');

        Ok(doc.into_bytes())
    }

    async fn send_with_attachment(
        &self,
        to: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<(), NotifyError> {
        info!(
            "Would mail {} ({} bytes) to {}",
            filename,
            bytes.len(),
            to
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rendered_document_contains_project_fields() {
        let data = ProjectSummaryData {
            title: "Line Follower Robot".to_string(),
            leader_name: "Alice".to_string(),
            leader_email: "alice@poornima.org".to_string(),
            team_members: vec!["Bob".to_string(), "Carol".to_string()],
            components: "Arduino, L298".to_string(),
            summary: "Built and tested".to_string(),
        };

        let bytes = LoggingMailer
            .render_summary_pdf(&data)
            .await
            .expect("render failed");
        let text = String::from_utf8(bytes).expect("not utf-8");

        assert!(text.contains("Line Follower Robot"));
        assert!(text.contains("alice@poornima.org"));
        assert!(text.contains("Bob, Carol"));
        assert!(text.contains("Built and tested"));
    }
}
