//! Audit log emitter
//!
//! Privileged mutations call [`record`] after the primary write. Logging is
//! best-effort by contract: a failed append is reported to the local log
//! and swallowed, never propagated to the caller, so the business
//! operation that triggered it is unaffected.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, NotSet, Set};
use serde_json::Value;
use tracing::warn;

use idealab_db::entities::admin_log::{self, AdminLogCategory};

/// Append one audit record; failures are swallowed
pub async fn record(
    db: &DatabaseConnection,
    category: AdminLogCategory,
    message: impl Into<String>,
    metadata: Option<Value>,
) {
    let message = message.into();
    let entry = admin_log::ActiveModel {
        id: NotSet,
        category: Set(category),
        message: Set(message.clone()),
        metadata: Set(metadata.map(|m| m.to_string())),
        created_at: Set(Utc::now()),
    };

    if let Err(e) = entry.insert(db).await {
        warn!("Failed to append admin log ({}): {}", message, e);
    }
}
