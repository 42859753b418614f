//! API request/response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use idealab_db::entities::{achievement, admin_log, overlord, project, showcase_project, user};

/// User role as exposed over the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Student who creates and submits projects
    Student,
    /// Teacher reviewing assigned projects
    Teacher,
    /// Administrator
    Admin,
    /// Super administrator
    SuperAdmin,
}

impl From<user::UserRole> for UserRole {
    fn from(role: user::UserRole) -> Self {
        match role {
            user::UserRole::Student => Self::Student,
            user::UserRole::Teacher => Self::Teacher,
            user::UserRole::Admin => Self::Admin,
            user::UserRole::SuperAdmin => Self::SuperAdmin,
        }
    }
}

/// Project lifecycle status as exposed over the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Created but not yet submitted
    Partial,
    /// Completed with summary and photo
    Submitted,
}

impl From<project::ProjectStatus> for ProjectStatus {
    fn from(status: project::ProjectStatus) -> Self {
        match status {
            project::ProjectStatus::Partial => Self::Partial,
            project::ProjectStatus::Submitted => Self::Submitted,
        }
    }
}

impl From<ProjectStatus> for project::ProjectStatus {
    fn from(status: ProjectStatus) -> Self {
        match status {
            ProjectStatus::Partial => Self::Partial,
            ProjectStatus::Submitted => Self::Submitted,
        }
    }
}

/// Achievement category as exposed over the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AchievementKind {
    /// Achievement by a student
    Student,
    /// Achievement by a faculty member
    Faculty,
}

impl From<achievement::AchievementKind> for AchievementKind {
    fn from(kind: achievement::AchievementKind) -> Self {
        match kind {
            achievement::AchievementKind::Student => Self::Student,
            achievement::AchievementKind::Faculty => Self::Faculty,
        }
    }
}

impl From<AchievementKind> for achievement::AchievementKind {
    fn from(kind: AchievementKind) -> Self {
        match kind {
            AchievementKind::Student => Self::Student,
            AchievementKind::Faculty => Self::Faculty,
        }
    }
}

/// Admin log category as exposed over the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    /// A project was created
    ProjectCreation,
    /// A project was deleted by an admin actor
    ProjectDeletion,
    /// A project was corrected through the admin override
    ProjectUpdate,
    /// A user account was managed
    UserManagement,
    /// System-level event
    System,
    /// Anything else, including role changes
    Other,
}

impl From<admin_log::AdminLogCategory> for LogCategory {
    fn from(category: admin_log::AdminLogCategory) -> Self {
        match category {
            admin_log::AdminLogCategory::ProjectCreation => Self::ProjectCreation,
            admin_log::AdminLogCategory::ProjectDeletion => Self::ProjectDeletion,
            admin_log::AdminLogCategory::ProjectUpdate => Self::ProjectUpdate,
            admin_log::AdminLogCategory::UserManagement => Self::UserManagement,
            admin_log::AdminLogCategory::System => Self::System,
            admin_log::AdminLogCategory::Other => Self::Other,
        }
    }
}

impl From<LogCategory> for admin_log::AdminLogCategory {
    fn from(category: LogCategory) -> Self {
        match category {
            LogCategory::ProjectCreation => Self::ProjectCreation,
            LogCategory::ProjectDeletion => Self::ProjectDeletion,
            LogCategory::ProjectUpdate => Self::ProjectUpdate,
            LogCategory::UserManagement => Self::UserManagement,
            LogCategory::System => Self::System,
            LogCategory::Other => Self::Other,
        }
    }
}

/// Error envelope returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Stable machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Server version
    pub version: String,
}

/// User information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    /// User ID
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Registration id (email local-part at creation)
    pub reg_id: String,
    /// Persisted role
    pub role: UserRole,
    /// Branch of study
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Batch/year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    /// Contact phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserInfo {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            reg_id: model.reg_id,
            role: model.role.into(),
            branch: model.branch,
            section: model.section,
            batch: model.batch,
            phone: model.phone,
            created_at: model.created_at,
        }
    }
}

/// List of users
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserList {
    /// Users
    pub users: Vec<UserInfo>,
    /// Total count
    pub total: usize,
}

/// Identity forwarded by the OAuth gateway after a successful handshake
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignInRequest {
    /// Email from the identity provider
    pub email: String,
    /// Display name from the identity provider
    pub name: String,
}

/// Successful sign-in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignInResponse {
    /// Signed-in user
    pub user: UserInfo,
    /// Session token (also delivered as an HTTP-only cookie)
    pub token: String,
}

/// Profile self-edit; each field is settable at most once
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdateRequest {
    /// Branch of study
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Batch/year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    /// Contact phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Role change action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleAction {
    /// Move one rung up the ladder
    Promote,
    /// Move one rung down the ladder
    Demote,
}

/// Role change request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleChangeRequest {
    /// Promote or demote
    pub action: RoleAction,
}

/// Project information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectInfo {
    /// Project ID
    pub id: Uuid,
    /// Project title
    pub title: String,
    /// Leading student (immutable)
    pub leader_id: Uuid,
    /// Ordered team member names
    pub team_members: Vec<String>,
    /// Components used, comma-separated free text
    pub components: String,
    /// Lifecycle status
    pub status: ProjectStatus,
    /// Assigned reviewing teacher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_teacher_id: Option<Uuid>,
    /// Assigned reviewing admin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_admin_id: Option<Uuid>,
    /// Summary text (present once submitted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Object-store key of the project photo (present once submitted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_key: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<project::Model> for ProjectInfo {
    fn from(model: project::Model) -> Self {
        // team_members is stored as a JSON array in a text column
        let team_members: Vec<String> = serde_json::from_str(&model.team_members).unwrap_or_default();

        Self {
            id: model.id,
            title: model.title,
            leader_id: model.leader_id,
            team_members,
            components: model.components,
            status: model.status.into(),
            assigned_teacher_id: model.assigned_teacher_id,
            assigned_admin_id: model.assigned_admin_id,
            summary: model.summary,
            photo_key: model.photo_key,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// List of projects
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectList {
    /// Projects
    pub projects: Vec<ProjectInfo>,
    /// Total count
    pub total: usize,
}

/// Request to create a project
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    /// Project title
    pub title: String,
    /// Ordered team member names (must be non-empty)
    pub team_members: Vec<String>,
    /// Components used, comma-separated free text
    pub components: String,
    /// Teacher to assign for review (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_teacher_id: Option<Uuid>,
}

/// Request to complete a project (PARTIAL -> SUBMITTED)
///
/// Summary and photo travel together; the transition is refused unless
/// both are present.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompleteProjectRequest {
    /// Summary text
    pub summary: String,
    /// Project photo, base64 encoded
    pub photo: String,
    /// Content type of the photo (defaults to image/jpeg)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_content_type: Option<String>,
}

/// Administrative correction of any project field
///
/// This path deliberately bypasses the summary+photo co-requirement of the
/// ordinary completion flow; it exists for corrections and is audited.
/// The leader is absent on purpose: it can never be reassigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminProjectUpdateRequest {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New team member list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_members: Option<Vec<String>>,
    /// New components text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<String>,
    /// New summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// New status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    /// New photo object key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_key: Option<String>,
    /// New assigned reviewing teacher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_teacher_id: Option<Uuid>,
    /// New assigned reviewing admin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_admin_id: Option<Uuid>,
}

/// Contact fields denormalised for review views
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactInfo {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Registration id, where the contact has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_id: Option<String>,
}

/// A project as seen by its assigned reviewer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignedProjectInfo {
    /// The project
    pub project: ProjectInfo,
    /// Leader contact details
    pub leader: ContactInfo,
    /// Reviewer contact details
    pub reviewer: ContactInfo,
}

/// List of assigned projects
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignedProjectList {
    /// Assigned projects
    pub projects: Vec<AssignedProjectInfo>,
    /// Total count
    pub total: usize,
}

/// Confirmation that a project summary was mailed out
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SummarySentResponse {
    /// Whether the summary was sent
    pub sent: bool,
    /// Recipient address
    pub to: String,
}

/// Achievement information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AchievementInfo {
    /// Achievement ID
    pub id: Uuid,
    /// Achievement title
    pub title: String,
    /// Description text
    pub description: String,
    /// Student or faculty achievement
    pub kind: AchievementKind,
    /// Object-store key of the illustration image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    /// Owning user
    pub owner_id: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<achievement::Model> for AchievementInfo {
    fn from(model: achievement::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            kind: model.kind.into(),
            image_key: model.image_key,
            owner_id: model.owner_id,
            created_at: model.created_at,
        }
    }
}

/// List of achievements
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AchievementList {
    /// Achievements
    pub achievements: Vec<AchievementInfo>,
    /// Total count
    pub total: usize,
}

/// Request to record an achievement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAchievementRequest {
    /// Achievement title
    pub title: String,
    /// Description text
    pub description: String,
    /// Student or faculty achievement
    pub kind: AchievementKind,
    /// Illustration image, base64 encoded (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Content type of the image (defaults to image/jpeg)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_content_type: Option<String>,
}

/// Showcase project information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShowcaseInfo {
    /// Showcase entry ID
    pub id: Uuid,
    /// Project name
    pub name: String,
    /// Description text
    pub description: String,
    /// GitHub repository link
    pub github_url: String,
    /// Object-store key of the illustration image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<showcase_project::Model> for ShowcaseInfo {
    fn from(model: showcase_project::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            github_url: model.github_url,
            image_key: model.image_key,
            created_at: model.created_at,
        }
    }
}

/// List of showcase projects
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShowcaseList {
    /// Showcase projects
    pub projects: Vec<ShowcaseInfo>,
    /// Total count
    pub total: usize,
}

/// Request to create a showcase entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateShowcaseRequest {
    /// Project name
    pub name: String,
    /// Description text
    pub description: String,
    /// GitHub repository link
    pub github_url: String,
    /// Illustration image, base64 encoded (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Content type of the image (defaults to image/jpeg)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_content_type: Option<String>,
}

/// Overlord allowlist entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OverlordInfo {
    /// Overlord ID
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Allowlisted email
    pub email: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<overlord::Model> for OverlordInfo {
    fn from(model: overlord::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
        }
    }
}

/// List of overlord entries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OverlordList {
    /// Overlord entries
    pub overlords: Vec<OverlordInfo>,
    /// Total count
    pub total: usize,
}

/// Request to allowlist an external identity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOverlordRequest {
    /// Display name
    pub name: String,
    /// Email to allowlist
    pub email: String,
}

/// Relative date window for audit log queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogWindow {
    /// Since the start of the current UTC day
    Today,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
}

/// Audit log query filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminLogQuery {
    /// Free-text substring match over the message
    pub search: Option<String>,
    /// Filter by category
    pub category: Option<LogCategory>,
    /// Relative date window
    pub window: Option<LogWindow>,
    /// Maximum records to return (default: 100, max: 500)
    pub limit: Option<u64>,
}

/// One audit log record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminLogInfo {
    /// Monotonic record id
    pub id: i64,
    /// Category of the logged operation
    pub category: LogCategory,
    /// Human-readable message
    pub message: String,
    /// Structured metadata, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// When the record was appended
    pub created_at: DateTime<Utc>,
}

impl From<admin_log::Model> for AdminLogInfo {
    fn from(model: admin_log::Model) -> Self {
        let metadata = model.metadata.and_then(|m| serde_json::from_str(&m).ok());

        Self {
            id: model.id,
            category: model.category.into(),
            message: model.message,
            metadata,
            created_at: model.created_at,
        }
    }
}

/// List of audit log records, newest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminLogList {
    /// Records, newest first
    pub logs: Vec<AdminLogInfo>,
    /// Count returned (after filters and limit)
    pub total: usize,
}
