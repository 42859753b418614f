//! Admin log entity: append-only audit trail
//!
//! The auto-increment primary key gives records a monotonic append order,
//! so readers can page newest-first without any in-process sequencing state.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category of a logged privileged operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum AdminLogCategory {
    /// A project was created
    #[sea_orm(string_value = "project_creation")]
    ProjectCreation,

    /// A project was deleted by an admin actor
    #[sea_orm(string_value = "project_deletion")]
    ProjectDeletion,

    /// A project was corrected through the admin override
    #[sea_orm(string_value = "project_update")]
    ProjectUpdate,

    /// A user account was managed (deleted, profile forced, ...)
    #[sea_orm(string_value = "user_management")]
    UserManagement,

    /// System-level event
    #[sea_orm(string_value = "system")]
    System,

    /// Anything else, including role changes
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_logs")]
pub struct Model {
    /// Monotonic record id (primary key, auto-increment)
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Category of the logged operation
    pub category: AdminLogCategory,

    /// Human-readable message
    pub message: String,

    /// Structured metadata as a JSON object, if any
    pub metadata: Option<String>,

    /// When the record was appended
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
