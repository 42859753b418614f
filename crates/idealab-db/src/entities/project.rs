//! Project entity and lifecycle status

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project lifecycle status
///
/// Every project starts Partial. The leader-driven completion flow is the
/// only ordinary transition (Partial -> Submitted, requiring summary and
/// photo together); administrative correction may set status directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ProjectStatus {
    /// Created but not yet submitted
    #[sea_orm(string_value = "partial")]
    Partial,

    /// Completed with summary and photo
    #[sea_orm(string_value = "submitted")]
    Submitted,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Project UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Project title
    pub title: String,

    /// Leading student; set at creation and never reassigned
    pub leader_id: Uuid,

    /// Ordered team member names, stored as a JSON array
    pub team_members: String,

    /// Components used, comma-separated free text
    pub components: String,

    /// Lifecycle status
    pub status: ProjectStatus,

    /// Teacher assigned to review, if any
    pub assigned_teacher_id: Option<Uuid>,

    /// Admin assigned to review, if any
    pub assigned_admin_id: Option<Uuid>,

    /// Summary text; present once submitted
    pub summary: Option<String>,

    /// Object-store key of the project photo; present once submitted
    pub photo_key: Option<String>,

    /// When the project was created
    pub created_at: ChronoDateTimeUtc,

    /// When the row was last mutated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Project belongs to its leader
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LeaderId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Leader,

    /// Assigned reviewing teacher
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedTeacherId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    AssignedTeacher,

    /// Assigned reviewing admin
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedAdminId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    AssignedAdmin,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
