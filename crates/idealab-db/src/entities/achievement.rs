//! Achievement entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Achievement category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AchievementKind {
    /// Achievement by a student
    #[sea_orm(string_value = "student")]
    Student,

    /// Achievement by a faculty member
    #[sea_orm(string_value = "faculty")]
    Faculty,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "achievements")]
pub struct Model {
    /// Achievement UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Achievement title
    pub title: String,

    /// Description text
    pub description: String,

    /// Student or faculty achievement
    pub kind: AchievementKind,

    /// Object-store key of an illustration image, if uploaded
    pub image_key: Option<String>,

    /// User this achievement belongs to
    pub owner_id: Uuid,

    /// When the achievement was recorded
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Achievement belongs to its owner
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
