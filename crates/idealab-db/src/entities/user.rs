//! User entity for authentication and role management

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role in the system
///
/// Ordinary promotion and demotion move exactly one rung along
/// Student <-> Teacher <-> Admin. SuperAdmin sits outside that ladder and is
/// only ever granted or revoked by another super-admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum UserRole {
    /// Student who creates and submits projects
    #[sea_orm(string_value = "student")]
    Student,

    /// Teacher reviewing assigned projects
    #[sea_orm(string_value = "teacher")]
    Teacher,

    /// Administrator with full project and user management access
    #[sea_orm(string_value = "admin")]
    Admin,

    /// Super administrator; additionally manages overlords and other admins
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
}

impl UserRole {
    /// Next rung up the ordinary ladder, if any
    ///
    /// Admin -> SuperAdmin is deliberately excluded; that transition is
    /// reserved for a super-admin caller.
    pub fn promoted(self) -> Option<Self> {
        match self {
            Self::Student => Some(Self::Teacher),
            Self::Teacher => Some(Self::Admin),
            Self::Admin | Self::SuperAdmin => None,
        }
    }

    /// Next rung down the ordinary ladder, if any
    pub fn demoted(self) -> Option<Self> {
        match self {
            Self::Admin => Some(Self::Teacher),
            Self::Teacher => Some(Self::Student),
            Self::Student | Self::SuperAdmin => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// User UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name from the identity provider
    pub name: String,

    /// User email (unique)
    #[sea_orm(unique)]
    pub email: String,

    /// Registration id, the email local-part at account creation
    pub reg_id: String,

    /// Persisted role; the single source of truth for authorization
    pub role: UserRole,

    /// Branch of study (settable once via profile)
    pub branch: Option<String>,

    /// Section (settable once via profile)
    pub section: Option<String>,

    /// Batch/year (settable once via profile)
    pub batch: Option<String>,

    /// Contact phone (settable once via profile)
    pub phone: Option<String>,

    /// When the account was created
    pub created_at: ChronoDateTimeUtc,

    /// When the row was last mutated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Projects led by this user
    #[sea_orm(has_many = "super::project::Entity")]
    Projects,

    /// Achievements owned by this user
    #[sea_orm(has_many = "super::achievement::Entity")]
    Achievements,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::achievement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Achievements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_ladder_moves_one_rung() {
        assert_eq!(UserRole::Student.promoted(), Some(UserRole::Teacher));
        assert_eq!(UserRole::Teacher.promoted(), Some(UserRole::Admin));
        assert_eq!(UserRole::Admin.promoted(), None);
        assert_eq!(UserRole::SuperAdmin.promoted(), None);
    }

    #[test]
    fn demotion_ladder_moves_one_rung() {
        assert_eq!(UserRole::Admin.demoted(), Some(UserRole::Teacher));
        assert_eq!(UserRole::Teacher.demoted(), Some(UserRole::Student));
        assert_eq!(UserRole::Student.demoted(), None);
        assert_eq!(UserRole::SuperAdmin.demoted(), None);
    }
}
