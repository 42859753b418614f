//! Overlord entity: allowlisted external identities
//!
//! An overlord email may sign in despite not matching the institutional
//! domain. Rows are managed only by super-admins and have a lifecycle
//! independent of any user account they enabled.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "overlords")]
pub struct Model {
    /// Overlord UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Allowlisted email (unique)
    #[sea_orm(unique)]
    pub email: String,

    /// When the allowlist entry was created
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
