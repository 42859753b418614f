//! Showcase project entity
//!
//! Curated lab projects displayed publicly; distinct from student projects.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "showcase_projects")]
pub struct Model {
    /// Showcase entry UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Description text
    pub description: String,

    /// GitHub repository link
    pub github_url: String,

    /// Object-store key of an illustration image, if uploaded
    pub image_key: Option<String>,

    /// When the entry was created
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
