//! Database entities

pub mod achievement;
pub mod admin_log;
pub mod overlord;
pub mod project;
pub mod showcase_project;
pub mod user;

pub use achievement::Entity as Achievement;
pub use admin_log::Entity as AdminLog;
pub use overlord::Entity as Overlord;
pub use project::Entity as Project;
pub use showcase_project::Entity as ShowcaseProject;
pub use user::Entity as User;

pub mod prelude {
    pub use super::achievement::Entity as Achievement;
    pub use super::admin_log::Entity as AdminLog;
    pub use super::overlord::Entity as Overlord;
    pub use super::project::Entity as Project;
    pub use super::showcase_project::Entity as ShowcaseProject;
    pub use super::user::Entity as User;
}
