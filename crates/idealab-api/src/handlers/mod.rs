//! HTTP handlers
//!
//! Authorization is enforced per endpoint: the session middleware only
//! authenticates; every handler applies the permission matrix itself
//! through the helpers below.

pub mod achievements;
pub mod auth;
pub mod files;
pub mod logs;
pub mod overlords;
pub mod projects;
pub mod showcase;
pub mod system;
pub mod users;

pub use achievements::*;
pub use auth::*;
pub use files::*;
pub use logs::*;
pub use overlords::*;
pub use projects::*;
pub use showcase::*;
pub use system::*;
pub use users::*;

use idealab_db::entities::user::UserRole;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::AppState;

/// Refuse unless the caller holds admin-level authority
pub(crate) fn ensure_admin(state: &AppState, user: &CurrentUser) -> Result<(), ApiError> {
    if state.policy.is_admin(&user.email, user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Refuse unless the caller holds super-admin authority
pub(crate) fn ensure_super_admin(state: &AppState, user: &CurrentUser) -> Result<(), ApiError> {
    if state.policy.is_super_admin(&user.email, user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// True iff the caller acts as a student (stored role Student and no
/// admin authority through a bypass address)
pub(crate) fn is_effective_student(state: &AppState, user: &CurrentUser) -> bool {
    user.role == UserRole::Student && !state.policy.is_admin(&user.email, user.role)
}

/// Trim a required text field, refusing empty values
pub(crate) fn required_field(value: &str, what: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ApiError::Validation(format!("{} is required", what)))
    } else {
        Ok(value.to_string())
    }
}
