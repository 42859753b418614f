//! Session authentication middleware
//!
//! Extracts the session token from the HTTP-only cookie or the
//! Authorization header, verifies it, then materialises the session by
//! re-reading the user row. The role therefore always comes fresh from
//! storage; a demotion is effective on the victim's next request, and a
//! deleted user is signed out immediately.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use idealab_db::entities::user::{self, UserRole};

use crate::error::ApiError;
use crate::AppState;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "idealab_session";

/// Authenticated principal injected into request extensions
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    /// User ID
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Email the session was issued for
    pub email: String,
    /// Registration id
    pub reg_id: String,
    /// Role as persisted right now
    pub role: UserRole,
}

/// Authentication middleware for protected routes
///
/// # Errors
/// Returns 401 Unauthorized if the token is missing, malformed, expired,
/// or no user row exists for the claimed email.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Try the cookie first (preferred for the web app)
    let cookie_token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find_map(|c| c.strip_prefix(&format!("{}=", SESSION_COOKIE)))
                .map(|t| t.to_string())
        });

    // Fall back to "Authorization: Bearer <token>" (API clients)
    let token = match cookie_token {
        Some(t) => t,
        None => request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.to_string())
            .ok_or(ApiError::Unauthenticated)?,
    };

    let claims = state
        .sessions
        .verify(&token)
        .map_err(|_| ApiError::Unauthenticated)?;

    // Session materialisation: the user row is the source of truth
    let row = user::Entity::find()
        .filter(user::Column::Email.eq(claims.sub.as_str()))
        .one(&state.db)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    request.extensions_mut().insert(CurrentUser {
        id: row.id,
        name: row.name,
        email: row.email,
        reg_id: row.reg_id,
        role: row.role,
    });

    Ok(next.run(request).await)
}
