//! Sign-in, sign-out and session introspection
//!
//! The OAuth handshake itself happens upstream; this service receives the
//! resulting identity and decides admission: institutional domain,
//! overlord allowlist, or configured bypass address. Anything else is
//! refused without creating state.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use idealab_auth::registration_id;
use idealab_db::entities::user::{self, UserRole};
use idealab_db::entities::{overlord, prelude::*};

use crate::error::ApiError;
use crate::middleware::{CurrentUser, SESSION_COOKIE};
use crate::models::{ErrorResponse, SignInRequest, SignInResponse, UserInfo};
use crate::AppState;

/// Session lifetime for issued tokens
const SESSION_HOURS: i64 = 24;

fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

/// Complete a sign-in for an identity vouched by the OAuth gateway
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse),
        (status = 201, description = "Signed in, account created", body = SignInResponse),
        (status = 400, description = "Malformed identity", body = ErrorResponse),
        (status = 403, description = "Sign-in refused", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    let name = req.name.trim().to_string();

    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".to_string()));
    }
    if name.is_empty() {
        return Err(ApiError::Validation(
            "A display name is required".to_string(),
        ));
    }

    // Admission: institutional domain, overlord allowlist, or bypass address
    let permitted = state.policy.matches_domain(&email)
        || state.policy.is_bypass(&email)
        || Overlord::find()
            .filter(overlord::Column::Email.eq(email.as_str()))
            .one(&state.db)
            .await?
            .is_some();

    if !permitted {
        info!("Sign-in refused for {}", email);
        return Err(ApiError::AccessDenied);
    }

    let existing = User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&state.db)
        .await?;

    // First sign-in creates the account; later sign-ins mutate nothing,
    // so role and profile edits survive.
    let (row, created) = match existing {
        Some(row) => (row, false),
        None => {
            let now = Utc::now();
            let row = user::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(name.clone()),
                email: Set(email.clone()),
                reg_id: Set(registration_id(&email).to_string()),
                role: Set(UserRole::Student),
                branch: Set(None),
                section: Set(None),
                batch: Set(None),
                phone: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&state.db)
            .await?;
            info!("Created user {} on first sign-in", row.email);
            (row, true)
        }
    };

    let token = state
        .sessions
        .issue(&row.email, &row.name, Duration::hours(SESSION_HOURS))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let headers = AppendHeaders([(
        header::SET_COOKIE,
        session_cookie(&token, SESSION_HOURS * 3600),
    )]);

    Ok((
        status,
        headers,
        Json(SignInResponse {
            user: row.into(),
            token,
        }),
    ))
}

/// Sign out by clearing the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Signed out")
    ),
    tag = "auth"
)]
pub async fn logout() -> impl IntoResponse {
    let headers = AppendHeaders([(header::SET_COOKIE, session_cookie("", 0))]);
    (StatusCode::NO_CONTENT, headers)
}

/// Current user, including profile fields
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserInfo>, ApiError> {
    let row = User::find_by_id(user.id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    Ok(Json(row.into()))
}
