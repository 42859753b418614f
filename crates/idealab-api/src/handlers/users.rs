//! User management and profile handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use idealab_db::entities::admin_log::AdminLogCategory;
use idealab_db::entities::user::{self, UserRole};
use idealab_db::entities::prelude::*;

use crate::audit;
use crate::error::ApiError;
use crate::handlers::{ensure_admin, ensure_super_admin, required_field};
use crate::middleware::CurrentUser;
use crate::models::{
    self, ErrorResponse, ProfileUpdateRequest, RoleAction, RoleChangeRequest, UserInfo, UserList,
};
use crate::AppState;

/// Self-edit of profile metadata; each field is settable at most once
#[utoipa::path(
    patch,
    path = "/api/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserInfo),
        (status = 400, description = "Field already set or empty", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<UserInfo>, ApiError> {
    let row = User::find_by_id(user.id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    // Set-once rule: through this flow a field never changes after it
    // holds a value.
    let updates = [
        ("branch", &req.branch, &row.branch),
        ("section", &req.section, &row.section),
        ("batch", &req.batch, &row.batch),
        ("phone", &req.phone, &row.phone),
    ];
    for (what, incoming, current) in &updates {
        if incoming.is_some() && current.is_some() {
            return Err(ApiError::Validation(format!("{} is already set", what)));
        }
    }

    let mut active: user::ActiveModel = row.into();
    if let Some(branch) = req.branch {
        active.branch = Set(Some(required_field(&branch, "branch")?));
    }
    if let Some(section) = req.section {
        active.section = Set(Some(required_field(&section, "section")?));
    }
    if let Some(batch) = req.batch {
        active.batch = Set(Some(required_field(&batch, "batch")?));
    }
    if let Some(phone) = req.phone {
        active.phone = Set(Some(required_field(&phone, "phone")?));
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;
    Ok(Json(updated.into()))
}

/// List all users (admin)
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = UserList),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserList>, ApiError> {
    ensure_admin(&state, &user)?;

    let rows = User::find()
        .order_by_asc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let total = rows.len();
    let users = rows.into_iter().map(UserInfo::from).collect();

    Ok(Json(UserList { users, total }))
}

/// Promote or demote a user one rung along the role ladder
///
/// Ordinary admins move users along Student <-> Teacher <-> Admin.
/// Any transition that touches SuperAdmin (promoting an Admin, or
/// changing a SuperAdmin at all) requires a super-admin caller.
#[utoipa::path(
    post,
    path = "/api/users/{id}/role",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = RoleChangeRequest,
    responses(
        (status = 200, description = "Role changed", body = UserInfo),
        (status = 400, description = "No rung in that direction", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn change_role(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<RoleChangeRequest>,
) -> Result<Json<UserInfo>, ApiError> {
    ensure_admin(&state, &actor)?;

    let target = User::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let touches_super = target.role == UserRole::SuperAdmin
        || (req.action == RoleAction::Promote && target.role == UserRole::Admin);
    if touches_super {
        ensure_super_admin(&state, &actor)?;
    }

    let old_role = target.role;
    let new_role = match (req.action, target.role) {
        (RoleAction::Promote, UserRole::Admin) => UserRole::SuperAdmin,
        (RoleAction::Demote, UserRole::SuperAdmin) => UserRole::Admin,
        (RoleAction::Promote, role) => role.promoted().ok_or_else(|| {
            ApiError::Validation("No higher role to promote to".to_string())
        })?,
        (RoleAction::Demote, role) => role.demoted().ok_or_else(|| {
            ApiError::Validation("No lower role to demote to".to_string())
        })?,
    };

    let mut active: user::ActiveModel = target.into();
    active.role = Set(new_role);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!(
        "Role of {} changed {:?} -> {:?} by {}",
        updated.email, old_role, new_role, actor.email
    );
    audit::record(
        &state.db,
        AdminLogCategory::Other,
        format!("Role changed for {}", updated.email),
        Some(json!({
            "user_id": updated.id,
            "old_role": models::UserRole::from(old_role),
            "new_role": models::UserRole::from(new_role),
            "actor": actor.email,
        })),
    )
    .await;

    Ok(Json(updated.into()))
}

/// Delete a user account (admin)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&state, &actor)?;

    let target = User::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    if target.role == UserRole::SuperAdmin {
        ensure_super_admin(&state, &actor)?;
    }

    User::delete_by_id(target.id).exec(&state.db).await?;

    audit::record(
        &state.db,
        AdminLogCategory::UserManagement,
        format!("User {} deleted", target.email),
        Some(json!({ "user_id": target.id, "actor": actor.email })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
