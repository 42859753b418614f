//! Overlord allowlist handlers (super-admin only)
//!
//! Deleting an overlord stops future sign-ins for that address; a user
//! account it already enabled is untouched.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use idealab_db::entities::admin_log::AdminLogCategory;
use idealab_db::entities::overlord;
use idealab_db::entities::prelude::*;

use crate::audit;
use crate::error::ApiError;
use crate::handlers::{ensure_super_admin, required_field};
use crate::middleware::CurrentUser;
use crate::models::{CreateOverlordRequest, ErrorResponse, OverlordInfo, OverlordList};
use crate::AppState;

/// List overlord entries (super-admin)
#[utoipa::path(
    get,
    path = "/api/overlords",
    responses(
        (status = 200, description = "Overlord entries", body = OverlordList),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "overlords"
)]
pub async fn list_overlords(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<OverlordList>, ApiError> {
    ensure_super_admin(&state, &user)?;

    let rows = Overlord::find()
        .order_by_asc(overlord::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let total = rows.len();
    let overlords = rows.into_iter().map(OverlordInfo::from).collect();

    Ok(Json(OverlordList { overlords, total }))
}

/// Allowlist an external identity (super-admin)
#[utoipa::path(
    post,
    path = "/api/overlords",
    request_body = CreateOverlordRequest,
    responses(
        (status = 201, description = "Overlord created", body = OverlordInfo),
        (status = 400, description = "Invalid or duplicate email", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "overlords"
)]
pub async fn create_overlord(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateOverlordRequest>,
) -> Result<(StatusCode, Json<OverlordInfo>), ApiError> {
    ensure_super_admin(&state, &user)?;

    let name = required_field(&req.name, "name")?;
    let email = required_field(&req.email, "email")?.to_lowercase();
    if !email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".to_string()));
    }

    let existing = Overlord::find()
        .filter(overlord::Column::Email.eq(email.as_str()))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Validation(format!(
            "{} is already allowlisted",
            email
        )));
    }

    let created = overlord::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!("Overlord {} added by {}", created.email, user.email);
    audit::record(
        &state.db,
        AdminLogCategory::UserManagement,
        format!("Overlord {} added", created.email),
        Some(json!({ "overlord_id": created.id, "actor": user.email })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Remove an overlord entry (super-admin)
#[utoipa::path(
    delete,
    path = "/api/overlords/{id}",
    params(
        ("id" = Uuid, Path, description = "Overlord ID")
    ),
    responses(
        (status = 204, description = "Overlord removed"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Overlord not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "overlords"
)]
pub async fn delete_overlord(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ensure_super_admin(&state, &user)?;

    let found = Overlord::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    Overlord::delete_by_id(found.id).exec(&state.db).await?;

    info!("Overlord {} removed by {}", found.email, user.email);
    audit::record(
        &state.db,
        AdminLogCategory::UserManagement,
        format!("Overlord {} removed", found.email),
        Some(json!({ "overlord_id": found.id, "actor": user.email })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
