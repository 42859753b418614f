//! Showcase project handlers
//!
//! The showcase is the lab's public face: reads need no session, writes
//! need admin-level authority.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use idealab_db::entities::prelude::*;
use idealab_db::entities::showcase_project;

use crate::error::ApiError;
use crate::handlers::{ensure_admin, required_field};
use crate::middleware::CurrentUser;
use crate::models::{CreateShowcaseRequest, ErrorResponse, ShowcaseInfo, ShowcaseList};
use crate::storage::object_key;
use crate::AppState;

/// List showcase projects (public)
#[utoipa::path(
    get,
    path = "/api/showcase",
    responses(
        (status = 200, description = "Showcase projects", body = ShowcaseList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "showcase"
)]
pub async fn list_showcase(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ShowcaseList>, ApiError> {
    let rows = ShowcaseProject::find()
        .order_by_desc(showcase_project::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let total = rows.len();
    let projects = rows.into_iter().map(ShowcaseInfo::from).collect();

    Ok(Json(ShowcaseList { projects, total }))
}

/// Create a showcase entry (admin)
#[utoipa::path(
    post,
    path = "/api/showcase",
    request_body = CreateShowcaseRequest,
    responses(
        (status = 201, description = "Showcase entry created", body = ShowcaseInfo),
        (status = 400, description = "Missing required field", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "showcase"
)]
pub async fn create_showcase(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateShowcaseRequest>,
) -> Result<(StatusCode, Json<ShowcaseInfo>), ApiError> {
    ensure_admin(&state, &user)?;

    let name = required_field(&req.name, "name")?;
    let description = required_field(&req.description, "description")?;
    let github_url = required_field(&req.github_url, "github_url")?;

    let image_key = match req.image {
        Some(image) if !image.trim().is_empty() => {
            let bytes = BASE64
                .decode(image.trim())
                .map_err(|_| ApiError::Validation("Image must be valid base64".to_string()))?;
            let content_type = req
                .image_content_type
                .as_deref()
                .unwrap_or("image/jpeg")
                .to_string();
            let key = object_key("showcase", &user.reg_id, &content_type);
            state
                .store
                .put(&key, bytes, &content_type)
                .await
                .map_err(|e| ApiError::Collaborator(e.to_string()))?;
            Some(key)
        }
        _ => None,
    };

    let created = showcase_project::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(description),
        github_url: Set(github_url),
        image_key: Set(image_key),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!("Showcase entry '{}' created by {}", created.name, user.email);
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Delete a showcase entry (admin)
#[utoipa::path(
    delete,
    path = "/api/showcase/{id}",
    params(
        ("id" = Uuid, Path, description = "Showcase entry ID")
    ),
    responses(
        (status = 204, description = "Showcase entry deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Showcase entry not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "showcase"
)]
pub async fn delete_showcase(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&state, &user)?;

    let found = ShowcaseProject::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    ShowcaseProject::delete_by_id(found.id)
        .exec(&state.db)
        .await?;
    info!("Showcase entry '{}' deleted by {}", found.name, user.email);

    Ok(StatusCode::NO_CONTENT)
}
