//! Achievement handlers

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

use idealab_db::entities::achievement;
use idealab_db::entities::prelude::*;

use crate::error::ApiError;
use crate::handlers::{ensure_admin, required_field};
use crate::middleware::CurrentUser;
use crate::models::{
    AchievementInfo, AchievementList, CreateAchievementRequest, ErrorResponse,
};
use crate::storage::object_key;
use crate::AppState;

/// Record an achievement about oneself (any authenticated user)
#[utoipa::path(
    post,
    path = "/api/achievements",
    request_body = CreateAchievementRequest,
    responses(
        (status = 201, description = "Achievement recorded", body = AchievementInfo),
        (status = 400, description = "Missing required field", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "achievements"
)]
pub async fn create_achievement(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateAchievementRequest>,
) -> Result<(StatusCode, Json<AchievementInfo>), ApiError> {
    let title = required_field(&req.title, "title")?;
    let description = required_field(&req.description, "description")?;

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
            let key = object_key("achievements", &user.reg_id, &content_type);
            state
                .store
                .put(&key, bytes, &content_type)
                .await
                .map_err(|e| ApiError::Collaborator(e.to_string()))?;
            Some(key)
        }
        _ => None,
    };

    let created = achievement::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(description),
        kind: Set(req.kind.into()),
        image_key: Set(image_key),
        owner_id: Set(user.id),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List achievements, newest first
#[utoipa::path(
    get,
    path = "/api/achievements",
    responses(
        (status = 200, description = "Achievements", body = AchievementList),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "achievements"
)]
pub async fn list_achievements(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<CurrentUser>,
) -> Result<Json<AchievementList>, ApiError> {
    let rows = Achievement::find()
        .order_by_desc(achievement::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let total = rows.len();
    let achievements = rows.into_iter().map(AchievementInfo::from).collect();

    Ok(Json(AchievementList {
        achievements,
        total,
    }))
}

/// Delete an achievement (admin)
#[utoipa::path(
    delete,
    path = "/api/achievements/{id}",
    params(
        ("id" = Uuid, Path, description = "Achievement ID")
    ),
    responses(
        (status = 204, description = "Achievement deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Achievement not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "achievements"
)]
pub async fn delete_achievement(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&state, &user)?;

    let found = Achievement::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    Achievement::delete_by_id(found.id).exec(&state.db).await?;
    info!("Achievement '{}' deleted by {}", found.title, user.email);

    Ok(StatusCode::NO_CONTENT)
}
