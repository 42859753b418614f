//! Project lifecycle handlers
//!
//! Leader-scoped operations (complete, delete-own, summary) look projects
//! up by id AND leader in one query, so a non-owner sees "not found"
//! rather than "forbidden" and never learns the project exists.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use idealab_db::entities::admin_log::AdminLogCategory;
use idealab_db::entities::project::{self, ProjectStatus};
use idealab_db::entities::user::{self, UserRole};
use idealab_db::entities::prelude::*;

use crate::audit;
use crate::error::ApiError;
use crate::handlers::{ensure_admin, is_effective_student, required_field};
use crate::middleware::CurrentUser;
use crate::models::{
    AdminProjectUpdateRequest, AssignedProjectInfo, AssignedProjectList, CompleteProjectRequest,
    ContactInfo, CreateProjectRequest, ErrorResponse, ProjectInfo, ProjectList,
    SummarySentResponse,
};
use crate::notify::ProjectSummaryData;
use crate::storage::object_key;
use crate::AppState;

fn encode_members(members: &[String]) -> String {
    serde_json::to_string(members).unwrap_or_else(|_| "[]".to_string())
}

/// Look a project up as the leader; absence and not-owned are deliberately
/// indistinguishable to the caller.
async fn find_as_leader(
    state: &AppState,
    id: Uuid,
    leader_id: Uuid,
) -> Result<project::Model, ApiError> {
    Project::find()
        .filter(project::Column::Id.eq(id))
        .filter(project::Column::LeaderId.eq(leader_id))
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)
}

/// Create a project (student leader)
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectInfo),
        (status = 400, description = "Missing required field", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectInfo>), ApiError> {
    if !is_effective_student(&state, &user) {
        return Err(ApiError::Forbidden);
    }

    let title = required_field(&req.title, "title")?;
    let components = required_field(&req.components, "components")?;
    let team_members: Vec<String> = req
        .team_members
        .iter()
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect();
    if team_members.is_empty() {
        return Err(ApiError::Validation(
            "At least one team member is required".to_string(),
        ));
    }

    // The optional reviewer reference must point at an actual teacher
    if let Some(teacher_id) = req.assigned_teacher_id {
        let teacher = User::find_by_id(teacher_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::Validation("Assigned teacher not found".to_string()))?;
        if teacher.role != UserRole::Teacher {
            return Err(ApiError::Validation(
                "Assigned reviewer must be a teacher".to_string(),
            ));
        }
    }

    let now = Utc::now();
    let created = project::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title.clone()),
        leader_id: Set(user.id),
        team_members: Set(encode_members(&team_members)),
        components: Set(components),
        status: Set(ProjectStatus::Partial),
        assigned_teacher_id: Set(req.assigned_teacher_id),
        assigned_admin_id: Set(None),
        summary: Set(None),
        photo_key: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!("Project '{}' created by {}", created.title, user.email);
    audit::record(
        &state.db,
        AdminLogCategory::ProjectCreation,
        format!("Project '{}' created by {}", created.title, user.email),
        Some(json!({ "project_id": created.id, "leader_id": user.id })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List the caller's own projects (student leader)
#[utoipa::path(
    get,
    path = "/api/projects/mine",
    responses(
        (status = 200, description = "Own projects", body = ProjectList),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn list_my_projects(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ProjectList>, ApiError> {
    if !is_effective_student(&state, &user) {
        return Err(ApiError::Forbidden);
    }

    let rows = Project::find()
        .filter(project::Column::LeaderId.eq(user.id))
        .order_by_desc(project::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let total = rows.len();
    let projects = rows.into_iter().map(ProjectInfo::from).collect();

    Ok(Json(ProjectList { projects, total }))
}

/// Projects assigned to the caller for review
///
/// Teachers are matched on the assigned-teacher column, admin-level
/// callers on the assigned-admin column; the query shape is the same.
#[utoipa::path(
    get,
    path = "/api/projects/assigned",
    responses(
        (status = 200, description = "Assigned projects", body = AssignedProjectList),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn assigned_projects(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<AssignedProjectList>, ApiError> {
    let column = if state.policy.is_admin(&user.email, user.role) {
        project::Column::AssignedAdminId
    } else if user.role == UserRole::Teacher {
        project::Column::AssignedTeacherId
    } else {
        return Err(ApiError::Forbidden);
    };

    let rows = Project::find()
        .filter(column.eq(user.id))
        .order_by_desc(project::Column::CreatedAt)
        .all(&state.db)
        .await?;

    // Denormalise leader contact fields for display
    let leader_ids: Vec<Uuid> = rows.iter().map(|p| p.leader_id).collect();
    let leaders: HashMap<Uuid, user::Model> = User::find()
        .filter(user::Column::Id.is_in(leader_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let reviewer = ContactInfo {
        name: user.name.clone(),
        email: user.email.clone(),
        reg_id: Some(user.reg_id.clone()),
    };

    let projects: Vec<AssignedProjectInfo> = rows
        .into_iter()
        .filter_map(|p| {
            leaders.get(&p.leader_id).map(|leader| AssignedProjectInfo {
                leader: ContactInfo {
                    name: leader.name.clone(),
                    email: leader.email.clone(),
                    reg_id: Some(leader.reg_id.clone()),
                },
                reviewer: reviewer.clone(),
                project: p.into(),
            })
        })
        .collect();

    let total = projects.len();
    Ok(Json(AssignedProjectList { projects, total }))
}

/// List all projects (admin)
#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "All projects", body = ProjectList),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn list_all_projects(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ProjectList>, ApiError> {
    ensure_admin(&state, &user)?;

    let rows = Project::find()
        .order_by_desc(project::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let total = rows.len();
    let projects = rows.into_iter().map(ProjectInfo::from).collect();

    Ok(Json(ProjectList { projects, total }))
}

/// Fetch one project (leader or admin)
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project", body = ProjectInfo),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Not found or not owned", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectInfo>, ApiError> {
    let found = if state.policy.is_admin(&user.email, user.role) {
        Project::find_by_id(id)
            .one(&state.db)
            .await?
            .ok_or(ApiError::NotFound)?
    } else {
        find_as_leader(&state, id, user.id).await?
    };

    Ok(Json(found.into()))
}

/// Complete a project: PARTIAL -> SUBMITTED (leader only)
///
/// Summary and photo are required together; nothing is written unless
/// both validate. Re-submitting overwrites the previous pair.
#[utoipa::path(
    post,
    path = "/api/projects/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    request_body = CompleteProjectRequest,
    responses(
        (status = 200, description = "Project submitted", body = ProjectInfo),
        (status = 400, description = "Summary or photo missing", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Not found or not owned", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn complete_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteProjectRequest>,
) -> Result<Json<ProjectInfo>, ApiError> {
    let summary = required_field(&req.summary, "summary")?;
    if req.photo.trim().is_empty() {
        return Err(ApiError::Validation("A project photo is required".to_string()));
    }
    let photo_bytes = BASE64
        .decode(req.photo.trim())
        .map_err(|_| ApiError::Validation("Photo must be valid base64".to_string()))?;

    let found = find_as_leader(&state, id, user.id).await?;

    let content_type = req
        .photo_content_type
        .as_deref()
        .unwrap_or("image/jpeg")
        .to_string();
    let key = object_key("projects", &user.reg_id, &content_type);

    state
        .store
        .put(&key, photo_bytes, &content_type)
        .await
        .map_err(|e| ApiError::Collaborator(e.to_string()))?;

    // One row update carries summary, photo and status together
    let mut active: project::ActiveModel = found.into();
    active.summary = Set(Some(summary));
    active.photo_key = Set(Some(key));
    active.status = Set(ProjectStatus::Submitted);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    info!("Project '{}' submitted by {}", updated.title, user.email);
    Ok(Json(updated.into()))
}

/// Administrative correction of any project field (admin)
///
/// Deliberately bypasses the summary+photo co-requirement of the ordinary
/// completion flow; the correction is audited as such.
#[utoipa::path(
    patch,
    path = "/api/projects/{id}",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    request_body = AdminProjectUpdateRequest,
    responses(
        (status = 200, description = "Project corrected", body = ProjectInfo),
        (status = 400, description = "Invalid field value", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn admin_update_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdminProjectUpdateRequest>,
) -> Result<Json<ProjectInfo>, ApiError> {
    ensure_admin(&state, &user)?;

    let found = Project::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut changed: Vec<&str> = Vec::new();
    let mut active: project::ActiveModel = found.into();

    if let Some(title) = req.title {
        active.title = Set(required_field(&title, "title")?);
        changed.push("title");
    }
    if let Some(team_members) = req.team_members {
        active.team_members = Set(encode_members(&team_members));
        changed.push("team_members");
    }
    if let Some(components) = req.components {
        active.components = Set(required_field(&components, "components")?);
        changed.push("components");
    }
    if let Some(summary) = req.summary {
        active.summary = Set(Some(summary));
        changed.push("summary");
    }
    if let Some(status) = req.status {
        active.status = Set(status.into());
        changed.push("status");
    }
    if let Some(photo_key) = req.photo_key {
        active.photo_key = Set(Some(photo_key));
        changed.push("photo_key");
    }
    if let Some(teacher_id) = req.assigned_teacher_id {
        active.assigned_teacher_id = Set(Some(teacher_id));
        changed.push("assigned_teacher_id");
    }
    if let Some(admin_id) = req.assigned_admin_id {
        active.assigned_admin_id = Set(Some(admin_id));
        changed.push("assigned_admin_id");
    }

    if changed.is_empty() {
        return Err(ApiError::Validation("Nothing to update".to_string()));
    }

    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    debug!("Project {} corrected by {}: {:?}", updated.id, user.email, changed);
    audit::record(
        &state.db,
        AdminLogCategory::ProjectUpdate,
        format!("Project '{}' corrected by {}", updated.title, user.email),
        Some(json!({ "project_id": updated.id, "fields": changed })),
    )
    .await;

    Ok(Json(updated.into()))
}

/// Delete a project (leader for their own, admin for any)
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Not found or not owned", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let acting_as_admin = state.policy.is_admin(&user.email, user.role);

    let found = if acting_as_admin {
        Project::find_by_id(id)
            .one(&state.db)
            .await?
            .ok_or(ApiError::NotFound)?
    } else {
        find_as_leader(&state, id, user.id).await?
    };

    Project::delete_by_id(found.id).exec(&state.db).await?;
    info!("Project '{}' deleted by {}", found.title, user.email);

    if acting_as_admin {
        audit::record(
            &state.db,
            AdminLogCategory::ProjectDeletion,
            format!("Project '{}' deleted by {}", found.title, user.email),
            Some(json!({ "project_id": found.id, "leader_id": found.leader_id })),
        )
        .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Render the summary document and mail it to the leader
///
/// Read-only with respect to the project; a collaborator failure surfaces
/// as 500 and leaves all state untouched.
#[utoipa::path(
    get,
    path = "/api/projects/{id}/summary",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Summary mailed", body = SummarySentResponse),
        (status = 400, description = "Project not submitted yet", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Not found or not owned", body = ErrorResponse),
        (status = 500, description = "Rendering or delivery failed", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn send_project_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummarySentResponse>, ApiError> {
    let found = if state.policy.is_admin(&user.email, user.role) {
        Project::find_by_id(id)
            .one(&state.db)
            .await?
            .ok_or(ApiError::NotFound)?
    } else {
        find_as_leader(&state, id, user.id).await?
    };

    let summary = found
        .summary
        .clone()
        .ok_or_else(|| ApiError::Validation("Project has not been submitted yet".to_string()))?;

    let leader = User::find_by_id(found.leader_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound)?;

    let team_members: Vec<String> = serde_json::from_str(&found.team_members).unwrap_or_default();
    let data = ProjectSummaryData {
        title: found.title.clone(),
        leader_name: leader.name.clone(),
        leader_email: leader.email.clone(),
        team_members,
        components: found.components.clone(),
        summary,
    };

    let bytes = state
        .mailer
        .render_summary_pdf(&data)
        .await
        .map_err(|e| ApiError::Collaborator(e.to_string()))?;

    state
        .mailer
        .send_with_attachment(&leader.email, &format!("{}.pdf", found.title), bytes)
        .await
        .map_err(|e| ApiError::Collaborator(e.to_string()))?;

    Ok(Json(SummarySentResponse {
        sent: true,
        to: leader.email,
    }))
}
