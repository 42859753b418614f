//! Audit log read surface (admin)

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use std::sync::Arc;
use tracing::debug;

use idealab_db::entities::admin_log::{self, AdminLogCategory};
use idealab_db::entities::prelude::*;

use crate::error::ApiError;
use crate::handlers::ensure_admin;
use crate::middleware::CurrentUser;
use crate::models::{AdminLogInfo, AdminLogList, AdminLogQuery, ErrorResponse, LogWindow};
use crate::AppState;

/// List audit log records, newest first (admin)
#[utoipa::path(
    get,
    path = "/api/logs",
    params(
        ("search" = Option<String>, Query, description = "Substring match over the message"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("window" = Option<String>, Query, description = "Relative date window: today, week, month"),
        ("limit" = Option<u64>, Query, description = "Maximum records (default: 100, max: 500)")
    ),
    responses(
        (status = 200, description = "Audit log records", body = AdminLogList),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "logs"
)]
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<AdminLogQuery>,
) -> Result<Json<AdminLogList>, ApiError> {
    ensure_admin(&state, &user)?;
    debug!("Listing admin logs with filters: {:?}", query);

    let mut condition = Condition::all();

    if let Some(ref search) = query.search {
        condition = condition.add(admin_log::Column::Message.contains(search));
    }

    if let Some(category) = query.category {
        condition = condition.add(admin_log::Column::Category.eq(AdminLogCategory::from(category)));
    }

    if let Some(window) = query.window {
        let since = match window {
            LogWindow::Today => Utc::now()
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .unwrap_or_else(|| Utc::now() - Duration::days(1)),
            LogWindow::Week => Utc::now() - Duration::days(7),
            LogWindow::Month => Utc::now() - Duration::days(30),
        };
        condition = condition.add(admin_log::Column::CreatedAt.gte(since));
    }

    let limit = query.limit.unwrap_or(100).min(500); // Cap at 500

    let rows = AdminLog::find()
        .filter(condition)
        .order_by_desc(admin_log::Column::Id)
        .limit(limit)
        .all(&state.db)
        .await?;

    let total = rows.len();
    let logs = rows.into_iter().map(AdminLogInfo::from).collect();

    Ok(Json(AdminLogList { logs, total }))
}
