//! HTTP API for the Idea Lab project tracker
//!
//! Builds the axum router: public endpoints (health, sign-in, showcase,
//! stored files), session-protected endpoints for students, reviewers and
//! admins, Swagger UI, CORS and request tracing. Authorization decisions
//! live in the handlers; this module only wires them together.

pub mod audit;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod storage;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use idealab_auth::{AccessPolicy, SessionTokens};
use sea_orm::DatabaseConnection;

use notify::SummaryMailer;
use storage::ObjectStore;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub policy: AccessPolicy,
    pub sessions: SessionTokens,
    pub store: Arc<dyn ObjectStore>,
    pub mailer: Arc<dyn SummaryMailer>,
    pub maintenance_mode: bool,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Idea Lab API",
        version = "0.1.0",
        description = "REST API for the Idea Lab project tracker",
        contact(
            name = "Idea Lab Team",
            email = "idealab@poornima.org"
        )
    ),
    paths(
        handlers::health_check,
        handlers::sign_in,
        handlers::logout,
        handlers::me,
        handlers::update_profile,
        handlers::list_users,
        handlers::change_role,
        handlers::delete_user,
        handlers::create_project,
        handlers::list_my_projects,
        handlers::assigned_projects,
        handlers::list_all_projects,
        handlers::get_project,
        handlers::complete_project,
        handlers::admin_update_project,
        handlers::delete_project,
        handlers::send_project_summary,
        handlers::create_achievement,
        handlers::list_achievements,
        handlers::delete_achievement,
        handlers::list_showcase,
        handlers::create_showcase,
        handlers::delete_showcase,
        handlers::list_overlords,
        handlers::create_overlord,
        handlers::delete_overlord,
        handlers::list_logs,
        handlers::get_file,
    ),
    components(
        schemas(
            models::UserRole,
            models::ProjectStatus,
            models::AchievementKind,
            models::LogCategory,
            models::LogWindow,
            models::RoleAction,
            models::ErrorResponse,
            models::HealthResponse,
            models::UserInfo,
            models::UserList,
            models::SignInRequest,
            models::SignInResponse,
            models::ProfileUpdateRequest,
            models::RoleChangeRequest,
            models::ProjectInfo,
            models::ProjectList,
            models::CreateProjectRequest,
            models::CompleteProjectRequest,
            models::AdminProjectUpdateRequest,
            models::ContactInfo,
            models::AssignedProjectInfo,
            models::AssignedProjectList,
            models::SummarySentResponse,
            models::AchievementInfo,
            models::AchievementList,
            models::CreateAchievementRequest,
            models::ShowcaseInfo,
            models::ShowcaseList,
            models::CreateShowcaseRequest,
            models::OverlordInfo,
            models::OverlordList,
            models::CreateOverlordRequest,
            models::AdminLogInfo,
            models::AdminLogList,
        )
    ),
    tags(
        (name = "auth", description = "Sign-in and session endpoints"),
        (name = "users", description = "Profile and user management endpoints"),
        (name = "projects", description = "Project lifecycle endpoints"),
        (name = "achievements", description = "Achievement endpoints"),
        (name = "showcase", description = "Showcase project endpoints"),
        (name = "overlords", description = "Overlord allowlist endpoints"),
        (name = "logs", description = "Audit log endpoints"),
        (name = "files", description = "Stored object endpoints"),
        (name = "system", description = "System health endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
    /// Secret used to sign session tokens
    pub jwt_secret: String,
    /// Answer non-API traffic with the maintenance page
    pub maintenance_mode: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3080)),
            enable_cors: true,
            jwt_secret: "insecure-dev-secret".to_string(),
            maintenance_mode: false,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(
        config: ApiServerConfig,
        db: DatabaseConnection,
        policy: AccessPolicy,
        store: Arc<dyn ObjectStore>,
        mailer: Arc<dyn SummaryMailer>,
    ) -> Self {
        let state = Arc::new(AppState {
            db,
            policy,
            sessions: SessionTokens::new(config.jwt_secret.as_bytes()),
            store,
            mailer,
            maintenance_mode: config.maintenance_mode,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        // Get the OpenAPI spec
        let api_doc = ApiDoc::openapi();

        // Build PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/auth/signin", post(handlers::sign_in))
            .route("/api/auth/logout", post(handlers::logout))
            .route("/api/showcase", get(handlers::list_showcase))
            .route("/api/files/{*key}", get(handlers::get_file))
            .with_state(self.state.clone());

        // Build PROTECTED routes (session required; per-endpoint checks
        // apply the permission matrix)
        let protected_router = Router::new()
            .route("/api/auth/me", get(handlers::me))
            .route("/api/profile", patch(handlers::update_profile))
            .route(
                "/api/projects",
                get(handlers::list_all_projects).post(handlers::create_project),
            )
            .route("/api/projects/mine", get(handlers::list_my_projects))
            .route("/api/projects/assigned", get(handlers::assigned_projects))
            .route(
                "/api/projects/{id}",
                get(handlers::get_project)
                    .patch(handlers::admin_update_project)
                    .delete(handlers::delete_project),
            )
            .route(
                "/api/projects/{id}/complete",
                post(handlers::complete_project),
            )
            .route(
                "/api/projects/{id}/summary",
                get(handlers::send_project_summary),
            )
            .route("/api/users", get(handlers::list_users))
            .route("/api/users/{id}/role", post(handlers::change_role))
            .route("/api/users/{id}", axum::routing::delete(handlers::delete_user))
            .route(
                "/api/achievements",
                get(handlers::list_achievements).post(handlers::create_achievement),
            )
            .route(
                "/api/achievements/{id}",
                axum::routing::delete(handlers::delete_achievement),
            )
            .route("/api/showcase", post(handlers::create_showcase))
            .route(
                "/api/showcase/{id}",
                axum::routing::delete(handlers::delete_showcase),
            )
            .route(
                "/api/overlords",
                get(handlers::list_overlords).post(handlers::create_overlord),
            )
            .route(
                "/api/overlords/{id}",
                axum::routing::delete(handlers::delete_overlord),
            )
            .route("/api/logs", get(handlers::list_logs))
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                self.state.clone(),
                middleware::require_auth,
            ));

        // Merge public and protected routers
        let api_router = public_router.merge(protected_router);

        // Merge with Swagger UI and the maintenance-aware fallback
        let maintenance_mode = self.state.maintenance_mode;
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router)
            .fallback(move |req: Request| async move { fallback_response(maintenance_mode, &req) });

        // Configure CORS
        let cors = if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            // Cookie-based auth needs credentials, which rules out
            // allow_origin(Any); accept the usual development origins.
            let cors_layer = CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::PATCH,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }));

            Some(cors_layer)
        } else {
            None
        };

        // Build middleware stack
        let mut router = router.layer(TraceLayer::new_for_http());

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);
        if self.config.maintenance_mode {
            info!("Maintenance mode is ON: non-API traffic gets the maintenance page");
        }

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    } else {
        info!("Shutdown signal received");
    }
}

const MAINTENANCE_PAGE: &str = "<!DOCTYPE html>\
<html><head><title>Idea Lab</title></head>\
<body><h1>Down for maintenance</h1>\
<p>The Idea Lab tracker is temporarily unavailable. Please check back soon.</p>\
</body></html>";

/// Catch-all for unrouted paths
///
/// With maintenance mode on, everything outside /api and /swagger-ui
/// answers with the static maintenance page.
fn fallback_response(maintenance_mode: bool, req: &Request) -> Response {
    let path = req.uri().path();

    if maintenance_mode && !path.starts_with("/api") && !path.starts_with("/swagger-ui") {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            MAINTENANCE_PAGE,
        )
            .into_response();
    }

    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        // Ensure OpenAPI spec can be generated without panics
        let _api_doc = ApiDoc::openapi();
    }
}
