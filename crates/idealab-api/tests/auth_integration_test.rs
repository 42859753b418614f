//! Integration tests for sign-in admission and session handling

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use idealab_api::notify::LoggingMailer;
use idealab_api::storage::MemoryObjectStore;
use idealab_api::{models::*, ApiServer, ApiServerConfig};
use idealab_auth::AccessPolicy;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

use idealab_db::entities::user;

/// Helper to create an in-memory database with migrations applied
async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    idealab_db::migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Helper to create a test router; "root@idealab.dev" is the bypass address
fn create_test_app(db: DatabaseConnection) -> Router {
    let policy = AccessPolicy::new("poornima.org", vec!["root@idealab.dev".to_string()]);
    let config = ApiServerConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        enable_cors: true,
        jwt_secret: "test-secret".to_string(),
        maintenance_mode: false,
    };

    ApiServer::new(
        config,
        db,
        policy,
        Arc::new(MemoryObjectStore::new()),
        Arc::new(LoggingMailer),
    )
    .build_router()
}

fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

fn authed_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("Failed to build request")
}

async fn response_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&body).expect("Failed to parse body")
}

async fn sign_in(app: &Router, email: &str, name: &str) -> (StatusCode, Option<SignInResponse>) {
    let request = json_request(
        "POST",
        "/api/auth/signin",
        &json!({ "email": email, "name": name }),
    );
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");
    let status = response.status();

    if status.is_success() {
        (status, Some(response_json(response).await))
    } else {
        (status, None)
    }
}

#[tokio::test]
async fn test_first_sign_in_creates_student() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (status, data) = sign_in(&app, "alice@poornima.org", "Alice").await;

    assert_eq!(status, StatusCode::CREATED);
    let data = data.expect("No body");
    assert_eq!(data.user.email, "alice@poornima.org");
    assert_eq!(data.user.reg_id, "alice");
    assert_eq!(data.user.role, UserRole::Student);
    assert!(data.token.starts_with("eyJ"));
}

#[tokio::test]
async fn test_second_sign_in_reuses_row() {
    let db = create_test_db().await;
    let app = create_test_app(db.clone());

    let (status1, data1) = sign_in(&app, "alice@poornima.org", "Alice").await;
    assert_eq!(status1, StatusCode::CREATED);

    let (status2, data2) = sign_in(&app, "alice@poornima.org", "Alice").await;
    assert_eq!(status2, StatusCode::OK);
    assert_eq!(
        data1.expect("No body").user.id,
        data2.expect("No body").user.id
    );

    let count = user::Entity::find().count(&db).await.expect("Count failed");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_sign_in_keeps_prior_mutations() {
    let db = create_test_db().await;
    let app = create_test_app(db.clone());

    let (_, data) = sign_in(&app, "alice@poornima.org", "Alice").await;
    let token = data.expect("No body").token;

    // Set the branch once through the profile flow
    let request = Request::builder()
        .uri("/api/profile")
        .method("PATCH")
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(json!({ "branch": "CS" }).to_string()))
        .expect("Failed to build request");
    let response = app.clone().oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    // A later sign-in must not reset it
    let (_, data) = sign_in(&app, "alice@poornima.org", "Alice").await;
    assert_eq!(data.expect("No body").user.branch.as_deref(), Some("CS"));
}

#[tokio::test]
async fn test_external_email_refused_and_no_row_created() {
    let db = create_test_db().await;
    let app = create_test_app(db.clone());

    let (status, _) = sign_in(&app, "mallory@external.com", "Mallory").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let count = user::Entity::find().count(&db).await.expect("Count failed");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_bypass_address_signs_in_despite_domain() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (status, data) = sign_in(&app, "root@idealab.dev", "Root").await;
    assert_eq!(status, StatusCode::CREATED);
    // The stored role stays Student; authority derives from the policy
    assert_eq!(data.expect("No body").user.role, UserRole::Student);
}

#[tokio::test]
async fn test_me_requires_session() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let request = Request::builder()
        .uri("/api/auth/me")
        .body(Body::empty())
        .expect("Failed to build request");
    let response = app.oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, data) = sign_in(&app, "alice@poornima.org", "Alice").await;
    let token = data.expect("No body").token;

    let response = app
        .oneshot(authed_request("GET", "/api/auth/me", &token))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let me: UserInfo = response_json(response).await;
    assert_eq!(me.email, "alice@poornima.org");
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let response = app
        .oneshot(authed_request("GET", "/api/auth/me", "not-a-token"))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, data) = sign_in(&app, "alice@poornima.org", "Alice").await;
    let token = data.expect("No body").token;

    let request = Request::builder()
        .uri("/api/auth/me")
        .header("Cookie", format!("idealab_session={}", token))
        .body(Body::empty())
        .expect("Failed to build request");
    let response = app.oneshot(request).await.expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_role_is_read_fresh_on_every_request() {
    let db = create_test_db().await;
    let app = create_test_app(db.clone());

    let (_, data) = sign_in(&app, "tina@poornima.org", "Tina").await;
    let token = data.expect("No body").token;

    // Students have no reviewer view
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/projects/assigned", &token))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Promote directly in storage; the old token must see the new role
    let row = user::Entity::find()
        .filter(user::Column::Email.eq("tina@poornima.org"))
        .one(&db)
        .await
        .expect("Query failed")
        .expect("User not found");
    let mut active: user::ActiveModel = row.into();
    active.role = sea_orm::Set(user::UserRole::Teacher);
    sea_orm::ActiveModelTrait::update(active, &db)
        .await
        .expect("Update failed");

    let response = app
        .oneshot(authed_request("GET", "/api/projects/assigned", &token))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_profile_fields_set_once() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, data) = sign_in(&app, "alice@poornima.org", "Alice").await;
    let token = data.expect("No body").token;

    let patch = |body: serde_json::Value, token: String| {
        Request::builder()
            .uri("/api/profile")
            .method("PATCH")
            .header("content-type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::from(body.to_string()))
            .expect("Failed to build request")
    };

    let response = app
        .clone()
        .oneshot(patch(json!({ "branch": "ECE", "phone": "9876543210" }), token.clone()))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    // Second write to the same field is refused
    let response = app
        .clone()
        .oneshot(patch(json!({ "branch": "CS" }), token.clone()))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // An untouched field is still settable
    let response = app
        .oneshot(patch(json!({ "section": "B" }), token))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
}
