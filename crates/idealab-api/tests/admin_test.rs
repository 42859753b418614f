//! Integration tests for role management, overlords, audit log reads and
//! the maintenance gate

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use idealab_api::notify::LoggingMailer;
use idealab_api::storage::MemoryObjectStore;
use idealab_api::{models::*, ApiServer, ApiServerConfig};
use idealab_auth::AccessPolicy;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

use idealab_db::entities::user;
use uuid::Uuid;

async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    idealab_db::migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

fn create_test_app_with(db: DatabaseConnection, maintenance_mode: bool) -> Router {
    let policy = AccessPolicy::new("poornima.org", vec!["root@idealab.dev".to_string()]);
    let config = ApiServerConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        enable_cors: true,
        jwt_secret: "test-secret".to_string(),
        maintenance_mode,
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

fn create_test_app(db: DatabaseConnection) -> Router {
    create_test_app_with(db, false)
}

fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request")
}

async fn response_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&body).expect("Failed to parse body")
}

/// Sign in and return (user id, session token)
async fn sign_in(app: &Router, email: &str, name: &str) -> (Uuid, String) {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/signin",
            None,
            Some(json!({ "email": email, "name": name })),
        ))
        .await
        .expect("Request failed");
    assert!(response.status().is_success(), "sign-in failed");
    let data: SignInResponse = response_json(response).await;
    (data.user.id, data.token)
}

async fn change_role(
    app: &Router,
    actor_token: &str,
    target: Uuid,
    action: &str,
) -> (StatusCode, Option<UserInfo>) {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/users/{}/role", target),
            Some(actor_token),
            Some(json!({ "action": action })),
        ))
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
async fn test_promote_and_demote_one_rung_with_audit() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, root) = sign_in(&app, "root@idealab.dev", "Root").await;
    let (tina_id, _) = sign_in(&app, "tina@poornima.org", "Tina").await;

    // Student -> Teacher -> Admin
    let (status, info) = change_role(&app, &root, tina_id, "promote").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info.expect("No body").role, UserRole::Teacher);

    let (status, info) = change_role(&app, &root, tina_id, "promote").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info.expect("No body").role, UserRole::Admin);

    // Audit trail carries the old and new role
    let response = app
        .clone()
        .oneshot(request("GET", "/api/logs?category=other", Some(&root), None))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
    let logs: AdminLogList = response_json(response).await;
    assert_eq!(logs.total, 2);
    let newest = &logs.logs[0];
    assert_eq!(newest.category, LogCategory::Other);
    let metadata = newest.metadata.as_ref().expect("No metadata");
    assert_eq!(metadata["old_role"], "teacher");
    assert_eq!(metadata["new_role"], "admin");

    // Demote goes back down exactly one rung
    let (status, info) = change_role(&app, &root, tina_id, "demote").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info.expect("No body").role, UserRole::Teacher);
}

#[tokio::test]
async fn test_demoting_a_student_is_refused() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, root) = sign_in(&app, "root@idealab.dev", "Root").await;
    let (alice_id, _) = sign_in(&app, "alice@poornima.org", "Alice").await;

    let (status, _) = change_role(&app, &root, alice_id, "demote").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_super_admin_transitions_are_super_admin_only() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, root) = sign_in(&app, "root@idealab.dev", "Root").await;
    let (dean_id, dean) = sign_in(&app, "dean@poornima.org", "Dean").await;
    let (head_id, _) = sign_in(&app, "head@poornima.org", "Head").await;

    // Root walks both users up to Admin
    for target in [dean_id, head_id] {
        change_role(&app, &root, target, "promote").await;
        change_role(&app, &root, target, "promote").await;
    }

    // An ordinary admin may not promote an admin to super-admin
    let (status, _) = change_role(&app, &dean, head_id, "promote").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The super-admin may
    let (status, info) = change_role(&app, &root, head_id, "promote").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info.expect("No body").role, UserRole::SuperAdmin);

    // An ordinary admin may not touch a super-admin at all
    let (status, _) = change_role(&app, &dean, head_id, "demote").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The super-admin demotes back to Admin
    let (status, info) = change_role(&app, &root, head_id, "demote").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info.expect("No body").role, UserRole::Admin);
}

#[tokio::test]
async fn test_students_cannot_manage_users_or_read_logs() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (alice_id, alice) = sign_in(&app, "alice@poornima.org", "Alice").await;
    let (bob_id, _) = sign_in(&app, "bob@poornima.org", "Bob").await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/users", Some(&alice), None))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (status, _) = change_role(&app, &alice, bob_id, "promote").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/logs", Some(&alice), None))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request(
            "DELETE",
            &format!("/api/users/{}", alice_id),
            Some(&alice),
            None,
        ))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_deletes_user_with_audit() {
    let db = create_test_db().await;
    let app = create_test_app(db.clone());

    let (_, root) = sign_in(&app, "root@idealab.dev", "Root").await;
    let (bob_id, bob) = sign_in(&app, "bob@poornima.org", "Bob").await;

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/users/{}", bob_id),
            Some(&root),
            None,
        ))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The deleted user's session dies with the row
    let response = app
        .clone()
        .oneshot(request("GET", "/api/auth/me", Some(&bob), None))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request(
            "GET",
            "/api/logs?category=user_management",
            Some(&root),
            None,
        ))
        .await
        .expect("Request failed");
    let logs: AdminLogList = response_json(response).await;
    assert_eq!(logs.total, 1);
    assert!(logs.logs[0].message.contains("bob@poornima.org"));
}

#[tokio::test]
async fn test_overlord_lifecycle_and_sign_in() {
    let db = create_test_db().await;
    let app = create_test_app(db.clone());

    let (_, root) = sign_in(&app, "root@idealab.dev", "Root").await;

    // A plain admin may not manage the allowlist
    let (dean_id, dean) = sign_in(&app, "dean@poornima.org", "Dean").await;
    change_role(&app, &root, dean_id, "promote").await;
    change_role(&app, &root, dean_id, "promote").await;
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/overlords",
            Some(&dean),
            Some(json!({ "name": "Guest", "email": "guest@external.com" })),
        ))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // External sign-in is refused before allowlisting
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/signin",
            None,
            Some(json!({ "email": "guest@external.com", "name": "Guest" })),
        ))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Super-admin allowlists the address
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/overlords",
            Some(&root),
            Some(json!({ "name": "Guest", "email": "guest@external.com" })),
        ))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::CREATED);
    let overlord: OverlordInfo = response_json(response).await;

    // Now the address signs in and gets a user row
    let (_, guest) = sign_in(&app, "guest@external.com", "Guest").await;

    // Removing the allowlist entry does not remove the user
    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/overlords/{}", overlord.id),
            Some(&root),
            None,
        ))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let row = user::Entity::find()
        .filter(user::Column::Email.eq("guest@external.com"))
        .one(&db)
        .await
        .expect("Query failed");
    assert!(row.is_some(), "User must survive overlord removal");

    // The existing session still works, but a fresh sign-in is refused
    let response = app
        .clone()
        .oneshot(request("GET", "/api/auth/me", Some(&guest), None))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request(
            "POST",
            "/api/auth/signin",
            None,
            Some(json!({ "email": "guest@external.com", "name": "Guest" })),
        ))
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_log_filters_and_limit() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let (_, root) = sign_in(&app, "root@idealab.dev", "Root").await;
    let (tina_id, _) = sign_in(&app, "tina@poornima.org", "Tina").await;
    let (bob_id, _) = sign_in(&app, "bob@poornima.org", "Bob").await;

    change_role(&app, &root, tina_id, "promote").await;
    change_role(&app, &root, bob_id, "promote").await;

    // Search narrows to one record
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/logs?search=tina%40poornima.org",
            Some(&root),
            None,
        ))
        .await
        .expect("Request failed");
    let logs: AdminLogList = response_json(response).await;
    assert_eq!(logs.total, 1);
    assert!(logs.logs[0].message.contains("tina@poornima.org"));

    // Limit returns the newest record first
    let response = app
        .clone()
        .oneshot(request("GET", "/api/logs?limit=1", Some(&root), None))
        .await
        .expect("Request failed");
    let logs: AdminLogList = response_json(response).await;
    assert_eq!(logs.total, 1);
    assert!(logs.logs[0].message.contains("bob@poornima.org"));

    // Everything just written falls inside the "today" window
    let response = app
        .oneshot(request(
            "GET",
            "/api/logs?window=today",
            Some(&root),
            None,
        ))
        .await
        .expect("Request failed");
    let logs: AdminLogList = response_json(response).await;
    assert_eq!(logs.total, 2);
}

#[tokio::test]
async fn test_maintenance_gate_spares_the_api() {
    let db = create_test_db().await;
    let app = create_test_app_with(db, true);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_without_maintenance_fallback_is_plain_404() {
    let db = create_test_db().await;
    let app = create_test_app(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .expect("Failed to build request"),
        )
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
