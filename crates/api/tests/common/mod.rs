#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use collab_api::auth::jwt::{generate_access_token, JwtConfig};
use collab_api::config::{LogFormat, ServerConfig};
use collab_api::router::build_app_router;
use collab_api::state::AppState;
use collab_core::project::ProjectMembership;
use collab_db::models::project::ProjectRecord;
use collab_db::repositories::ProjectRepo;
use collab_db::{DocumentStore, MemoryStore};
use collab_events::EventBus;

pub const TEST_JWT_SECRET: &str = "test-secret-for-integration-tests";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        database_url: None,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
        chat_debounce_secs: 120,
        chat_freshness_secs: 10,
        log_format: LogFormat::Pretty,
    }
}

/// The router together with the state behind it, so tests can seed the
/// store and inspect it after a request.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn store(&self) -> &dyn DocumentStore {
        self.state.store.as_ref()
    }

    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over an in-memory store.
pub fn build_test_app() -> TestApp {
    build_test_app_with_store(Arc::new(MemoryStore::new()))
}

/// Build the full application router over the given store.
pub fn build_test_app_with_store(store: Arc<dyn DocumentStore>) -> TestApp {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    let state = AppState::new(store, config.clone(), event_bus);
    let router = build_app_router(state.clone(), &config);
    TestApp { router, state }
}

/// Mint an access token for `user_id` signed with the test secret.
pub fn token_for(user_id: &str, name: &str) -> String {
    generate_access_token(user_id, name, &test_config().jwt).unwrap()
}

/// Seed a project owned by `owner_id`.
pub async fn create_project(app: &TestApp, owner_id: &str, title: &str) -> ProjectMembership {
    ProjectRepo::create(app.store(), &ProjectRecord::new(owner_id, title))
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}
