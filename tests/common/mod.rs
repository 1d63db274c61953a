#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection};

use crm_gateway::config::AppConfig;
use crm_gateway::{router, AppState};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// In-process gateway bound to an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
}

impl TestServer {
    pub async fn spawn(config: AppConfig) -> Result<Self> {
        let state = AppState::new(config).context("failed to build app state")?;
        let base_url = serve(router(state.clone())).await?;
        Ok(Self { base_url, state })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn serve(app: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

/// Development defaults with no database and no upstreams wired in.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.identity.url_base = "http://127.0.0.1:9".to_string();
    config.calendar.api_base = "http://127.0.0.1:9".to_string();
    config
}

/// Config pointing the default pool at `TEST_DATABASE_URL`, or `None` when
/// the variable is unset and database scenarios should be skipped.
pub async fn database_config() -> Result<Option<AppConfig>> {
    let Some(url) = std::env::var("TEST_DATABASE_URL").ok().filter(|u| !u.trim().is_empty()) else {
        return Ok(None);
    };
    migrate(&url).await?;
    let mut config = test_config();
    config.database.default_url = Some(url);
    Ok(Some(config))
}

async fn migrate(url: &str) -> Result<()> {
    let mut conn = PgConnection::connect(url).await.context("failed to connect to TEST_DATABASE_URL")?;
    // Test binaries run in parallel threads; serialize schema creation.
    conn.execute("SELECT pg_advisory_lock(724001)").await?;
    let result = conn.execute(SCHEMA).await;
    conn.execute("SELECT pg_advisory_unlock(724001)").await?;
    result.context("failed to apply schema")?;
    conn.close().await?;
    Ok(())
}

/// Marker unique to one test run, used to scope filters to rows this test created.
pub fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{}-{}", prefix, nanos)
}

/// Stand-in for the identity provider's token endpoint and Management API.
#[derive(Default)]
pub struct FakeIdentity {
    pub token_calls: AtomicUsize,
    pub reject_next_with_401: std::sync::atomic::AtomicBool,
}

impl FakeIdentity {
    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }
}

pub async fn spawn_fake_identity() -> Result<(String, Arc<FakeIdentity>)> {
    let fake = Arc::new(FakeIdentity::default());
    let app = Router::new()
        .route("/oauth/token", post(fake_token))
        .route("/api/v2/users", get(fake_users).post(fake_create_user))
        .route("/api/v2/users/:id", patch(fake_update_user))
        .route("/api/v2/users/:id/roles", post(fake_no_content).delete(fake_no_content))
        .route("/api/v2/roles", get(fake_forbidden))
        .with_state(fake.clone());
    let base_url = serve(app).await?;
    Ok((base_url, fake))
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn fake_token(State(fake): State<Arc<FakeIdentity>>, Json(body): Json<Value>) -> impl IntoResponse {
    if body["grant_type"] != "client_credentials" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "unsupported_grant_type" })));
    }
    let n = fake.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
    (
        StatusCode::OK,
        Json(json!({
            "access_token": format!("token-{}", n),
            "token_type": "Bearer",
            "expires_in": 86400,
        })),
    )
}

async fn fake_users(headers: HeaderMap, RawQuery(query): RawQuery) -> impl IntoResponse {
    Json(json!({
        "users": [{ "user_id": "auth0|1", "email": "ana@example.com" }],
        "token": bearer(&headers),
        "query": query,
    }))
}

async fn fake_create_user(Json(body): Json<Value>) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({ "user_id": "auth0|2", "email": body["email"] })),
    )
}

async fn fake_update_user(
    State(fake): State<Arc<FakeIdentity>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if fake.reject_next_with_401.swap(false, Ordering::SeqCst) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Expired token" })));
    }
    (StatusCode::OK, Json(json!({ "user_id": id, "name": body["name"] })))
}

async fn fake_no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fake_forbidden() -> impl IntoResponse {
    (StatusCode::FORBIDDEN, Json(json!({ "message": "Insufficient scope" })))
}
