use axum::{
    http::{header, HeaderValue, StatusCode, Uri},
    middleware::{from_fn_with_state, map_response},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::handlers::{auth, calendar, followup_notes, roles, root, users, warranties};
use crate::middleware::tenant_pool_middleware;
use crate::services::{CalendarClient, IdentityClient};

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub databases: Arc<DatabaseManager>,
    pub identity: Arc<IdentityClient>,
    pub calendar: Arc<CalendarClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;
        Ok(Self {
            databases: Arc::new(DatabaseManager::new(&config)),
            identity: Arc::new(IdentityClient::new(http.clone(), &config.identity)),
            calendar: Arc::new(CalendarClient::new(http, config.calendar.clone())),
            config: Arc::new(config),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .merge(identity_routes())
        .merge(calendar_routes())
        .merge(record_routes(&state));

    Router::new()
        // Public
        .route("/", get(root::info))
        .route("/health", get(root::health))
        .nest("/api/v1", v1)
        // Legacy prefix kept for identity clients
        .nest("/api", identity_routes())
        .fallback(not_found)
        .layer(map_response(method_not_allowed))
        .layer(cors_layer(&state.config.server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn identity_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(auth::token))
        .route("/users", get(users::list).post(users::create))
        .route("/users/:id", patch(users::update))
        .route(
            "/users/:id/roles",
            get(users::roles).post(users::assign_roles).delete(users::remove_roles),
        )
        .route("/roles", get(roles::list).post(roles::create))
        .route("/roles/:id", patch(roles::update))
        .route("/roles/:id/users", get(roles::users).post(roles::assign_users))
}

fn calendar_routes() -> Router<AppState> {
    Router::new()
        .route("/calendar/list", get(calendar::list))
        .route("/calendar/events", get(calendar::events))
        .route("/calendar/event", post(calendar::book))
        .route("/calendar/event/:event_id", get(calendar::event))
}

/// Record routes resolve `ref` to a pool before the handler runs.
fn record_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/warranties",
            get(warranties::warranty_list).post(warranties::warranty_create),
        )
        .route(
            "/warranties/:id",
            get(warranties::warranty_show)
                .patch(warranties::warranty_update)
                .put(warranties::warranty_update)
                .delete(warranties::warranty_delete),
        )
        .route(
            "/client-followup-notes",
            get(followup_notes::note_list).post(followup_notes::note_create),
        )
        .route("/client-followup-notes/stats", get(followup_notes::note_stats))
        .route(
            "/client-followup-notes/:id",
            get(followup_notes::note_show)
                .patch(followup_notes::note_update)
                .put(followup_notes::note_update)
                .delete(followup_notes::note_delete),
        )
        .route_layer(from_fn_with_state(state.clone(), tenant_pool_middleware))
}

/// `*` allows any origin; an empty list sends no CORS headers at all.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Wraps axum's bare 405 in the error envelope, keeping the `Allow` header.
async fn method_not_allowed(uri: Uri, response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let mut enveloped = (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "success": false,
            "error": "Method Not Allowed",
            "path": uri.path(),
        })),
    )
        .into_response();
    if let Some(allow) = response.headers().get(header::ALLOW) {
        enveloped.headers_mut().insert(header::ALLOW, allow.clone());
    }
    enveloped
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Not Found",
            "path": uri.path(),
        })),
    )
}
