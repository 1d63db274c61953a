// handlers/root.rs - GET / and GET /health handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::AppState;
use crate::database::DatabaseError;

pub async fn info(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "name": "CRM Gateway",
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment,
            "endpoints": {
                "identity": ["/api/v1/auth/token", "/api/v1/users", "/api/v1/roles"],
                "records": ["/api/v1/warranties", "/api/v1/client-followup-notes"],
                "calendar": ["/api/v1/calendar/list", "/api/v1/calendar/events", "/api/v1/calendar/event"]
            }
        }
    }))
}

/// Liveness plus a ping of the default database when one is configured.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.databases.health_check().await {
        Ok(()) => "ok",
        Err(DatabaseError::NoDefaultDatabase) => "not_configured",
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "Service Unavailable",
                    "message": "Database health check failed",
                })),
            );
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "status": "ok",
                "database": database,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        })),
    )
}
