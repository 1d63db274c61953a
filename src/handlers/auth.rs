// handlers/auth.rs - POST /auth/token handler

use axum::{extract::State, Json};
use serde_json::{Map, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::success_with;

/// Force a fresh management token and hand it back.
pub async fn token(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let access_token = state.identity.issue_token().await?;

    let mut body = Map::new();
    body.insert("access_token".into(), Value::String(access_token));
    body.insert("token_type".into(), Value::String("Bearer".into()));
    Ok(success_with(body))
}
