// handlers/roles.rs - /roles handlers (identity provider passthrough)

use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;

use super::users::{list_params, require_ids, str_field};
use crate::app::AppState;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiJson, ApiPath, ApiResult, ApiResponse, QueryParams};
use crate::services::identity::JsonBody;

#[derive(Debug, Default, Deserialize)]
pub struct UsersBody {
    pub users: Option<Vec<String>>,
}

/// GET /roles?page&per_page
pub async fn list(State(state): State<AppState>, query: QueryParams) -> ApiResult<Value> {
    let roles = state.identity.list_roles(list_params(&query)?).await?;
    Ok(ApiResponse::success(roles))
}

/// POST /roles
pub async fn create(State(state): State<AppState>, ApiJson(body): ApiJson<JsonBody>) -> ApiResult<Value> {
    let mut errors = FieldErrors::new();
    errors.require("name", str_field(&body, "name"));
    errors.require("description", str_field(&body, "description"));
    errors.into_result()?;

    let role = state.identity.create_role(&body).await?;
    Ok(ApiResponse::created(role))
}

/// PATCH /roles/:id
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<JsonBody>,
) -> ApiResult<Value> {
    if body.is_empty() {
        return Err(ApiError::bad_request("Request body must contain at least one field"));
    }
    let role = state.identity.update_role(&id, &body).await?;
    Ok(ApiResponse::success(role))
}

/// GET /roles/:id/users?page&per_page
pub async fn users(State(state): State<AppState>, ApiPath(id): ApiPath<String>, query: QueryParams) -> ApiResult<Value> {
    let users = state.identity.role_users(&id, list_params(&query)?).await?;
    Ok(ApiResponse::success(users))
}

/// POST /roles/:id/users
pub async fn assign_users(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<UsersBody>,
) -> ApiResult<Value> {
    let users = require_ids("users", body.users)?;
    let reply = state.identity.assign_role_users(&id, &users).await?;
    Ok(ApiResponse::success(reply).with_message("Users assigned to role"))
}
