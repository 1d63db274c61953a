// handlers/users.rs - /users handlers (identity provider passthrough)

use axum::extract::State;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::app::AppState;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::{ApiJson, ApiPath, ApiResult, ApiResponse, OptionalJson, QueryParams};
use crate::services::identity::{JsonBody, ListParams};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// `page` / `per_page` from the query string, defaulting to the provider's first page.
pub(super) fn list_params(query: &QueryParams) -> Result<ListParams, ApiError> {
    let defaults = ListParams::default();
    Ok(ListParams {
        page: query.u32_or("page", defaults.page)?,
        per_page: query.u32_or("per_page", defaults.per_page)?,
    })
}

pub(super) fn str_field<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    body.get(field).and_then(Value::as_str)
}

/// A non-empty string array under `key`.
pub(super) fn require_ids(key: &str, ids: Option<Vec<String>>) -> Result<Vec<String>, ApiError> {
    let ids: Vec<String> = ids
        .unwrap_or_default()
        .into_iter()
        .filter(|id| !id.trim().is_empty())
        .collect();
    if ids.is_empty() {
        return Err(ApiError::field_error(key, format!("{} must be a non-empty array of ids", key)));
    }
    Ok(ids)
}

fn validate_new_user(body: &JsonBody) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    errors.require("email", str_field(body, "email"));
    errors.require("connection", str_field(body, "connection"));
    match str_field(body, "password") {
        Some(p) if p.chars().count() >= MIN_PASSWORD_LENGTH => {}
        Some(_) => errors.add(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ),
        None => errors.add("password", "This field is required"),
    }
    errors.into_result()
}

#[derive(Debug, Default, Deserialize)]
pub struct RolesBody {
    pub roles: Option<Vec<String>>,
}

/// GET /users?page&per_page&search
pub async fn list(State(state): State<AppState>, query: QueryParams) -> ApiResult<Value> {
    let params = list_params(&query)?;
    let users = state.identity.list_users(params, query.get("search")).await?;
    Ok(ApiResponse::success(users))
}

/// POST /users
pub async fn create(State(state): State<AppState>, ApiJson(body): ApiJson<JsonBody>) -> ApiResult<Value> {
    validate_new_user(&body)?;
    let user = state.identity.create_user(&body).await?;
    tracing::info!("Created identity user {}", str_field(&body, "email").unwrap_or_default());
    Ok(ApiResponse::created(user))
}

/// PATCH /users/:id
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<JsonBody>,
) -> ApiResult<Value> {
    if body.is_empty() {
        return Err(ApiError::bad_request("Request body must contain at least one field"));
    }
    let user = state.identity.update_user(&id, &body).await?;
    Ok(ApiResponse::success(user))
}

/// GET /users/:id/roles
pub async fn roles(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> ApiResult<Value> {
    let roles = state.identity.user_roles(&id).await?;
    Ok(ApiResponse::success(roles))
}

/// POST /users/:id/roles
pub async fn assign_roles(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<RolesBody>,
) -> ApiResult<Value> {
    let roles = require_ids("roles", body.roles)?;
    let reply = state.identity.assign_user_roles(&id, &roles).await?;
    Ok(ApiResponse::success(reply).with_message("Roles assigned"))
}

/// DELETE /users/:id/roles
pub async fn remove_roles(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    OptionalJson(body): OptionalJson<RolesBody>,
) -> ApiResult<Value> {
    let roles = require_ids("roles", body.roles)?;
    let reply = state.identity.remove_user_roles(&id, &roles).await?;
    Ok(ApiResponse::success(reply).with_message("Roles removed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> JsonBody {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn new_users_need_credentials_and_connection() {
        let err = validate_new_user(&body(json!({ "email": "a@b.co", "password": "short" }))).unwrap_err();
        let fields = err.to_json()["field_errors"].clone();
        assert!(fields["password"].as_str().unwrap().contains("8"));
        assert!(fields["connection"].is_string());
        assert!(fields.get("email").is_none());

        assert!(validate_new_user(&body(json!({
            "email": "a@b.co",
            "password": "longenough",
            "connection": "Username-Password-Authentication"
        })))
        .is_ok());
    }

    #[test]
    fn id_lists_must_not_be_empty() {
        assert!(require_ids("roles", None).is_err());
        assert!(require_ids("roles", Some(vec![" ".into()])).is_err());
        assert_eq!(require_ids("roles", Some(vec!["rol_1".into()])).unwrap(), vec!["rol_1"]);
    }

    #[test]
    fn list_params_default_to_first_provider_page() {
        let params = list_params(&QueryParams::parse(None)).unwrap();
        assert_eq!(params, ListParams { page: 0, per_page: 50 });
        let params = list_params(&QueryParams::parse(Some("page=2&per_page=5"))).unwrap();
        assert_eq!(params, ListParams { page: 2, per_page: 5 });
        assert!(list_params(&QueryParams::parse(Some("page=-1"))).is_err());
    }
}
