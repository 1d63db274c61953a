use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::filter::PageInfo;

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None, // Default to 200 OK
            message: None,
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
            message: None,
        }
    }

    /// Attach a human-readable `message` next to `data`
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

fn serialization_failure(e: serde_json::Error) -> Response {
    tracing::error!("Failed to serialize response data: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": "Internal Server Error",
            "message": "Failed to serialize response data"
        })),
    )
        .into_response()
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => return serialization_failure(e),
        };

        let mut envelope = json!({
            "success": true,
            "data": data_value
        });
        if let Some(message) = self.message {
            envelope["message"] = Value::String(message);
        }

        (status, Json(envelope)).into_response()
    }
}

/// One page of rows with the paging metadata flattened next to `data`.
#[derive(Debug)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub page: PageInfo,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, page: PageInfo) -> Self {
        Self { data, page }
    }
}

#[derive(Serialize)]
struct PaginatedEnvelope<'a, T> {
    success: bool,
    data: &'a [T],
    #[serde(flatten)]
    page: &'a PageInfo,
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        let envelope = PaginatedEnvelope {
            success: true,
            data: &self.data,
            page: &self.page,
        };
        match serde_json::to_value(&envelope) {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(e) => serialization_failure(e),
        }
    }
}

/// Success body carrying caller-chosen top-level fields instead of `data`.
pub fn success_with(mut fields: serde_json::Map<String, Value>) -> Json<Value> {
    fields.insert("success".to_string(), Value::Bool(true));
    Json(Value::Object(fields))
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
