// handlers/calendar.rs - /calendar/* handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{success_with, ApiJson, ApiPath, QueryParams};
use crate::services::calendar::{BookingOutcome, BookingRequest};

fn calendar_id(state: &AppState, query: &QueryParams) -> Result<String, ApiError> {
    state
        .calendar
        .calendar_or_default(query.get("calendarId"))
        .ok_or_else(|| ApiError::field_error("calendarId", "calendarId is required (no default calendar configured)"))
}

fn single(key: &str, value: Value) -> Json<Value> {
    let mut body = Map::new();
    body.insert(key.to_string(), value);
    success_with(body)
}

/// GET /calendar/list
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let items = state.calendar.list_calendars().await?;
    Ok(single("items", Value::Array(items)))
}

/// GET /calendar/events?calendarId&timeMin|periodStart&timeMax|periodEnd
pub async fn events(State(state): State<AppState>, query: QueryParams) -> Result<Json<Value>, ApiError> {
    let calendar_id = calendar_id(&state, &query)?;
    let events = state
        .calendar
        .list_events(
            &calendar_id,
            query.get_any(&["timeMin", "periodStart"]),
            query.get_any(&["timeMax", "periodEnd"]),
        )
        .await?;
    Ok(single("events", Value::Array(events)))
}

/// GET /calendar/event/:event_id?calendarId
pub async fn event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<String>,
    query: QueryParams,
) -> Result<Json<Value>, ApiError> {
    let calendar_id = calendar_id(&state, &query)?;
    let event = state.calendar.get_event(&calendar_id, &event_id).await?;
    Ok(single("event", event))
}

/// POST /calendar/event
///
/// 409 with the overlapping events when the slot is taken.
pub async fn book(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BookingRequest>,
) -> Result<Response, ApiError> {
    let booking = request.into_booking(state.calendar.config())?;

    match state.calendar.book(&booking).await? {
        BookingOutcome::Created(event) => Ok(Json(json!({
            "success": true,
            "available": true,
            "event": event,
        }))
        .into_response()),
        BookingOutcome::Busy(conflicts) => Ok((
            StatusCode::CONFLICT,
            Json(json!({
                "success": false,
                "available": false,
                "message": "Slot busy",
                "conflictingEvents": conflicts,
            })),
        )
            .into_response()),
    }
}
