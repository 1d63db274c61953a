use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDateTime, TimeZone};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

use super::error::UpstreamError;
use crate::config::CalendarConfig;
use crate::error::{ApiError, FieldErrors};

pub const AVAILABILITY_DEADLINE: Duration = Duration::from_secs(10);
pub const INSERT_DEADLINE: Duration = Duration::from_secs(15);
pub const DEFAULT_SUMMARY: &str = "Cita";

#[derive(Debug, Clone, Deserialize)]
pub struct Attendee {
    pub email: String,
}

/// Body of `POST /calendar/event`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub calendar_id: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Option<Vec<Attendee>>,
}

/// A validated booking with both ends resolved to absolute times.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub calendar_id: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub attendees: Option<Vec<String>>,
}

impl BookingRequest {
    pub fn into_booking(self, config: &CalendarConfig) -> Result<Booking, ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("calendarId", self.calendar_id.as_deref());
        errors.require("startDateTime", self.start_date_time.as_deref());
        errors.into_result()?;

        let raw_start = self.start_date_time.unwrap_or_default();
        let start = parse_slot_time(&raw_start, config.utc_offset_minutes)
            .ok_or_else(|| ApiError::field_error("startDateTime", format!("Invalid date-time: {}", raw_start)))?;

        let end = match self.end_date_time.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw_end) => parse_slot_time(raw_end, config.utc_offset_minutes)
                .ok_or_else(|| ApiError::field_error("endDateTime", format!("Invalid date-time: {}", raw_end)))?,
            None => start + ChronoDuration::minutes(config.appointment_minutes),
        };
        if end <= start {
            return Err(ApiError::field_error("endDateTime", "endDateTime must be after startDateTime"));
        }

        Ok(Booking {
            calendar_id: self.calendar_id.unwrap_or_default(),
            start,
            end,
            summary: self
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
            description: self.description.filter(|s| !s.is_empty()),
            location: self.location.filter(|s| !s.is_empty()),
            attendees: self.attendees.map(|list| list.into_iter().map(|a| a.email).collect()),
        })
    }
}

/// RFC 3339, or a local `YYYY-MM-DDTHH:MM[:SS]` interpreted at the
/// configured offset.
pub fn parse_slot_time(raw: &str, utc_offset_minutes: i32) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()?;
    let offset = FixedOffset::east_opt(utc_offset_minutes.checked_mul(60)?)?;
    offset.from_local_datetime(&naive).single()
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Created(Value),
    Busy(Vec<Value>),
}

/// Bearer-token client for a Google-Calendar-compatible REST API.
pub struct CalendarClient {
    http: Client,
    config: CalendarConfig,
}

impl CalendarClient {
    pub fn new(http: Client, config: CalendarConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// The requested calendar, falling back to `CALENDAR_DEFAULT_ID`.
    pub fn calendar_or_default(&self, requested: Option<&str>) -> Option<String> {
        requested
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.config.default_calendar_id.clone())
    }

    pub async fn list_calendars(&self) -> Result<Vec<Value>, UpstreamError> {
        let body = self
            .send(Method::GET, &["users", "me", "calendarList"], &[], None)
            .await?;
        Ok(items(body))
    }

    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: Option<&str>,
        time_max: Option<&str>,
    ) -> Result<Vec<Value>, UpstreamError> {
        let mut query = vec![
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        if let Some(v) = time_min {
            query.push(("timeMin", v.to_string()));
        }
        if let Some(v) = time_max {
            query.push(("timeMax", v.to_string()));
        }
        let body = self
            .send(Method::GET, &["calendars", calendar_id, "events"], &query, None)
            .await?;
        Ok(items(body))
    }

    pub async fn get_event(&self, calendar_id: &str, event_id: &str) -> Result<Value, UpstreamError> {
        self.send(Method::GET, &["calendars", calendar_id, "events", event_id], &[], None)
            .await
    }

    /// Check the slot for overlapping events, then create the event.
    ///
    /// The two upstream calls run under separate deadlines; there is no lock
    /// between them.
    pub async fn book(&self, booking: &Booking) -> Result<BookingOutcome, UpstreamError> {
        let time_min = booking.start.to_rfc3339();
        let time_max = booking.end.to_rfc3339();

        let conflicts = with_deadline(
            AVAILABILITY_DEADLINE,
            "Calendar API timeout while checking availability",
            self.list_events(&booking.calendar_id, Some(&time_min), Some(&time_max)),
        )
        .await?;

        if !conflicts.is_empty() {
            info!(
                "Slot {} - {} busy on calendar {} ({} events)",
                time_min,
                time_max,
                booking.calendar_id,
                conflicts.len()
            );
            return Ok(BookingOutcome::Busy(conflicts));
        }

        let event = self.event_body(booking);
        let created = with_deadline(
            INSERT_DEADLINE,
            "Calendar API timeout while creating event",
            self.send(
                Method::POST,
                &["calendars", booking.calendar_id.as_str(), "events"],
                &[("sendUpdates", "all".to_string())],
                Some(&event),
            ),
        )
        .await?;

        info!("Created calendar event on {} at {}", booking.calendar_id, time_min);
        Ok(BookingOutcome::Created(created))
    }

    fn event_body(&self, booking: &Booking) -> Value {
        let mut event = Map::new();
        event.insert("summary".into(), json!(booking.summary));
        event.insert(
            "start".into(),
            json!({ "dateTime": booking.start.to_rfc3339(), "timeZone": self.config.timezone }),
        );
        event.insert(
            "end".into(),
            json!({ "dateTime": booking.end.to_rfc3339(), "timeZone": self.config.timezone }),
        );
        if let Some(description) = &booking.description {
            event.insert("description".into(), json!(description));
        }
        if let Some(location) = &booking.location {
            event.insert("location".into(), json!(location));
        }
        if let Some(attendees) = &booking.attendees {
            let list: Vec<Value> = attendees.iter().map(|email| json!({ "email": email })).collect();
            event.insert("attendees".into(), Value::Array(list));
        }
        Value::Object(event)
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, UpstreamError> {
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("CALENDAR_ACCESS_TOKEN"))?;

        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", self.config.api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.config.api_base.clone()))?
            .pop_if_empty()
            .extend(segments);

        let mut request = self.http.request(method, url).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            error!("Calendar API responded {}: {}", status, text);
            return Err(UpstreamError::Request { status, body: text });
        }

        Ok(response.json().await?)
    }
}

async fn with_deadline<T, F>(deadline: Duration, message: &'static str, fut: F) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| UpstreamError::Timeout(message))?
}

fn items(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => vec![],
        },
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn config() -> CalendarConfig {
        AppConfig::development().calendar
    }

    #[test]
    fn local_times_use_configured_offset() {
        let ts = parse_slot_time("2024-05-01T10:00:00", -300).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:00:00-05:00");

        let ts = parse_slot_time("2024-05-01T10:00", 60).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:00:00+01:00");

        let ts = parse_slot_time("2024-05-01T15:00:00Z", -300).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T15:00:00+00:00");

        assert!(parse_slot_time("tomorrow at noon", 0).is_none());
    }

    #[test]
    fn booking_defaults_end_and_summary() {
        let booking = BookingRequest {
            calendar_id: Some("primary".into()),
            start_date_time: Some("2024-05-01T10:00:00-05:00".into()),
            ..Default::default()
        }
        .into_booking(&config())
        .unwrap();

        assert_eq!(booking.summary, "Cita");
        assert_eq!(booking.end - booking.start, ChronoDuration::minutes(30));
    }

    #[test]
    fn booking_requires_calendar_and_start() {
        let err = BookingRequest::default().into_booking(&config()).unwrap_err();
        let body = err.to_json();
        assert!(body["field_errors"]["calendarId"].is_string());
        assert!(body["field_errors"]["startDateTime"].is_string());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = BookingRequest {
            calendar_id: Some("primary".into()),
            start_date_time: Some("2024-05-01T10:00:00Z".into()),
            end_date_time: Some("2024-05-01T09:00:00Z".into()),
            ..Default::default()
        }
        .into_booking(&config())
        .unwrap_err();
        assert!(err.to_json()["field_errors"]["endDateTime"].is_string());
    }

    #[test]
    fn event_body_carries_timezone_and_optionals() {
        let client = CalendarClient::new(Client::new(), config());
        let booking = BookingRequest {
            calendar_id: Some("primary".into()),
            start_date_time: Some("2024-05-01T10:00:00-05:00".into()),
            location: Some("Store 4".into()),
            attendees: Some(vec![Attendee { email: "a@example.com".into() }]),
            ..Default::default()
        }
        .into_booking(&client.config)
        .unwrap();

        let body = client.event_body(&booking);
        assert_eq!(body["start"]["timeZone"], "America/Bogota");
        assert_eq!(body["location"], "Store 4");
        assert_eq!(body["attendees"][0]["email"], "a@example.com");
        assert!(body.get("description").is_none());
    }

    #[tokio::test]
    async fn missing_token_is_reported() {
        let client = CalendarClient::new(Client::new(), config());
        let err = client.list_calendars().await.unwrap_err();
        assert!(matches!(err, UpstreamError::NotConfigured("CALENDAR_ACCESS_TOKEN")));
    }
}
