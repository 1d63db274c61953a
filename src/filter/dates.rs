use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::error::FilterError;

/// Which end of an inclusive range a date-only value should expand to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEdge {
    Start,
    End,
}

/// Parse a `date_start` / `date_end` style value.
///
/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates. A plain date
/// expands to the first (start) or last (end) instant of that UTC day.
pub fn parse_range_bound(
    field: &'static str,
    raw: Option<&str>,
    edge: RangeEdge,
) -> Result<Option<DateTime<Utc>>, FilterError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| FilterError::InvalidDate { field, value: raw.to_string() })?;
    let time = match edge {
        RangeEdge::Start => NaiveTime::MIN,
        RangeEdge::End => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
            .ok_or_else(|| FilterError::InvalidDate { field, value: raw.to_string() })?,
    };
    Ok(Some(date.and_time(time).and_utc()))
}
