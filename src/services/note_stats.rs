use chrono::{DateTime, Datelike, Days, Month, NaiveDate, NaiveTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use sqlx::PgPool;
use std::collections::HashMap;

use super::followup_notes::NoteFilter;
use crate::database::models::ClientFollowupNote;
use crate::database::query_builder::bind_param_query_as;
use crate::database::DatabaseError;
use crate::filter::FilterWhere;

pub const DAILY_BUCKETS: u64 = 30;

/// Ordered `label -> count` pairs, serialized as a JSON object in bucket order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsBuckets(pub Vec<(String, i64)>);

impl StatsBuckets {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> i64 {
        self.0.iter().map(|(_, n)| n).sum()
    }

    pub fn get(&self, label: &str) -> Option<i64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, n)| *n)
    }
}

impl Serialize for StatsBuckets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NoteStats {
    pub daily: StatsBuckets,
    pub monthly: StatsBuckets,
}

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn end_of(day: NaiveDate) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
    day.and_time(last).and_utc()
}

/// `[today - 29 days 00:00, today 23:59:59.999999]` in UTC
pub fn daily_window(today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = today.checked_sub_days(Days::new(DAILY_BUCKETS - 1)).unwrap_or(today);
    (start_of(first), end_of(today))
}

/// Whole calendar year containing `today`, in UTC
pub fn yearly_window(today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let year = today.year();
    let first = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today);
    let last = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today);
    (start_of(first), end_of(last))
}

/// Today first (labelled `Today`), then the 29 preceding days as `Oct 3`.
pub fn daily_buckets(today: NaiveDate, counts: &HashMap<NaiveDate, i64>) -> StatsBuckets {
    let buckets = (0..DAILY_BUCKETS)
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .enumerate()
        .map(|(i, day)| {
            let label = if i == 0 {
                "Today".to_string()
            } else {
                format!("{} {}", day.format("%b"), day.day())
            };
            (label, counts.get(&day).copied().unwrap_or(0))
        })
        .collect();
    StatsBuckets(buckets)
}

/// `January` through `December`, keyed by month number 1..=12.
pub fn monthly_buckets(counts: &HashMap<u32, i64>) -> StatsBuckets {
    let buckets = (1..=12u8)
        .filter_map(|m| Month::try_from(m).ok().map(|month| (u32::from(m), month)))
        .map(|(m, month)| (month.name().to_string(), counts.get(&m).copied().unwrap_or(0)))
        .collect();
    StatsBuckets(buckets)
}

pub struct NoteStatsService {
    pool: PgPool,
}

impl NoteStatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Daily and monthly counts for the notes matching `filter`, queried
    /// concurrently. Any date range on the filter is ignored.
    pub async fn collect(&self, filter: &NoteFilter) -> Result<NoteStats, DatabaseError> {
        let today = Utc::now().date_naive();
        let (daily, monthly) = tokio::try_join!(self.daily_counts(filter, today), self.monthly_counts(filter, today))?;
        Ok(NoteStats {
            daily: daily_buckets(today, &daily),
            monthly: monthly_buckets(&monthly),
        })
    }

    async fn daily_counts(&self, filter: &NoteFilter, today: NaiveDate) -> Result<HashMap<NaiveDate, i64>, DatabaseError> {
        let (start, end) = daily_window(today);
        let (where_clause, params) = windowed(filter, start, end).generate(0)?;
        let query = format!(
            "SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS total \
             FROM \"{}\" WHERE {} GROUP BY day",
            ClientFollowupNote::TABLE,
            where_clause
        );

        let mut q = sqlx::query_as::<_, (NaiveDate, i64)>(&query);
        for p in params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().collect())
    }

    async fn monthly_counts(&self, filter: &NoteFilter, today: NaiveDate) -> Result<HashMap<u32, i64>, DatabaseError> {
        let (start, end) = yearly_window(today);
        let (where_clause, params) = windowed(filter, start, end).generate(0)?;
        let query = format!(
            "SELECT EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::int AS month, COUNT(*) AS total \
             FROM \"{}\" WHERE {} GROUP BY month",
            ClientFollowupNote::TABLE,
            where_clause
        );

        let mut q = sqlx::query_as::<_, (i32, i64)>(&query);
        for p in params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .filter_map(|(month, total)| u32::try_from(month).ok().map(|m| (m, total)))
            .collect())
    }
}

fn windowed(filter: &NoteFilter, start: DateTime<Utc>, end: DateTime<Utc>) -> FilterWhere {
    let mut conditions = filter.base_conditions();
    conditions.gte("created_at", Some(start)).lte("created_at", Some(end));
    conditions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_stats_are_zero_filled() {
        let daily = daily_buckets(day(2024, 10, 16), &HashMap::new());
        let monthly = monthly_buckets(&HashMap::new());
        assert_eq!(daily.len(), 30);
        assert_eq!(monthly.len(), 12);
        assert_eq!(daily.total() + monthly.total(), 0);
    }

    #[test]
    fn daily_labels_start_with_today_and_cross_months() {
        let mut counts = HashMap::new();
        counts.insert(day(2024, 10, 3), 4);
        counts.insert(day(2024, 9, 20), 1);
        let daily = daily_buckets(day(2024, 10, 16), &counts);

        assert_eq!(daily.0[0].0, "Today");
        assert_eq!(daily.0[1].0, "Oct 15");
        assert_eq!(daily.get("Oct 3"), Some(4));
        assert_eq!(daily.get("Sep 20"), Some(1));
        assert_eq!(daily.0[29].0, "Sep 17");
    }

    #[test]
    fn monthly_labels_are_calendar_names() {
        let mut counts = HashMap::new();
        counts.insert(2, 7);
        counts.insert(12, 1);
        let monthly = monthly_buckets(&counts);
        assert_eq!(monthly.0[0], ("January".to_string(), 0));
        assert_eq!(monthly.get("February"), Some(7));
        assert_eq!(monthly.0[11], ("December".to_string(), 1));
    }

    #[test]
    fn windows_cover_whole_days() {
        let (start, end) = daily_window(day(2024, 3, 1));
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert!(end < Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());

        let (start, end) = yearly_window(day(2024, 7, 4));
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(end > Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn buckets_serialize_in_order() {
        let json = serde_json::to_string(&monthly_buckets(&HashMap::new())).unwrap();
        assert!(json.starts_with("{\"January\":0,\"February\":0"));
        assert!(json.ends_with("\"December\":0}"));
    }

    #[test]
    fn stats_window_is_bound_as_parameters() {
        let filter = NoteFilter {
            client_id: Some("c1".into()),
            date_start: Some(Utc::now()),
            ..Default::default()
        };
        let (start, end) = daily_window(day(2024, 10, 16));
        let (sql, params) = windowed(&filter, start, end).generate(0).unwrap();
        assert_eq!(sql, "\"client_id\" = $1 AND \"created_at\" >= $2 AND \"created_at\" <= $3");
        assert_eq!(params.len(), 3);
    }
}
