use chrono::{DateTime, Utc};

/// A bound parameter value. Every predicate value travels as one of these so
/// the count and page queries bind identical argument lists.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    TextList(Vec<String>),
    Bool(bool),
    Int(i64),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(v: DateTime<Utc>) -> Self {
        FilterValue::Timestamp(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `column = $n`
    Eq,
    /// `column ILIKE $n`, value wrapped as `%value%`
    Contains,
    /// `column = ANY($n)` against a text array
    AnyOf,
    /// `column >= $n`
    Gte,
    /// `column <= $n`
    Lte,
}

impl FilterOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Contains => "ILIKE",
            FilterOp::AnyOf => "= ANY",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: FilterValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    /// Column used when `column` is NULL
    pub fallback: Option<String>,
    pub sort: SortDirection,
}

impl FilterOrderInfo {
    pub fn desc(column: impl Into<String>) -> Self {
        Self { column: column.into(), fallback: None, sort: SortDirection::Desc }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self { column: column.into(), fallback: None, sort: SortDirection::Asc }
    }

    pub fn or_else(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<FilterValue>,
}
