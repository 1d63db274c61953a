use super::error::FilterError;
use super::types::{FilterOp, FilterValue, FilterWhereInfo};

/// Ordered conjunction of predicates.
///
/// Conditions are only recorded for values that are present, so an empty
/// `FilterWhere` renders no WHERE clause at all.
#[derive(Debug, Clone, Default)]
pub struct FilterWhere {
    conditions: Vec<FilterWhereInfo>,
}

impl FilterWhere {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.conditions
    }

    /// `column = value`
    pub fn eq<V: Into<FilterValue>>(&mut self, column: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.push(column, FilterOp::Eq, v.into());
        }
        self
    }

    /// Case-insensitive substring match. Blank needles are ignored.
    pub fn contains(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.push(column, FilterOp::Contains, FilterValue::Text(format!("%{}%", escape_like(v))));
        }
        self
    }

    /// Set membership. An empty set is treated like an absent filter.
    pub fn any_of(&mut self, column: &str, values: Option<&[String]>) -> &mut Self {
        if let Some(vs) = values.filter(|vs| !vs.is_empty()) {
            self.push(column, FilterOp::AnyOf, FilterValue::TextList(vs.to_vec()));
        }
        self
    }

    /// Inclusive lower bound.
    pub fn gte<V: Into<FilterValue>>(&mut self, column: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.push(column, FilterOp::Gte, v.into());
        }
        self
    }

    /// Inclusive upper bound.
    pub fn lte<V: Into<FilterValue>>(&mut self, column: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.push(column, FilterOp::Lte, v.into());
        }
        self
    }

    fn push(&mut self, column: &str, operator: FilterOp, data: FilterValue) {
        self.conditions.push(FilterWhereInfo { column: column.to_string(), operator, data });
    }

    /// Render the conjunction with placeholders numbered from
    /// `starting_param_index + 1`. Returns an empty string when there are no
    /// conditions.
    pub fn generate(&self, starting_param_index: usize) -> Result<(String, Vec<FilterValue>), FilterError> {
        let mut param_index = starting_param_index;
        let mut params = Vec::with_capacity(self.conditions.len());
        let mut sql_conditions = Vec::with_capacity(self.conditions.len());

        for condition in &self.conditions {
            validate_column(&condition.column)?;
            param_index += 1;
            let quoted_column = format!("\"{}\"", condition.column);
            let sql = match condition.operator {
                FilterOp::AnyOf => format!("{} = ANY(${})", quoted_column, param_index),
                op => format!("{} {} ${}", quoted_column, op.to_sql(), param_index),
            };
            sql_conditions.push(sql);
            params.push(condition.data.clone());
        }

        Ok((sql_conditions.join(" AND "), params))
    }
}

/// Escape LIKE metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub(crate) fn validate_column(column: &str) -> Result<(), FilterError> {
    let mut chars = column.chars();
    let valid_start = chars.next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false);
    if !valid_start || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
    }
    Ok(())
}
