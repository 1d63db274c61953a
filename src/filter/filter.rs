use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::pagination::Pagination;
use super::types::{FilterOrderInfo, FilterValue, SqlResult};

/// Count and page queries over one table built from a single predicate set.
pub struct Filter {
    table_name: String,
    where_data: FilterWhere,
    order_data: Vec<FilterOrderInfo>,
    pagination: Option<Pagination>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            where_data: FilterWhere::new(),
            order_data: vec![],
            pagination: None,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn where_clause(&mut self, conditions: FilterWhere) -> &mut Self {
        self.where_data = conditions;
        self
    }

    pub fn order(&mut self, order: Vec<FilterOrderInfo>) -> &mut Self {
        self.order_data = order;
        self
    }

    pub fn paginate(&mut self, pagination: Pagination) -> &mut Self {
        self.pagination = Some(pagination);
        self
    }

    /// `SELECT * ... [WHERE] [ORDER BY] [LIMIT $n OFFSET $m]`
    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, mut params) = self.where_data.generate(0)?;
        let order_clause = FilterOrder::generate(&self.order_data)?;

        let limit_clause = match self.pagination {
            Some(p) => {
                let limit_idx = params.len() + 1;
                params.push(FilterValue::Int(i64::from(p.limit)));
                params.push(FilterValue::Int(p.offset()));
                format!("LIMIT ${} OFFSET ${}", limit_idx, limit_idx + 1)
            }
            None => String::new(),
        };

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    /// The WHERE body and its parameters, numbered from `$1`.
    pub fn to_where_sql(&self) -> Result<SqlResult, FilterError> {
        let (query, params) = self.where_data.generate(0)?;
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let query = if where_result.query.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_result.query)
        };
        Ok(SqlResult { query, params: where_result.params })
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        let valid_start = name
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false);
        if !valid_start || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes_filter() -> Filter {
        let mut conditions = FilterWhere::new();
        conditions.eq("client_id", Some("c-9")).contains("tag", Some("call"));
        let mut filter = Filter::new("client_followup_notes").unwrap();
        filter
            .where_clause(conditions)
            .order(vec![
                FilterOrderInfo::desc("updated_at"),
                FilterOrderInfo::desc("created_at"),
                FilterOrderInfo::desc("id"),
            ])
            .paginate(Pagination { page: 3, limit: 20 });
        filter
    }

    #[test]
    fn page_and_count_share_predicates() {
        let filter = notes_filter();
        let page = filter.to_sql().unwrap();
        let count = filter.to_count_sql().unwrap();

        assert_eq!(
            page.query,
            "SELECT * FROM \"client_followup_notes\" WHERE \"client_id\" = $1 AND \"tag\" ILIKE $2 \
             ORDER BY \"updated_at\" DESC, \"created_at\" DESC, \"id\" DESC LIMIT $3 OFFSET $4"
        );
        assert_eq!(
            count.query,
            "SELECT COUNT(*) AS count FROM \"client_followup_notes\" WHERE \"client_id\" = $1 AND \"tag\" ILIKE $2"
        );
        assert_eq!(&page.params[..2], &count.params[..]);
        assert_eq!(&page.params[2..], &[FilterValue::Int(20), FilterValue::Int(40)]);
    }

    #[test]
    fn no_predicates_means_no_where() {
        let mut filter = Filter::new("warranties").unwrap();
        filter.paginate(Pagination { page: 1, limit: 10 });
        let sql = filter.to_sql().unwrap();
        assert_eq!(sql.query, "SELECT * FROM \"warranties\" LIMIT $1 OFFSET $2");
        assert_eq!(
            filter.to_count_sql().unwrap().query,
            "SELECT COUNT(*) AS count FROM \"warranties\""
        );
    }

    #[test]
    fn rejects_bad_table_names() {
        assert!(Filter::new("").is_err());
        assert!(Filter::new("1abc").is_err());
        assert!(Filter::new("users; drop").is_err());
    }
}
