use sqlx::{
    self,
    postgres::{PgArguments, PgRow},
    query::{Query, QueryAs},
    FromRow, PgPool, Postgres, Row,
};

use crate::database::manager::DatabaseError;
use crate::filter::{Filter, FilterValue};

/// Runs the count and page queries a [`Filter`] renders.
pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_all(&self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.filter.to_sql()?;
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql_result = self.filter.to_count_sql()?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

pub(crate) fn bind_param_query<'q>(
    q: Query<'q, Postgres, PgArguments>,
    v: &FilterValue,
) -> Query<'q, Postgres, PgArguments> {
    match v {
        FilterValue::Text(s) => q.bind(s.clone()),
        FilterValue::TextList(list) => q.bind(list.clone()),
        FilterValue::Bool(b) => q.bind(*b),
        FilterValue::Int(i) => q.bind(*i),
        FilterValue::Timestamp(ts) => q.bind(*ts),
    }
}

pub(crate) fn bind_param_query_as<'q, O>(
    q: QueryAs<'q, Postgres, O, PgArguments>,
    v: &FilterValue,
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        FilterValue::Text(s) => q.bind(s.clone()),
        FilterValue::TextList(list) => q.bind(list.clone()),
        FilterValue::Bool(b) => q.bind(*b),
        FilterValue::Int(i) => q.bind(*i),
        FilterValue::Timestamp(ts) => q.bind(*ts),
    }
}
