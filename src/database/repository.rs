use sqlx::{self, postgres::PgRow, FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::filter::{Filter, FilterError};

/// Table-scoped read access for one row type.
pub struct Repository<T> {
    table_name: String,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>, pool: PgPool) -> Self {
        Self {
            table_name: table_name.into(),
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Total matching rows, then the requested page. The two statements are
    /// not wrapped in a transaction.
    pub async fn paginate(&self, filter: Filter) -> Result<(Vec<T>, i64), DatabaseError> {
        if filter.table_name() != self.table_name {
            return Err(FilterError::InvalidTableName(filter.table_name().to_string()).into());
        }
        let builder = QueryBuilder::<T>::new(filter);
        let total = builder.count(&self.pool).await?;
        let rows = builder.select_all(&self.pool).await?;
        Ok((rows, total))
    }

    pub async fn select_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        let query = format!("SELECT * FROM \"{}\" WHERE id = $1", self.table_name);
        let row = sqlx::query_as::<_, T>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
