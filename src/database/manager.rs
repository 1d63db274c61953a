use once_cell::sync::OnceCell;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::{AppConfig, DatabaseConfig};
use crate::filter::FilterError;

/// Errors from DatabaseManager and the repositories built on it
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid tenant ref: {0}")]
    InvalidTenantRef(String),

    #[error("Tenant refs are disabled")]
    TenantRefsDisabled,

    #[error("No default database configured")]
    NoDefaultDatabase,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Registry of connection pools keyed by tenant ref.
///
/// Pools are created lazily (no connection is opened until the first query)
/// and live until [`DatabaseManager::close_all`].
pub struct DatabaseManager {
    config: DatabaseConfig,
    refs_enabled: bool,
    default_pool: OnceCell<PgPool>,
    pools: RwLock<HashMap<String, PgPool>>,
}

impl DatabaseManager {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.database.clone(),
            refs_enabled: config.tenant_refs_enabled(),
            default_pool: OnceCell::new(),
            pools: RwLock::new(HashMap::new()),
        }
    }

    /// Pick the pool for an optional caller-supplied ref.
    ///
    /// A blank ref counts as absent.
    pub async fn resolve(&self, tenant_ref: Option<&str>) -> Result<PgPool, DatabaseError> {
        match tenant_ref.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) if !self.refs_enabled => {
                warn!("Rejected tenant ref '{}': refs disabled in this environment", r);
                Err(DatabaseError::TenantRefsDisabled)
            }
            Some(r) => self.pool_for_ref(r).await,
            None => self.default_pool(),
        }
    }

    /// Pool configured by `DATABASE_URL`
    pub fn default_pool(&self) -> Result<PgPool, DatabaseError> {
        let url = self
            .config
            .default_url
            .as_deref()
            .ok_or(DatabaseError::NoDefaultDatabase)?;
        self.default_pool
            .get_or_try_init(|| -> Result<PgPool, DatabaseError> {
                let pool = self.build_pool(url)?;
                info!("Created default database pool");
                Ok(pool)
            })
            .cloned()
    }

    /// Get existing pool or create a new one lazily
    pub async fn pool_for_ref(&self, tenant_ref: &str) -> Result<PgPool, DatabaseError> {
        let tenant_ref = tenant_ref.trim();
        if !Self::is_valid_ref(tenant_ref) {
            return Err(DatabaseError::InvalidTenantRef(tenant_ref.to_string()));
        }

        // Fast path: try read lock
        {
            let pools = self.pools.read().await;
            if let Some(pool) = pools.get(tenant_ref) {
                return Ok(pool.clone());
            }
        }

        let mut pools = self.pools.write().await;
        // Another request may have won the race while we waited for the lock
        if let Some(pool) = pools.get(tenant_ref) {
            return Ok(pool.clone());
        }

        let connection_string = self.build_connection_string(tenant_ref)?;
        let pool = self.build_pool(&connection_string)?;
        pools.insert(tenant_ref.to_string(), pool.clone());

        info!("Created database pool for ref: {}", tenant_ref);
        Ok(pool)
    }

    fn build_pool(&self, connection_string: &str) -> Result<PgPool, DatabaseError> {
        url::Url::parse(connection_string).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        let pool = PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .acquire_timeout(Duration::from_secs(self.config.connection_timeout))
            .connect_lazy(connection_string)?;
        Ok(pool)
    }

    /// `DATABASE_BASE` + ref + `:` + `DATABASE_PASSWORD` + `DATABASE_HOST`
    fn build_connection_string(&self, tenant_ref: &str) -> Result<String, DatabaseError> {
        let base = self
            .config
            .ref_base
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_BASE"))?;
        let password = self
            .config
            .ref_password
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_PASSWORD"))?;
        let host = self
            .config
            .ref_host
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_HOST"))?;

        Ok(format!("{}{}:{}{}", base, tenant_ref, password, host))
    }

    /// Pings the default pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        let pool = self.default_pool()?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close and remove all pools (e.g., on shutdown)
    pub async fn close_all(&self) {
        let mut pools = self.pools.write().await;
        for (name, pool) in pools.drain() {
            pool.close().await;
            info!("Closed database pool: {}", name);
        }
        if let Some(pool) = self.default_pool.get() {
            pool.close().await;
            info!("Closed default database pool");
        }
    }

    /// Refs end up inside a connection string, so only `[A-Za-z0-9_-]+` is accepted.
    fn is_valid_ref(tenant_ref: &str) -> bool {
        !tenant_ref.is_empty()
            && tenant_ref
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}
