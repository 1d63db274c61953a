use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub filter: FilterConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Page size used when a list request carries no `limit`
    pub default_limit: u32,
    /// Ceiling that larger `limit` values are silently clamped to
    pub max_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Pool used when a request carries no tenant `ref`
    pub default_url: Option<String>,
    /// `postgresql://postgres.` style prefix the tenant ref is appended to
    pub ref_base: Option<String>,
    pub ref_password: Option<String>,
    /// `@host:port/db` style suffix appended after the password
    pub ref_host: Option<String>,
    /// Tenant refs are honoured outside production unless this is set
    pub enable_ref: bool,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub url_base: String,
    pub path_api: String,
    pub path_token: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub audience: String,
    pub grant_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub api_base: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub default_calendar_id: Option<String>,
    /// IANA zone name sent with created events
    pub timezone: String,
    /// Fixed offset applied to booking times that carry no offset of their own
    pub utc_offset_minutes: i32,
    pub appointment_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let raw = env::var("APP_ENV").or_else(|_| env::var("NODE_ENV"));
        let environment = match raw.as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("CORS_ORIGIN") {
            self.server.cors_origins = split_list(&v);
        }

        // Filter overrides
        if let Ok(v) = env::var("FILTER_DEFAULT_LIMIT") {
            self.filter.default_limit = v.parse().unwrap_or(self.filter.default_limit);
        }
        if let Ok(v) = env::var("FILTER_MAX_LIMIT") {
            self.filter.max_limit = v.parse().unwrap_or(self.filter.max_limit);
        }

        // Database overrides
        self.database.default_url = non_empty_var("DATABASE_URL").or(self.database.default_url);
        self.database.ref_base = non_empty_var("DATABASE_BASE").or(self.database.ref_base);
        self.database.ref_password = non_empty_var("DATABASE_PASSWORD").or(self.database.ref_password);
        self.database.ref_host = non_empty_var("DATABASE_HOST").or(self.database.ref_host);
        if let Ok(v) = env::var("ENABLE_DB_REF") {
            self.database.enable_ref = v.parse().unwrap_or(self.database.enable_ref);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Identity provider overrides
        if let Ok(v) = env::var("URL_BASE") {
            self.identity.url_base = v;
        }
        if let Ok(v) = env::var("PATH_API") {
            self.identity.path_api = v;
        }
        if let Ok(v) = env::var("PATH_TOKEN") {
            self.identity.path_token = v;
        }
        if let Ok(v) = env::var("AUTH0_CLIENT_ID") {
            self.identity.client_id = v;
        }
        if let Ok(v) = env::var("AUTH0_CLIENT_SECRET") {
            self.identity.client_secret = v;
        }
        if let Ok(v) = env::var("AUTH0_AUDIENCE") {
            self.identity.audience = v;
        }
        if let Ok(v) = env::var("AUTH0_GRANT_TYPE") {
            self.identity.grant_type = v;
        }

        // Calendar overrides
        if let Ok(v) = env::var("CALENDAR_API_BASE") {
            self.calendar.api_base = v;
        }
        self.calendar.access_token = non_empty_var("CALENDAR_ACCESS_TOKEN").or(self.calendar.access_token);
        self.calendar.default_calendar_id =
            non_empty_var("CALENDAR_DEFAULT_ID").or(self.calendar.default_calendar_id);
        if let Ok(v) = env::var("CALENDAR_TIMEZONE") {
            self.calendar.timezone = v;
        }
        if let Ok(v) = env::var("CALENDAR_UTC_OFFSET_MINUTES") {
            self.calendar.utc_offset_minutes = v.parse().unwrap_or(self.calendar.utc_offset_minutes);
        }
        if let Ok(v) = env::var("CALENDAR_APPOINTMENT_MINUTES") {
            self.calendar.appointment_minutes = v.parse().unwrap_or(self.calendar.appointment_minutes);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
                cors_origins: vec!["*".to_string()],
            },
            filter: FilterConfig {
                default_limit: 10,
                max_limit: 20,
            },
            database: DatabaseConfig {
                default_url: None,
                ref_base: None,
                ref_password: None,
                ref_host: None,
                enable_ref: true,
                max_connections: 5,
                connection_timeout: 30,
            },
            identity: IdentityConfig::defaults(),
            calendar: CalendarConfig::defaults(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 10,
                ..Self::development().database
            },
            ..Self::development()
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                cors_origins: vec![],
                ..Self::development().server
            },
            database: DatabaseConfig {
                enable_ref: false,
                max_connections: 20,
                connection_timeout: 5,
                ..Self::development().database
            },
            ..Self::development()
        }
    }

    /// Whether a caller-supplied tenant `ref` may select a database.
    pub fn tenant_refs_enabled(&self) -> bool {
        self.environment != Environment::Production || self.database.enable_ref
    }
}

impl IdentityConfig {
    fn defaults() -> Self {
        Self {
            url_base: String::new(),
            path_api: "/api/v2/".to_string(),
            path_token: "/oauth/token".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            audience: String::new(),
            grant_type: "client_credentials".to_string(),
        }
    }

    /// Base URL every Management API path is appended to.
    pub fn api_url(&self) -> String {
        format!("{}{}", self.url_base, self.path_api)
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.url_base, self.path_token)
    }
}

impl CalendarConfig {
    fn defaults() -> Self {
        Self {
            api_base: "https://www.googleapis.com/calendar/v3".to_string(),
            access_token: None,
            default_calendar_id: None,
            timezone: "America/Bogota".to_string(),
            utc_offset_minutes: -300,
            appointment_minutes: 30,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
