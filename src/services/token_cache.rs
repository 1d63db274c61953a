use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::error::UpstreamError;

/// Subtracted from a reported `expires_in` so tokens are renewed early.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

/// Lifetime assumed when the provider does not report one.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(86_400);

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Where fresh tokens come from.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<TokenResponse, UpstreamError>;
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Single-slot bearer token cache.
///
/// The lookup and the refresh run under one async mutex, so concurrent
/// callers that find the slot empty wait for a single fetch instead of each
/// issuing their own.
pub struct TokenCache {
    source: Arc<dyn TokenSource>,
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached token while it is still valid, fetching a new one
    /// otherwise. A failed fetch leaves the slot untouched.
    pub async fn get(&self) -> Result<String, UpstreamError> {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.token.clone());
            }
        }

        debug!("Refreshing upstream access token");
        let response = self.source.fetch().await?;
        let lifetime = token_lifetime(response.expires_in);
        *slot = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }

    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

pub fn token_lifetime(expires_in: Option<u64>) -> Duration {
    match expires_in.filter(|secs| *secs > 0) {
        Some(secs) => Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN),
        None => DEFAULT_LIFETIME,
    }
}
