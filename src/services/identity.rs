use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{error, warn};
use url::Url;

use super::error::UpstreamError;
use super::token_cache::{TokenCache, TokenResponse, TokenSource};
use crate::config::IdentityConfig;

/// Open JSON object forwarded to the provider as-is.
pub type JsonBody = Map<String, Value>;

/// Client-credentials grant against the provider's token endpoint.
pub struct ClientCredentialsSource {
    http: Client,
    config: IdentityConfig,
}

impl ClientCredentialsSource {
    pub fn new(http: Client, config: IdentityConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsSource {
    async fn fetch(&self) -> Result<TokenResponse, UpstreamError> {
        let body = json!({
            "client_id": self.config.client_id,
            "client_secret": self.config.client_secret,
            "audience": self.config.audience,
            "grant_type": self.config.grant_type,
        });

        let response = self
            .http
            .post(self.config.token_url())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            error!("Token request failed with status {}", status);
            return Err(UpstreamError::Auth { status, body: text });
        }

        Ok(response.json().await?)
    }
}

/// What a proxied call answered with.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamReply {
    Json(Value),
    NoContent,
}

impl UpstreamReply {
    /// The body, or `fallback` when the provider answered 204.
    pub fn or_echo(self, fallback: Value) -> Value {
        match self {
            UpstreamReply::Json(v) => v,
            UpstreamReply::NoContent => fallback,
        }
    }

    pub fn into_json(self) -> Value {
        self.or_echo(Value::Null)
    }
}

/// Page selection forwarded to the provider's list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self { page: 0, per_page: 50 }
    }
}

impl ListParams {
    fn to_query(self) -> Vec<(&'static str, String)> {
        vec![("page", self.page.to_string()), ("per_page", self.per_page.to_string())]
    }
}

/// Management API client for users and roles.
pub struct IdentityClient {
    http: Client,
    api_url: String,
    tokens: TokenCache,
}

impl IdentityClient {
    pub fn new(http: Client, config: &IdentityConfig) -> Self {
        let source = ClientCredentialsSource::new(http.clone(), config.clone());
        Self::with_token_source(http, config.api_url(), Arc::new(source))
    }

    pub fn with_token_source(http: Client, api_url: impl Into<String>, source: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            tokens: TokenCache::new(source),
        }
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Drop the cached token and fetch a fresh one.
    pub async fn issue_token(&self) -> Result<String, UpstreamError> {
        self.tokens.invalidate().await;
        self.tokens.get().await
    }

    /// Authenticated call to `api_url` + the given path segments.
    ///
    /// Segments are percent-encoded individually, so provider ids containing
    /// `/` or spaces stay within their segment.
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<UpstreamReply, UpstreamError> {
        let url = self.url_for(segments)?;
        let token = self.tokens.get().await?;

        let mut request = self.http.request(method, url).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED {
                warn!("Upstream rejected the cached token, invalidating");
                self.tokens.invalidate().await;
            }
            return Err(UpstreamError::Request {
                status: status.as_u16(),
                body: text,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(UpstreamReply::NoContent);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(UpstreamReply::NoContent);
        }
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        Ok(UpstreamReply::Json(value))
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.api_url).map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", self.api_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // Users

    pub async fn list_users(&self, params: ListParams, search: Option<&str>) -> Result<Value, UpstreamError> {
        let mut query = params.to_query();
        if let Some(q) = search.filter(|s| !s.is_empty()) {
            query.push(("q", q.to_string()));
        }
        Ok(self.request(Method::GET, &["users"], &query, None).await?.into_json())
    }

    pub async fn create_user(&self, body: &JsonBody) -> Result<Value, UpstreamError> {
        let body = Value::Object(body.clone());
        Ok(self.request(Method::POST, &["users"], &[], Some(&body)).await?.into_json())
    }

    pub async fn update_user(&self, id: &str, body: &JsonBody) -> Result<Value, UpstreamError> {
        let body = Value::Object(body.clone());
        Ok(self.request(Method::PATCH, &["users", id], &[], Some(&body)).await?.into_json())
    }

    pub async fn user_roles(&self, id: &str) -> Result<Value, UpstreamError> {
        Ok(self.request(Method::GET, &["users", id, "roles"], &[], None).await?.into_json())
    }

    pub async fn assign_user_roles(&self, id: &str, roles: &[String]) -> Result<Value, UpstreamError> {
        let body = json!({ "roles": roles });
        let reply = self.request(Method::POST, &["users", id, "roles"], &[], Some(&body)).await?;
        Ok(reply.or_echo(body))
    }

    pub async fn remove_user_roles(&self, id: &str, roles: &[String]) -> Result<Value, UpstreamError> {
        let body = json!({ "roles": roles });
        let reply = self.request(Method::DELETE, &["users", id, "roles"], &[], Some(&body)).await?;
        Ok(reply.or_echo(body))
    }

    // Roles

    pub async fn list_roles(&self, params: ListParams) -> Result<Value, UpstreamError> {
        Ok(self.request(Method::GET, &["roles"], &params.to_query(), None).await?.into_json())
    }

    pub async fn create_role(&self, body: &JsonBody) -> Result<Value, UpstreamError> {
        let body = Value::Object(body.clone());
        Ok(self.request(Method::POST, &["roles"], &[], Some(&body)).await?.into_json())
    }

    pub async fn update_role(&self, id: &str, body: &JsonBody) -> Result<Value, UpstreamError> {
        let body = Value::Object(body.clone());
        Ok(self.request(Method::PATCH, &["roles", id], &[], Some(&body)).await?.into_json())
    }

    pub async fn role_users(&self, id: &str, params: ListParams) -> Result<Value, UpstreamError> {
        Ok(self
            .request(Method::GET, &["roles", id, "users"], &params.to_query(), None)
            .await?
            .into_json())
    }

    pub async fn assign_role_users(&self, id: &str, users: &[String]) -> Result<Value, UpstreamError> {
        let body = json!({ "users": users });
        let reply = self.request(Method::POST, &["roles", id, "users"], &[], Some(&body)).await?;
        Ok(reply.or_echo(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource;

    #[async_trait]
    impl TokenSource for StaticSource {
        async fn fetch(&self) -> Result<TokenResponse, UpstreamError> {
            Ok(TokenResponse {
                access_token: "t".to_string(),
                token_type: None,
                expires_in: None,
            })
        }
    }

    fn client(api_url: &str) -> IdentityClient {
        IdentityClient::with_token_source(Client::new(), api_url, Arc::new(StaticSource))
    }

    #[test]
    fn url_segments_are_encoded() {
        let c = client("https://tenant.auth0.com/api/v2/");
        let url = c.url_for(&["users", "google/oauth2 1", "roles"]).unwrap();
        assert_eq!(url.as_str(), "https://tenant.auth0.com/api/v2/users/google%2Foauth2%201/roles");
    }

    #[test]
    fn missing_base_url_is_reported() {
        let c = client("/api/v2/");
        assert!(matches!(c.url_for(&["users"]), Err(UpstreamError::InvalidUrl(_))));
    }

    #[test]
    fn no_content_echoes_the_request() {
        let echo = json!({ "roles": ["rol_1"] });
        assert_eq!(UpstreamReply::NoContent.or_echo(echo.clone()), echo);
        assert_eq!(UpstreamReply::Json(json!([1])).or_echo(echo), json!([1]));
    }

    #[test]
    fn default_list_params() {
        let q = ListParams::default().to_query();
        assert_eq!(q, vec![("page", "0".to_string()), ("per_page", "50".to_string())]);
    }
}
