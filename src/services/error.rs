use thiserror::Error;

/// Failures talking to an upstream HTTP provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The token endpoint refused to issue a token.
    #[error("token request failed with status {status}: {body}")]
    Auth { status: u16, body: String },

    /// The provider answered a proxied call with a non-2xx status.
    #[error("upstream request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Timeout(&'static str),

    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),

    #[error("missing configuration: {0}")]
    NotConfigured(&'static str),
}
