//! Error types for the SportMonks client.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SportmonksError>;

#[derive(Error, Debug)]
pub enum SportmonksError {
    /// Transport-level connectivity failure.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The configured request timeout elapsed before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// Non-2xx response from the API.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// HTTP 429 from the API, with the `Retry-After` delay if it sent one.
    #[error("rate limited by the SportMonks API")]
    RateLimit { retry_after: Option<Duration> },

    /// The API answered 2xx but the body carries an `error` object.
    #[error("SportMonks API error: {message}")]
    Api { message: String },

    /// The response envelope or an include violates the expected shape.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// A next-page locator pointed at a page already fetched in this run.
    #[error("pagination loop detected at page {page}")]
    PaginationLoop { page: u32 },

    #[error("API token must be provided")]
    MissingApiToken,

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// Failure of an in-flight lookup another caller started; all waiters of
    /// the same cache key observe the same underlying error.
    #[error("{0}")]
    Shared(Arc<SportmonksError>),
}

impl SportmonksError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        SportmonksError::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Whether a retry policy may re-issue the failed request.
    ///
    /// Contract violations (`MalformedResponse`, `PaginationLoop`) are never
    /// transient.
    pub fn is_transient(&self) -> bool {
        match self {
            SportmonksError::RateLimit { .. } | SportmonksError::Timeout => true,
            SportmonksError::Http { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}
