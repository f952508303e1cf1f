//! Typed HTTP errors (spec.md §4.3 step 6, §7).
//!
//! Ported from `original_source/.../base_client.py`'s `_raise_for_error`:
//! a structured `code` field on the error body is looked up in an error
//! code table first; otherwise the HTTP status is mapped directly.
//! Every typed error carries `{message, status, body, docs_url}` so
//! callers can programmatically discover remediation.

use thiserror::Error;

/// The classification an API error was mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Auth,
    NotFound,
    Conflict,
    RateLimit,
    Server,
    Api,
}

/// A structured error surfaced by the gateway, carrying enough context
/// for a caller to log or render it without re-parsing the body.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: u16,
    pub body: String,
    pub docs_url: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} ({}): {} (see {})",
            self.kind, self.status, self.message, self.docs_url
        )
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Only `Server` (5xx) errors are retried by the HTTP core; network
    /// errors and timeouts are retried independently of this.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.kind == ApiErrorKind::Server
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("circuit open for `{0}`")]
    CircuitOpen(String),
}

impl Error {
    /// Whether a retry should be attempted for this error (spec.md §4.3
    /// step 7 / §7): network errors, timeouts, and 5xx responses.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(e) => !e.is_builder() && !e.is_redirect(),
            Error::Timeout(_) => true,
            Error::Api(api) => api.is_transient(),
            Error::Json(_) | Error::CircuitOpen(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
