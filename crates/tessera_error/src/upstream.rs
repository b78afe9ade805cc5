//! Collaborator (upstream service) errors and retry classification.

use std::time::Duration;

/// Upstream failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum UpstreamErrorKind {
    /// Service asked us to slow down (HTTP 429)
    #[display("Rate limited: {}", message)]
    RateLimited {
        /// Response message
        message: String,
        /// Server-provided wait hint in seconds
        retry_after_secs: Option<u64>,
    },
    /// Non-success HTTP status
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Connection-level failure before a response arrived
    #[display("Transport error: {}", _0)]
    Transport(String),
    /// Response arrived but could not be understood
    #[display("Invalid response: {}", _0)]
    InvalidResponse(String),
    /// Credential missing from the environment
    #[display("Missing credential: {}", _0)]
    MissingCredential(String),
}

impl UpstreamErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamErrorKind::RateLimited { .. } => true,
            UpstreamErrorKind::Http { status_code, .. } => matches!(*status_code, 429 | 503),
            _ => false,
        }
    }

    /// Server-provided delay before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            UpstreamErrorKind::RateLimited {
                retry_after_secs: Some(secs),
                ..
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }
}

/// Upstream error with the failing service name and source location.
///
/// # Examples
///
/// ```
/// use tessera_error::{RetryableError, UpstreamError, UpstreamErrorKind};
///
/// let err = UpstreamError::new(
///     "placid",
///     UpstreamErrorKind::RateLimited {
///         message: "Too Many Requests".to_string(),
///         retry_after_secs: None,
///     },
/// );
/// assert!(err.is_retryable());
/// assert!(format!("{}", err).contains("placid"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Upstream Error ({}): {} at line {} in {}", service, kind, line, file)]
pub struct UpstreamError {
    /// Service that failed (e.g. "openai", "placid")
    pub service: String,
    /// The kind of error that occurred
    pub kind: UpstreamErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl UpstreamError {
    /// Create a new UpstreamError with automatic location tracking.
    #[track_caller]
    pub fn new(service: impl Into<String>, kind: UpstreamErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            service: service.into(),
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a rate-limit response.
    #[track_caller]
    pub fn rate_limited(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            service,
            UpstreamErrorKind::RateLimited {
                message: message.into(),
                retry_after_secs: None,
            },
        )
    }
}

/// Trait for errors that support retry logic.
///
/// Only transient conditions (rate limiting, temporary unavailability)
/// report themselves as retryable; the retry budget and schedule live with
/// the caller.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;

    /// Server-provided delay that should replace the scheduled backoff.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl RetryableError for UpstreamError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_after(&self) -> Option<Duration> {
        self.kind.retry_after()
    }
}
