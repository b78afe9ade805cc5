//! Top-level error wrapper types.

use crate::{
    BuilderError, ConfigError, PipelineError, RenderError, TimeoutError, UpstreamError,
    ValidationError,
};

/// Every error condition a Tessera operation can surface.
///
/// # Examples
///
/// ```
/// use tessera_error::{ConfigError, TesseraError};
///
/// let err: TesseraError = ConfigError::new("Unknown generator: text.nope").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TesseraErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Tabular output validation error
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Staged text pipeline error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Upstream collaborator error
    #[from(UpstreamError)]
    Upstream(UpstreamError),
    /// Render job error
    #[from(RenderError)]
    Render(RenderError),
    /// Polling timeout
    #[from(TimeoutError)]
    Timeout(TimeoutError),
}

/// Tessera error with kind discrimination.
///
/// # Examples
///
/// ```
/// use tessera_error::{TesseraErrorKind, TesseraResult, TimeoutError};
///
/// fn poll() -> TesseraResult<()> {
///     Err(TimeoutError::new("render job 3", 60))?
/// }
///
/// let err = poll().unwrap_err();
/// assert!(matches!(err.kind(), TesseraErrorKind::Timeout(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tessera Error: {}", _0)]
pub struct TesseraError(Box<TesseraErrorKind>);

impl TesseraError {
    /// Create a new error from a kind.
    pub fn new(kind: TesseraErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TesseraErrorKind {
        &self.0
    }

    /// Whether the underlying failure is transient.
    pub fn is_retryable(&self) -> bool {
        use crate::RetryableError;
        match self.kind() {
            TesseraErrorKind::Upstream(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Server-provided retry delay, when the failure carries one.
    pub fn retry_after(&self) -> Option<std::time::Duration> {
        use crate::RetryableError;
        match self.kind() {
            TesseraErrorKind::Upstream(e) => e.retry_after(),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to TesseraErrorKind
impl<T> From<T> for TesseraError
where
    T: Into<TesseraErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Tessera operations.
pub type TesseraResult<T> = std::result::Result<T, TesseraError>;
