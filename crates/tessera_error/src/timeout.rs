//! Polling timeout errors.

/// Polling exceeded its attempt ceiling.
///
/// # Examples
///
/// ```
/// use tessera_error::TimeoutError;
///
/// let err = TimeoutError::new("render job 7", 60);
/// assert!(format!("{}", err).contains("60 attempts"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Timeout Error: {} did not finish after {} attempts at line {} in {}", operation, attempts, line, file)]
pub struct TimeoutError {
    /// What was being waited on
    pub operation: String,
    /// Attempts made before giving up
    pub attempts: u32,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl TimeoutError {
    /// Create a new TimeoutError at the current location.
    #[track_caller]
    pub fn new(operation: impl Into<String>, attempts: u32) -> Self {
        let location = std::panic::Location::caller();
        Self {
            operation: operation.into(),
            attempts,
            line: location.line(),
            file: location.file(),
        }
    }
}
