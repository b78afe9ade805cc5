//! Staged text pipeline errors.

/// Specific error conditions for the staged text pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// A stage kept producing invalid tables until its budget ran out
    #[display("{stage} failed after {attempts} attempts: {last_error}")]
    StageExhausted {
        /// Stage name (e.g. "creator")
        stage: String,
        /// Total attempts made, including the first
        attempts: usize,
        /// Display form of the last validation failure
        last_error: String,
    },
    /// A system prompt could not be loaded
    #[display("Prompt for stage '{}' unavailable: {}", stage, message)]
    Prompt {
        /// Stage name
        stage: String,
        /// Error message
        message: String,
    },
}

/// Error type for pipeline operations.
///
/// # Examples
///
/// ```
/// use tessera_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::StageExhausted {
///     stage: "editor".to_string(),
///     attempts: 3,
///     last_error: "Expected 12 rows, got 9".to_string(),
/// });
/// assert!(format!("{}", err).contains("editor failed after 3 attempts"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Name of the stage that failed, if the failure belongs to one.
    pub fn stage(&self) -> &str {
        match &self.kind {
            PipelineErrorKind::StageExhausted { stage, .. } => stage,
            PipelineErrorKind::Prompt { stage, .. } => stage,
        }
    }
}
