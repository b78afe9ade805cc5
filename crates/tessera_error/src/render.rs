//! Render job errors.

/// Render job failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RenderErrorKind {
    /// The render service never accepted the job
    #[display("Submission of creative {} failed: {}", creative_index, reason)]
    SubmitFailed {
        /// Zero-based creative position
        creative_index: usize,
        /// Reason reported for the failure
        reason: String,
    },
    /// The render service reported the job as failed
    #[display("Render job {} failed: {}", job_id, reason)]
    JobFailed {
        /// External job id
        job_id: String,
        /// Reason reported by the service
        reason: String,
    },
    /// A job was moved out of order through its lifecycle
    #[display("Creative {} cannot move from {} to {}", creative_index, from, to)]
    InvalidTransition {
        /// Zero-based creative position
        creative_index: usize,
        /// Current state
        from: String,
        /// Requested state
        to: String,
    },
    /// Polling itself failed
    #[display("Polling render job {} failed: {}", job_id, reason)]
    PollFailed {
        /// External job id
        job_id: String,
        /// Reason for the failure
        reason: String,
    },
}

/// Error for a render job that terminated in error.
///
/// A failed render is fatal for its batch: a visually broken creative must
/// never reach publication.
///
/// # Examples
///
/// ```
/// use tessera_error::{RenderError, RenderErrorKind};
///
/// let err = RenderError::new(RenderErrorKind::JobFailed {
///     job_id: "1042".to_string(),
///     reason: "Layer 'header' not found".to_string(),
/// });
/// assert!(format!("{}", err).contains("1042"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Render Error: {} at line {} in {}", kind, line, file)]
pub struct RenderError {
    /// The specific error condition
    pub kind: RenderErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl RenderError {
    /// Create a new RenderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RenderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
