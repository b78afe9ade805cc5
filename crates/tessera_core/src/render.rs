//! Render service job vocabulary.

use serde::{Deserialize, Serialize};

/// External render job identifier.
pub type JobId = String;

/// Status reported by a render service poll.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RenderStatus {
    /// Still queued or rendering
    Pending,
    /// Render completed
    Finished,
    /// Render failed
    Error,
}

/// One poll response.
///
/// # Examples
///
/// ```
/// use tessera_core::{PollReport, RenderStatus};
///
/// let report = PollReport::finished("https://cdn.example.com/1.png");
/// assert_eq!(*report.status(), RenderStatus::Finished);
/// assert_eq!(report.url().as_deref(), Some("https://cdn.example.com/1.png"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct PollReport {
    /// Reported status
    status: RenderStatus,
    /// Image URL once finished
    url: Option<String>,
    /// Error text when failed
    error: Option<String>,
}

impl PollReport {
    /// Report from its raw parts.
    pub fn new(status: RenderStatus, url: Option<String>, error: Option<String>) -> Self {
        Self { status, url, error }
    }

    /// Job still running.
    pub fn pending() -> Self {
        Self::new(RenderStatus::Pending, None, None)
    }

    /// Job finished at `url`.
    pub fn finished(url: impl Into<String>) -> Self {
        Self::new(RenderStatus::Finished, Some(url.into()), None)
    }

    /// Job failed with `reason`.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::new(RenderStatus::Error, None, Some(reason.into()))
    }
}
