//! Render job lifecycle tracking.

use tessera_core::{JobId, PropertyMap};
use tessera_error::{RenderError, RenderErrorKind};

/// Lifecycle position of a render job, without payload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum JobStatus {
    /// Not yet handed to the render service
    Pending,
    /// Accepted by the render service, awaiting a result
    Submitted,
    /// Rendered, URL available
    Finished,
    /// Terminated in error
    Error,
}

/// Lifecycle state of a render job.
///
/// PENDING → SUBMITTED → (FINISHED | ERROR); a submission failure moves
/// PENDING straight to ERROR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    /// Not yet handed to the render service
    Pending,
    /// Accepted, external id assigned
    Submitted {
        /// External job id
        job_id: JobId,
    },
    /// Rendered
    Finished {
        /// External job id
        job_id: JobId,
        /// Rendered image URL
        url: String,
    },
    /// Terminated in error
    Error {
        /// External job id, absent when submission itself failed
        job_id: Option<JobId>,
        /// Failure reason
        reason: String,
    },
}

impl JobState {
    /// Status without payload.
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Pending => JobStatus::Pending,
            JobState::Submitted { .. } => JobStatus::Submitted,
            JobState::Finished { .. } => JobStatus::Finished,
            JobState::Error { .. } => JobStatus::Error,
        }
    }

    /// Whether the job has reached FINISHED or ERROR.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Finished { .. } | JobState::Error { .. })
    }

    /// External id, once assigned.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            JobState::Pending => None,
            JobState::Submitted { job_id } | JobState::Finished { job_id, .. } => Some(job_id),
            JobState::Error { job_id, .. } => job_id.as_deref(),
        }
    }
}

/// One creative's render job.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct RenderJob {
    /// Zero-based creative position
    #[getter(copy)]
    creative_index: usize,
    /// Render template id for the creative's variant
    template_id: String,
    /// Properties sent to the renderer
    properties: PropertyMap,
    /// Current lifecycle state
    state: JobState,
}

/// Owns every render job of one batch and enforces legal transitions.
///
/// # Examples
///
/// ```
/// use tessera_core::PropertyMap;
/// use tessera_engine::{JobStatus, JobTracker};
///
/// let mut tracker = JobTracker::new();
/// let index = tracker.push("tpl-dark", PropertyMap::default());
/// tracker.mark_submitted(index, "1042".to_string()).unwrap();
/// tracker.mark_finished(index, "https://cdn.example/1042.png".to_string()).unwrap();
///
/// assert_eq!(tracker.job(index).unwrap().state().status(), JobStatus::Finished);
/// assert!(tracker.mark_submitted(index, "1043".to_string()).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct JobTracker {
    jobs: Vec<RenderJob>,
}

impl JobTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a PENDING job for the next creative position, returning its index.
    pub fn push(&mut self, template_id: impl Into<String>, properties: PropertyMap) -> usize {
        let creative_index = self.jobs.len();
        self.jobs.push(RenderJob {
            creative_index,
            template_id: template_id.into(),
            properties,
            state: JobState::Pending,
        });
        creative_index
    }

    /// Every job in creative order.
    pub fn jobs(&self) -> &[RenderJob] {
        &self.jobs
    }

    /// Job at `index`.
    pub fn job(&self, index: usize) -> Option<&RenderJob> {
        self.jobs.get(index)
    }

    /// Number of tracked jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether no jobs are tracked.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// PENDING → SUBMITTED.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` unless the job is PENDING.
    pub fn mark_submitted(&mut self, index: usize, job_id: JobId) -> Result<(), RenderError> {
        self.transition(index, JobStatus::Submitted, |state| match state {
            JobState::Pending => Some(JobState::Submitted { job_id }),
            _ => None,
        })
    }

    /// SUBMITTED → FINISHED.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` unless the job is SUBMITTED.
    pub fn mark_finished(&mut self, index: usize, url: String) -> Result<(), RenderError> {
        self.transition(index, JobStatus::Finished, |state| match state {
            JobState::Submitted { job_id } => Some(JobState::Finished {
                job_id: job_id.clone(),
                url,
            }),
            _ => None,
        })
    }

    /// PENDING or SUBMITTED → ERROR.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if the job already reached a terminal state.
    pub fn mark_error(&mut self, index: usize, reason: String) -> Result<(), RenderError> {
        self.transition(index, JobStatus::Error, |state| match state {
            JobState::Pending => Some(JobState::Error {
                job_id: None,
                reason,
            }),
            JobState::Submitted { job_id } => Some(JobState::Error {
                job_id: Some(job_id.clone()),
                reason,
            }),
            _ => None,
        })
    }

    /// Index and external id of every SUBMITTED job.
    pub fn in_flight(&self) -> Vec<(usize, JobId)> {
        self.jobs
            .iter()
            .filter_map(|job| match &job.state {
                JobState::Submitted { job_id } => Some((job.creative_index, job_id.clone())),
                _ => None,
            })
            .collect()
    }

    /// First job in ERROR, if any.
    pub fn first_error(&self) -> Option<&RenderJob> {
        self.jobs
            .iter()
            .find(|job| job.state.status() == JobStatus::Error)
    }

    /// Rendered URLs in creative order, once every job is FINISHED.
    pub fn urls(&self) -> Option<Vec<String>> {
        self.jobs
            .iter()
            .map(|job| match &job.state {
                JobState::Finished { url, .. } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    /// Consume the tracker, yielding its jobs.
    pub fn into_jobs(self) -> Vec<RenderJob> {
        self.jobs
    }

    fn transition<F>(&mut self, index: usize, to: JobStatus, next: F) -> Result<(), RenderError>
    where
        F: FnOnce(&JobState) -> Option<JobState>,
    {
        let job = self.jobs.get_mut(index).ok_or_else(|| {
            RenderError::new(RenderErrorKind::InvalidTransition {
                creative_index: index,
                from: "MISSING".to_string(),
                to: to.to_string(),
            })
        })?;
        match next(&job.state) {
            Some(state) => {
                tracing::trace!(creative_index = index, from = %job.state.status(), to = %to, "Job transition");
                job.state = state;
                Ok(())
            }
            None => Err(RenderError::new(RenderErrorKind::InvalidTransition {
                creative_index: index,
                from: job.state.status().to_string(),
                to: to.to_string(),
            })),
        }
    }
}
