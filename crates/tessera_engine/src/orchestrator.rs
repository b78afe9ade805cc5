//! Render job submission and polling.

use crate::{JobTracker, RenderJob};
use std::sync::Arc;
use tessera_core::{PollReport, PropertyMap, RenderStatus};
use tessera_error::{RenderError, RenderErrorKind, TesseraResult, TimeoutError};
use tessera_interface::RenderBackend;
use tessera_rate_limit::{BackoffPolicy, RenderSettings, retry_transient};
use tokio::time::sleep;

/// Drives a batch of render jobs to completion.
///
/// Jobs are submitted one at a time in creative order, then polled in rounds
/// until every job has a URL. Any job ending in error fails the batch.
#[derive(Clone)]
pub struct RenderOrchestrator {
    backend: Arc<dyn RenderBackend>,
    settings: RenderSettings,
    backoff: BackoffPolicy,
}

impl RenderOrchestrator {
    /// Orchestrator with default render settings and backoff.
    pub fn new(backend: Arc<dyn RenderBackend>) -> Self {
        Self {
            backend,
            settings: RenderSettings::default(),
            backoff: BackoffPolicy::default(),
        }
    }

    /// Use different polling settings.
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Retry rate-limited submit and poll calls on `backoff`.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Polling settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Render every `(template_id, properties)` pair, returning finished jobs
    /// in creative order.
    ///
    /// # Errors
    ///
    /// - `RenderError` if any submission failed (after every job was tried)
    ///   or any job reported an error
    /// - `TimeoutError` if jobs are still rendering after `max_poll_rounds`
    #[tracing::instrument(skip_all, fields(jobs = tracing::field::Empty))]
    pub async fn render<I>(&self, jobs: I) -> TesseraResult<Vec<RenderJob>>
    where
        I: IntoIterator<Item = (String, PropertyMap)>,
    {
        let mut tracker = JobTracker::new();
        for (template_id, properties) in jobs {
            tracker.push(template_id, properties);
        }
        tracing::Span::current().record("jobs", tracker.len());

        self.submit_all(&mut tracker).await?;
        self.poll_all(&mut tracker).await?;
        tracing::info!(jobs = tracker.len(), "All render jobs finished");
        Ok(tracker.into_jobs())
    }

    /// Submit every PENDING job in order.
    ///
    /// A failed submission moves its job to ERROR and the remaining jobs are
    /// still submitted.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` naming the first failed job once all submissions
    /// have been attempted.
    #[tracing::instrument(skip_all, fields(jobs = tracker.len()))]
    pub async fn submit_all(&self, tracker: &mut JobTracker) -> TesseraResult<()> {
        let delay = self.settings.submit_delay();
        for index in 0..tracker.len() {
            let Some(job) = tracker.job(index) else {
                continue;
            };
            let template_id = job.template_id().clone();
            let properties = job.properties().clone();

            if index > 0 && !delay.is_zero() {
                sleep(delay).await;
            }

            let submitted = retry_transient(&self.backoff, "render_submit", || {
                self.backend.submit(&template_id, &properties)
            })
            .await;

            match submitted {
                Ok(job_id) => {
                    tracing::debug!(creative_index = index, job_id = %job_id, "Job submitted");
                    tracker.mark_submitted(index, job_id)?;
                }
                Err(e) => {
                    tracing::error!(creative_index = index, error = %e, "Job submission failed");
                    tracker.mark_error(index, e.to_string())?;
                }
            }
        }

        if let Some(failed) = tracker.first_error() {
            let reason = match failed.state() {
                crate::JobState::Error { reason, .. } => reason.clone(),
                other => other.status().to_string(),
            };
            return Err(RenderError::new(RenderErrorKind::SubmitFailed {
                creative_index: failed.creative_index(),
                reason,
            })
            .into());
        }
        tracing::info!(jobs = tracker.len(), "All jobs submitted");
        Ok(())
    }

    /// Poll SUBMITTED jobs in rounds until none remain.
    ///
    /// # Errors
    ///
    /// - `RenderError` as soon as any job reports an error
    /// - `TimeoutError` after `max_poll_rounds` rounds
    #[tracing::instrument(skip_all, fields(max_rounds = *self.settings.max_poll_rounds()))]
    pub async fn poll_all(&self, tracker: &mut JobTracker) -> TesseraResult<()> {
        let max_rounds = *self.settings.max_poll_rounds();
        for round in 1..=max_rounds {
            let in_flight = tracker.in_flight();
            if in_flight.is_empty() {
                return Ok(());
            }
            tracing::debug!(round, in_flight = in_flight.len(), "Poll round");

            for (index, job_id) in in_flight {
                let report = match self.poll_once(&job_id).await {
                    Ok(report) => report,
                    Err(e) => {
                        tracker.mark_error(index, e.to_string())?;
                        return Err(e);
                    }
                };
                match report.status() {
                    RenderStatus::Finished => match report.url() {
                        Some(url) => {
                            tracing::debug!(creative_index = index, job_id = %job_id, "Job finished");
                            tracker.mark_finished(index, url.clone())?;
                        }
                        None => {
                            tracing::debug!(job_id = %job_id, "Finished without URL, polling again");
                        }
                    },
                    RenderStatus::Error => {
                        let reason = failure_reason(&report);
                        tracing::error!(creative_index = index, job_id = %job_id, reason = %reason, "Render job failed");
                        tracker.mark_error(index, reason.clone())?;
                        return Err(RenderError::new(RenderErrorKind::JobFailed { job_id, reason }).into());
                    }
                    RenderStatus::Pending => {}
                }
            }

            if tracker.in_flight().is_empty() {
                return Ok(());
            }
            if round < max_rounds {
                sleep(self.settings.poll_interval()).await;
            }
        }

        if tracker.in_flight().is_empty() {
            return Ok(());
        }
        tracing::error!(rounds = max_rounds, "Render batch timed out");
        Err(TimeoutError::new("render batch", max_rounds).into())
    }

    /// Poll a single job until it finishes.
    ///
    /// # Errors
    ///
    /// - `RenderError` if the job reports an error
    /// - `TimeoutError` after `max_poll_attempts` polls
    #[tracing::instrument(skip(self), fields(max_attempts = *self.settings.max_poll_attempts()))]
    pub async fn poll_until_done(&self, job_id: &str) -> TesseraResult<String> {
        let max_attempts = *self.settings.max_poll_attempts();
        for attempt in 1..=max_attempts {
            let report = self.poll_once(job_id).await?;
            match report.status() {
                RenderStatus::Finished => {
                    if let Some(url) = report.url() {
                        tracing::debug!(attempt, "Job finished");
                        return Ok(url.clone());
                    }
                }
                RenderStatus::Error => {
                    return Err(RenderError::new(RenderErrorKind::JobFailed {
                        job_id: job_id.to_string(),
                        reason: failure_reason(&report),
                    })
                    .into());
                }
                RenderStatus::Pending => {}
            }
            if attempt < max_attempts {
                sleep(self.settings.poll_interval()).await;
            }
        }
        Err(TimeoutError::new(format!("render job {}", job_id), max_attempts).into())
    }

    async fn poll_once(&self, job_id: &str) -> TesseraResult<PollReport> {
        retry_transient(&self.backoff, "render_poll", || self.backend.poll(job_id)).await
    }
}

fn failure_reason(report: &PollReport) -> String {
    report
        .error()
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string())
}
