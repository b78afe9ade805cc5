//! Mock render service for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tessera_core::{JobId, PollReport, PropertyMap};
use tessera_error::{TesseraResult, UpstreamError, UpstreamErrorKind};
use tessera_interface::RenderBackend;

#[derive(Debug, Default)]
struct State {
    submissions: Vec<(String, PropertyMap)>,
    polls: HashMap<String, usize>,
    rate_limited_submits: usize,
}

/// Render backend recording submissions and scripting poll answers.
///
/// Job ids are `job-<n>` in submission order. By default a job reports
/// pending on its first poll and finishes on the second at
/// `https://render.test/job-<n>.png`.
#[derive(Debug, Clone, Default)]
pub struct MockRenderBackend {
    state: Arc<Mutex<State>>,
    failing_submits: HashSet<usize>,
    failing_jobs: HashSet<String>,
    polls_until_done: usize,
    never_finish: bool,
    url_missing_polls: usize,
}

impl MockRenderBackend {
    /// Jobs finish on their second poll.
    pub fn new() -> Self {
        Self {
            polls_until_done: 1,
            ..Self::default()
        }
    }

    /// Submission number `index` (zero-based) fails with HTTP 400.
    pub fn failing_submit(mut self, index: usize) -> Self {
        self.failing_submits.insert(index);
        self
    }

    /// Job `job_id` reports an error when polled.
    pub fn failing_job(mut self, job_id: &str) -> Self {
        self.failing_jobs.insert(job_id.to_string());
        self
    }

    /// Jobs stay pending forever.
    pub fn never_finishing(mut self) -> Self {
        self.never_finish = true;
        self
    }

    /// The first `n` submissions are rate limited before being accepted.
    pub fn rate_limited_submits(self, n: usize) -> Self {
        self.state.lock().unwrap().rate_limited_submits = n;
        self
    }

    /// Finished reports omit the URL for the first `n` finished polls.
    pub fn finished_without_url(mut self, n: usize) -> Self {
        self.url_missing_polls = n;
        self
    }

    /// Template ids submitted, in order.
    pub fn submitted_templates(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .submissions
            .iter()
            .map(|(template, _)| template.clone())
            .collect()
    }

    /// Number of submit calls, including failed ones.
    pub fn submit_count(&self) -> usize {
        self.state.lock().unwrap().submissions.len()
    }

    /// Polls received for `job_id`.
    pub fn poll_count(&self, job_id: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .polls
            .get(job_id)
            .copied()
            .unwrap_or(0)
    }

    /// Total polls received.
    pub fn total_polls(&self) -> usize {
        self.state.lock().unwrap().polls.values().sum()
    }
}

#[async_trait]
impl RenderBackend for MockRenderBackend {
    async fn submit(&self, template_id: &str, properties: &PropertyMap) -> TesseraResult<JobId> {
        let mut state = self.state.lock().unwrap();
        if state.rate_limited_submits > 0 {
            state.rate_limited_submits -= 1;
            return Err(UpstreamError::rate_limited("mock-render", "slow down").into());
        }
        let index = state.submissions.len();
        state
            .submissions
            .push((template_id.to_string(), properties.clone()));
        if self.failing_submits.contains(&index) {
            return Err(UpstreamError::new(
                "mock-render",
                UpstreamErrorKind::Http {
                    status_code: 400,
                    message: format!("bad layers for submission {}", index),
                },
            )
            .into());
        }
        Ok(format!("job-{}", index))
    }

    async fn poll(&self, job_id: &str) -> TesseraResult<PollReport> {
        let mut state = self.state.lock().unwrap();
        let polls = state.polls.entry(job_id.to_string()).or_default();
        *polls += 1;
        let seen = *polls;

        if self.failing_jobs.contains(job_id) {
            return Ok(PollReport::failed("Layer 'header' not found"));
        }
        if self.never_finish || seen <= self.polls_until_done {
            return Ok(PollReport::pending());
        }
        if seen - self.polls_until_done <= self.url_missing_polls {
            return Ok(PollReport::new(
                tessera_core::RenderStatus::Finished,
                None,
                None,
            ));
        }
        Ok(PollReport::finished(format!("https://render.test/{}.png", job_id)))
    }
}
