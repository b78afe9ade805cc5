//! Three-stage text refinement.

use crate::{
    PairedRow, ProductContext, PromptSet, Stage, TableMode, TableRow, TabularRow, format_table,
    parse_table,
};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tessera_core::{TokenLedger, Topic};
use tessera_error::{ConfigError, PipelineError, PipelineErrorKind, TesseraResult};
use tessera_interface::TextBackend;
use tessera_rate_limit::{BackoffPolicy, PipelineSettings, retry_transient};

/// Raw output of one stage.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct StageOutput {
    /// Stage that produced the output
    #[getter(copy)]
    stage: Stage,
    /// Attempts used, including the successful one
    #[getter(copy)]
    attempts: usize,
    /// Unparsed model text that passed validation
    raw: String,
}

/// Final rows plus each stage's raw output.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct PipelineOutput<R> {
    /// Rows of the last stage, sorted by index
    rows: Vec<R>,
    /// One entry per stage in execution order
    stages: Vec<StageOutput>,
}

impl<R> PipelineOutput<R> {
    /// Take the final rows.
    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}

/// Creator → editor → final-touch pipeline over a text backend.
///
/// Each stage's output must parse as a table of exactly `count` rows. A stage
/// whose output fails validation re-issues the identical request until its
/// retry budget is spent. Transient backend failures (rate limits) are retried
/// on the backoff policy and do not count against that budget; other backend
/// errors propagate immediately.
///
/// # Examples
///
/// ```rust,ignore
/// use tessera_pipeline::StagedTextPipeline;
/// use tessera_core::{TokenLedger, Topic};
///
/// let pipeline = StagedTextPipeline::new(backend);
/// let mut ledger = TokenLedger::default();
/// let lines = pipeline
///     .run_plain(&Topic::new("Desk Lamps"), None, 12, &mut ledger)
///     .await?;
/// assert_eq!(lines.rows().len(), 12);
/// ```
#[derive(Clone)]
pub struct StagedTextPipeline {
    backend: Arc<dyn TextBackend>,
    prompts: PromptSet,
    settings: PipelineSettings,
    backoff: BackoffPolicy,
}

impl std::fmt::Debug for StagedTextPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedTextPipeline")
            .field("model", &self.backend.model_name())
            .field("settings", &self.settings)
            .field("backoff", &self.backoff)
            .finish()
    }
}

impl StagedTextPipeline {
    /// Pipeline with bundled prompts and default settings.
    pub fn new(backend: Arc<dyn TextBackend>) -> Self {
        Self {
            backend,
            prompts: PromptSet::bundled(),
            settings: PipelineSettings::default(),
            backoff: BackoffPolicy::default(),
        }
    }

    /// Use a different prompt set.
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Use different settings.
    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use a different backoff policy for transient backend failures.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Active settings.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run in plain mode: one text per row.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` when a stage exhausts its retries and
    /// propagates backend errors that are fatal or outlast the backoff.
    pub async fn run_plain(
        &self,
        topic: &Topic,
        products: Option<&ProductContext>,
        count: usize,
        ledger: &mut TokenLedger,
    ) -> TesseraResult<PipelineOutput<TableRow>> {
        self.run(topic, products, count, ledger).await
    }

    /// Run in paired mode: header and main text per row.
    ///
    /// # Errors
    ///
    /// Same as [`run_plain`](Self::run_plain).
    pub async fn run_paired(
        &self,
        topic: &Topic,
        count: usize,
        ledger: &mut TokenLedger,
    ) -> TesseraResult<PipelineOutput<PairedRow>> {
        self.run(topic, None, count, ledger).await
    }

    /// Run all stages for row type `R`.
    ///
    /// Product context only reaches the first stage; later stages receive the
    /// previous stage's validated table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a zero count, `PipelineError` when a stage
    /// exhausts its retries, and propagates backend errors that are fatal or
    /// outlast the backoff.
    #[tracing::instrument(
        skip(self, topic, products, ledger),
        fields(topic = %topic.name(), mode = %R::MODE)
    )]
    pub async fn run<R: TabularRow>(
        &self,
        topic: &Topic,
        products: Option<&ProductContext>,
        count: usize,
        ledger: &mut TokenLedger,
    ) -> TesseraResult<PipelineOutput<R>> {
        if count == 0 {
            return Err(ConfigError::new("Text pipeline needs a count of at least 1").into());
        }

        let products = products.filter(|p| !p.is_empty());
        let mut previous: Option<String> = None;
        let mut stages = Vec::new();
        let mut rows = Vec::new();

        for stage in Stage::iter() {
            let message = self.user_message::<R>(topic, stage, products, previous.as_deref(), count);
            let (output, parsed) = self.run_stage::<R>(stage, &message, count, ledger).await?;
            previous = Some(format_table(topic.name(), &parsed));
            stages.push(output);
            rows = parsed;
        }

        tracing::info!(
            calls = ledger.calls(),
            prompt_tokens = ledger.prompt_tokens(),
            completion_tokens = ledger.completion_tokens(),
            "Text pipeline complete"
        );
        Ok(PipelineOutput { rows, stages })
    }

    fn user_message<R: TabularRow>(
        &self,
        topic: &Topic,
        stage: Stage,
        products: Option<&ProductContext>,
        previous: Option<&str>,
        count: usize,
    ) -> String {
        let mut message = topic.to_user_message();
        if stage == Stage::Creator {
            if let Some(products) = products {
                message.push_str("\n\n");
                message.push_str(&products.render(count));
            }
        }
        match previous {
            Some(table) => {
                message.push_str("\n\n");
                message.push_str(table);
            }
            None => {
                let request = match R::MODE {
                    TableMode::Plain => format!("Please generate {} TSV lines.", count),
                    TableMode::Paired => {
                        format!("Please generate {} TSV rows with Header and Main Text.", count)
                    }
                };
                message.push('\n');
                message.push_str(&request);
            }
        }
        message
    }

    #[tracing::instrument(skip(self, message, ledger), fields(stage = %stage))]
    async fn run_stage<R: TabularRow>(
        &self,
        stage: Stage,
        message: &str,
        count: usize,
        ledger: &mut TokenLedger,
    ) -> TesseraResult<(StageOutput, Vec<R>)> {
        let system_prompt = self.prompts.get(stage, R::MODE);
        let attempts = self.settings.max_stage_retries() + 1;
        tracing::info!(attempts, "Running stage");

        let mut last_error = None;
        for attempt in 1..=attempts {
            let completion = retry_transient(&self.backoff, "text_call", || {
                self.backend.call(system_prompt, message)
            })
            .await?;
            ledger.record(completion.usage());
            tracing::debug!(
                attempt,
                prompt_tokens = completion.usage().prompt_tokens(),
                completion_tokens = completion.usage().completion_tokens(),
                "Stage response received"
            );

            match parse_table::<R>(completion.text(), count) {
                Ok(rows) => {
                    let output = StageOutput {
                        stage,
                        attempts: attempt,
                        raw: completion.text().clone(),
                    };
                    return Ok((output, rows));
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e.kind, "Stage output failed validation");
                    last_error = Some(e);
                }
            }
        }

        let last_error = last_error
            .map(|e| e.kind.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        tracing::error!(attempts, last_error = %last_error, "Stage exhausted its retries");
        Err(PipelineError::new(PipelineErrorKind::StageExhausted {
            stage: stage.to_string(),
            attempts,
            last_error,
        })
        .into())
    }
}
