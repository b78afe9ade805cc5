//! Engine façade tying resolution, layer building and rendering together.

use crate::{
    GeneratorRegistry, JobState, RenderOrchestrator, Services, SourceResolver, build_layers,
};
use std::sync::Arc;
use tessera_core::{
    Creative, GenerationContext, JsonMap, PropertyMap, TemplateConfig, TokenLedger, Topic,
};
use tessera_error::{BuilderError, ConfigError, RenderError, RenderErrorKind, TesseraResult};
use tessera_interface::RenderBackend;
use tessera_rate_limit::{BackoffPolicy, TesseraConfig};

/// Produces rendered creatives from a template configuration.
///
/// Holds the generator registry, the collaborators generators are built from
/// and the render orchestrator. One engine serves many `generate` calls; each
/// call is independent and shares no mutable state with the others.
#[derive(Clone)]
pub struct CreativeEngine {
    registry: Arc<GeneratorRegistry>,
    services: Services,
    orchestrator: RenderOrchestrator,
}

impl CreativeEngine {
    /// Engine over the built-in generators with default settings.
    pub fn new(services: Services, render: Arc<dyn RenderBackend>) -> Self {
        Self {
            registry: Arc::new(GeneratorRegistry::builtin()),
            services,
            orchestrator: RenderOrchestrator::new(render),
        }
    }

    /// Engine whose render polling and backoff come from `config`.
    pub fn from_config(
        services: Services,
        render: Arc<dyn RenderBackend>,
        config: &TesseraConfig,
    ) -> Self {
        let orchestrator = RenderOrchestrator::new(render)
            .with_settings(config.render().clone())
            .with_backoff(BackoffPolicy::from(config.backoff()));
        Self {
            registry: Arc::new(GeneratorRegistry::builtin()),
            services,
            orchestrator,
        }
    }

    /// Use a different generator registry.
    pub fn with_registry(mut self, registry: GeneratorRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Use a different orchestrator.
    pub fn with_orchestrator(mut self, orchestrator: RenderOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    /// Registered generators.
    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Render orchestrator.
    pub fn orchestrator(&self) -> &RenderOrchestrator {
        &self.orchestrator
    }

    /// Generate `count` creatives for `topic`.
    ///
    /// Token usage is accumulated in a fresh ledger and logged when done.
    ///
    /// # Errors
    ///
    /// Any unrecoverable failure aborts the whole batch; no partial results
    /// are returned.
    #[tracing::instrument(skip(self, topic, config, inputs, options), fields(topic = %topic.name(), template = %config.name()))]
    pub async fn generate(
        &self,
        topic: Topic,
        config: &TemplateConfig,
        inputs: JsonMap,
        options: JsonMap,
        count: usize,
    ) -> TesseraResult<Vec<Creative>> {
        let context = GenerationContext::builder()
            .topic(topic)
            .inputs(inputs)
            .options(options)
            .count(count)
            .build()
            .map_err(|e| BuilderError::from(e.to_string()))?;

        let mut ledger = TokenLedger::default();
        let creatives = self.generate_with_ledger(&context, config, &mut ledger).await?;
        tracing::info!(
            calls = *ledger.calls(),
            prompt_tokens = *ledger.prompt_tokens(),
            completion_tokens = *ledger.completion_tokens(),
            total_tokens = ledger.total(),
            "Token usage"
        );
        Ok(creatives)
    }

    /// Generate creatives for `context`, recording token usage in `ledger`.
    ///
    /// # Errors
    ///
    /// - `ConfigError` for a zero count, an uncovered variant sequence or a
    ///   bad slot reference
    /// - generator, `RenderError` and `TimeoutError` failures, unchanged
    #[tracing::instrument(skip_all, fields(template = %config.name(), count = *context.count()))]
    pub async fn generate_with_ledger(
        &self,
        context: &GenerationContext,
        config: &TemplateConfig,
        ledger: &mut TokenLedger,
    ) -> TesseraResult<Vec<Creative>> {
        let variants = config.variants_for(*context.count())?;
        let layers = self.preview_with_ledger(context, config, ledger).await?;

        let jobs = variants
            .iter()
            .zip(layers)
            .map(|(variant, properties)| (variant.template_id().clone(), properties));
        let finished = self.orchestrator.render(jobs).await?;

        let creatives = finished
            .into_iter()
            .zip(variants)
            .map(|(job, variant)| {
                let JobState::Finished { url, .. } = job.state() else {
                    return Err(RenderError::new(RenderErrorKind::JobFailed {
                        job_id: job.state().job_id().unwrap_or_default().to_string(),
                        reason: format!("Job ended {}", job.state().status()),
                    }));
                };
                Ok(Creative::new(
                    config.name().as_str(),
                    variant.label().as_str(),
                    job.properties().clone(),
                    url.as_str(),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(creatives = creatives.len(), "Batch generated");
        Ok(creatives)
    }

    /// Resolve sources and build every property map without rendering.
    ///
    /// # Errors
    ///
    /// Same as [`generate_with_ledger`](Self::generate_with_ledger), minus
    /// render failures.
    pub async fn preview(
        &self,
        context: &GenerationContext,
        config: &TemplateConfig,
    ) -> TesseraResult<Vec<PropertyMap>> {
        let mut ledger = TokenLedger::default();
        self.preview_with_ledger(context, config, &mut ledger).await
    }

    /// [`preview`](Self::preview) recording token usage in `ledger`.
    ///
    /// # Errors
    ///
    /// Same as [`preview`](Self::preview).
    #[tracing::instrument(skip_all, fields(template = %config.name(), count = *context.count()))]
    pub async fn preview_with_ledger(
        &self,
        context: &GenerationContext,
        config: &TemplateConfig,
        ledger: &mut TokenLedger,
    ) -> TesseraResult<Vec<PropertyMap>> {
        let count = *context.count();
        if count == 0 {
            return Err(ConfigError::new("count must be at least 1").into());
        }
        config.variants_for(count)?;

        let resolved = SourceResolver::new(&self.registry, &self.services)
            .resolve_all(config, context, ledger)
            .await?;

        let layers = (0..count)
            .map(|index| build_layers(config, &resolved, context.inputs(), index))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(creatives = layers.len(), "Property maps built");
        Ok(layers)
    }
}
