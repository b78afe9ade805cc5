//! Creative generation command handler.

use super::commands::{GenerateArgs, to_json_map};
use std::path::Path;
use std::sync::Arc;
use tessera::{
    BackoffPolicy, BuilderError, Capability, CreativeEngine, GenerationContext, GeneratorRegistry,
    HttpImageFetcher, ImageServices, LocalCompositor, OpenAiTextClient, PlacidClient, PromptSet,
    RemoveBgClient, RenderBackend, Services, TemplateConfig, TesseraConfig, TesseraResult,
    TextServices, TokenLedger, builtin_template,
};

/// Load a template from a file path, falling back to the built-in of that name.
pub fn load_template(reference: &str) -> TesseraResult<TemplateConfig> {
    let path = Path::new(reference);
    if path.is_file() {
        Ok(TemplateConfig::from_file(path)?)
    } else {
        Ok(builtin_template(reference)?)
    }
}

/// Text services over the OpenAI client with configured pipeline settings.
pub fn text_services(config: &TesseraConfig, prompts: Option<&Path>) -> TesseraResult<TextServices> {
    let backend = OpenAiTextClient::from_settings(config.models())?;
    let mut text = TextServices::new(Arc::new(backend))
        .with_settings(config.pipeline().clone())
        .with_backoff(BackoffPolicy::from(config.backoff()));
    if let Some(dir) = prompts {
        text = text.with_prompts(PromptSet::from_dir(dir)?);
    }
    Ok(text)
}

/// Image services: local compositing, remove.bg, Placid media hosting and
/// plain HTTP downloads.
pub fn image_services(config: &TesseraConfig) -> TesseraResult<ImageServices> {
    let remover = RemoveBgClient::from_settings(config.models())?;
    let uploader = PlacidClient::from_settings(config.models())?;
    let fetcher = HttpImageFetcher::from_settings(config.models())?;
    Ok(ImageServices::new(
        Arc::new(LocalCompositor::new()),
        Arc::new(remover),
        Arc::new(uploader),
        Arc::new(fetcher),
    )
    .with_backoff(BackoffPolicy::from(config.backoff())))
}

/// Capabilities needed by the registered sources of `template`.
pub fn required_capabilities(
    template: &TemplateConfig,
    registry: &GeneratorRegistry,
) -> Vec<Capability> {
    let mut needed: Vec<Capability> = template
        .sources()
        .into_iter()
        .filter_map(|source| registry.info(source).map(|info| info.capability()))
        .collect();
    needed.sort();
    needed.dedup();
    needed
}

/// Services for the capabilities `template` uses, so credentials are only
/// required for collaborators the batch will call.
pub fn services_for(
    template: &TemplateConfig,
    config: &TesseraConfig,
    prompts: Option<&Path>,
) -> TesseraResult<Services> {
    let mut services = Services::default();
    for capability in required_capabilities(template, &GeneratorRegistry::builtin()) {
        services = match capability {
            Capability::Text => services.with_text(text_services(config, prompts)?),
            Capability::Image => services.with_image(image_services(config)?),
        };
    }
    Ok(services)
}

/// Generate a batch and print it as JSON.
///
/// With `dry_run` the property maps are printed and nothing is rendered.
#[tracing::instrument(skip_all, fields(template = %args.template, count = args.count))]
pub async fn run_generate(args: &GenerateArgs, config: &TesseraConfig) -> TesseraResult<()> {
    let mut template = load_template(&args.template)?;
    for (label, template_id) in &args.template_ids {
        template = template.with_template_id(label, template_id.as_str())?;
    }
    template.validate()?;

    let context = GenerationContext::builder()
        .topic(args.topic.to_topic()?)
        .inputs(to_json_map(&args.inputs))
        .options(to_json_map(&args.options))
        .count(args.count)
        .build()
        .map_err(|e| BuilderError::from(e.to_string()))?;

    let services = services_for(&template, config, args.prompts.as_deref())?;
    // Preview never submits, so the renderer needs no credential. Image
    // sources still upload their results.
    let render: Arc<dyn RenderBackend> = if args.dry_run {
        Arc::new(PlacidClient::with_token(String::new(), config.models())?)
    } else {
        Arc::new(PlacidClient::from_settings(config.models())?)
    };
    let engine = CreativeEngine::from_config(services, render, config);

    let mut ledger = TokenLedger::default();
    let output = if args.dry_run {
        let layers = engine.preview_with_ledger(&context, &template, &mut ledger).await?;
        let layers: Vec<_> = layers.iter().map(|l| l.to_json()).collect();
        serde_json::to_string_pretty(&layers)
    } else {
        let creatives = engine
            .generate_with_ledger(&context, &template, &mut ledger)
            .await?;
        serde_json::to_string_pretty(&creatives)
    }
    .map_err(|e| BuilderError::from(format!("Failed to serialize output: {}", e)))?;

    tracing::info!(
        calls = *ledger.calls(),
        total_tokens = ledger.total(),
        "Token usage"
    );
    println!("{}", output);
    Ok(())
}
