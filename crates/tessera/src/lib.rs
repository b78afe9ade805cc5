//! Tessera - config-driven creative generation
//!
//! Tessera turns a declarative template description into batches of rendered
//! marketing creatives. A template names *slots* (`<layer>.<property>`) and the
//! *source* that fills each one; the engine resolves every source once per
//! batch, builds one property map per creative and drives the external render
//! jobs to completion.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tessera::{
//!     CreativeEngine, HttpImageFetcher, ImageServices, JsonMap, LocalCompositor,
//!     OpenAiTextClient, PlacidClient, RemoveBgClient, Services, TesseraConfig, TextServices,
//!     Topic, builtin_template,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TesseraConfig::load()?;
//!     let text = TextServices::new(Arc::new(OpenAiTextClient::from_settings(config.models())?));
//!     let placid = Arc::new(PlacidClient::from_settings(config.models())?);
//!     let image = ImageServices::new(
//!         Arc::new(LocalCompositor::new()),
//!         Arc::new(RemoveBgClient::from_settings(config.models())?),
//!         placid.clone(),
//!         Arc::new(HttpImageFetcher::from_settings(config.models())?),
//!     );
//!     let engine = CreativeEngine::from_config(Services::new(text, image), placid, &config);
//!
//!     let template = builtin_template("half_half")?;
//!     let creatives = engine
//!         .generate(Topic::new("Desk Lamps"), &template, JsonMap::new(), JsonMap::new(), 12)
//!         .await?;
//!     println!("{} creatives", creatives.len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Tessera is organized as a workspace with focused crates:
//!
//! - `tessera_error` - Error types
//! - `tessera_core` - Data model (topics, slots, templates, property maps)
//! - `tessera_interface` - Collaborator and generator traits
//! - `tessera_rate_limit` - Backoff, retry and layered settings
//! - `tessera_pipeline` - Staged text pipeline and table parser
//! - `tessera_engine` - Generators, resolver, layer builder, render orchestration
//! - `tessera_models` - HTTP adapters and the local image compositor
//!
//! This crate (`tessera`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod observability;

pub use observability::{ObservabilityConfig, init_observability, init_observability_with_config};

// Re-export error types
pub use tessera_error::{
    BuilderError, BuilderErrorKind, ConfigError, PipelineError, PipelineErrorKind, RenderError,
    RenderErrorKind, RetryableError, TesseraError, TesseraErrorKind, TesseraResult, TimeoutError,
    UpstreamError, UpstreamErrorKind, ValidationError, ValidationErrorKind,
};

// Re-export core types
pub use tessera_core::{
    Creative, GenerationContext, GenerationContextBuilder, JobId, JsonMap, PollReport, PropertyMap,
    RenderStatus, Slot, SlotBuilder, SourceValues, TemplateConfig, TemplateConfigBuilder,
    TextCompletion, TokenLedger, TokenUsage, Topic, TopicBuilder, Variant,
};

// Re-export interface traits
pub use tessera_interface::{
    BackgroundRemover, Capability, ComposeParams, ComposeParamsBuilder, Generator,
    GeneratorRequest, GeneratorRequestBuilder, ImageBackend, ImageFetcher, MediaUploader,
    OutputMode, RenderBackend, TextBackend,
};

// Re-export retry and settings
pub use tessera_rate_limit::{
    BackoffPolicy, BackoffSettings, ModelSettings, PipelineSettings, RenderSettings,
    TesseraConfig, retry_after_from_headers, retry_transient,
};

// Re-export the text pipeline
pub use tessera_pipeline::{
    PairedRow, PipelineOutput, Product, ProductContext, ProductLookup, PromptSet, Stage,
    StageOutput, StagedTextPipeline, TableMode, TableRow, TabularRow, format_table,
    parse_products, parse_table,
};

// Re-export the engine
pub use tessera_engine::{
    ClusterImageGenerator, CreativeEngine, GeneratorFactory, GeneratorInfo, GeneratorRegistry,
    HeaderGenerator, ImageServices, JobState, JobStatus, JobTracker, MainTextGenerator,
    PairedCopyGenerator, ProductImageGenerator, ProductPoolGenerator, RenderJob,
    RenderOrchestrator, ResolvedSources, Services, SourceResolver, TextServices, build_layers,
    builtin_names, builtin_template,
};

// Re-export HTTP adapters
pub use tessera_models::{
    CANVAS_LONG_EDGE, HttpImageFetcher, LocalCompositor, OPENAI_API_KEY, OpenAiTextClient,
    PLACID_API_TOKEN, PlacidClient, REMOVEBG_API_KEY, RemoveBgClient,
};
