//! Config-driven creative generation.
//!
//! A [`TemplateConfig`](tessera_core::TemplateConfig) names slots and the
//! sources that fill them. For a batch of N creatives the engine:
//!
//! 1. resolves every distinct source once ([`SourceResolver`]), either from the
//!    template's static style/cta pools or through a registered [`Generator`](tessera_interface::Generator);
//! 2. builds one property map per creative ([`build_layers`]);
//! 3. submits one render job per creative and polls them to completion
//!    ([`RenderOrchestrator`]);
//! 4. returns the creatives in submission order.
//!
//! Any unrecoverable failure aborts the whole batch.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builtin;
mod engine;
mod generators;
mod layers;
mod orchestrator;
mod resolver;
mod tracker;

pub use builtin::{builtin_names, builtin_template};
pub use engine::CreativeEngine;
pub use generators::{
    ClusterImageGenerator, GeneratorFactory, GeneratorInfo, GeneratorRegistry, HeaderGenerator,
    ImageServices, MainTextGenerator, PairedCopyGenerator, ProductImageGenerator,
    ProductPoolGenerator, Services, TextServices,
};
pub use layers::build_layers;
pub use orchestrator::RenderOrchestrator;
pub use resolver::{ResolvedSources, SourceResolver};
pub use tracker::{JobState, JobStatus, JobTracker, RenderJob};
