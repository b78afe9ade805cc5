//! Trait definitions for the Tessera creative generation engine.
//!
//! This crate defines the seams between the engine and the outside world:
//! the external collaborators (text model, render service, image services)
//! and the value generators the source resolver dispatches to.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod generator;
mod traits;
mod types;

pub use generator::{Generator, GeneratorRequest, GeneratorRequestBuilder};
pub use traits::{
    BackgroundRemover, ImageBackend, ImageFetcher, MediaUploader, RenderBackend, TextBackend,
};
pub use types::{Capability, ComposeParams, ComposeParamsBuilder, OutputMode};
