//! Core data types for the Tessera creative generation engine.
//!
//! This crate provides the data model shared by every Tessera crate: template
//! descriptions, generation contexts, resolved source values, per-creative
//! property maps and token accounting.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod creative;
mod property;
mod render;
mod slot;
mod template;
mod tokens;
mod topic;
mod values;

pub use context::{GenerationContext, GenerationContextBuilder, JsonMap};
pub use creative::Creative;
pub use property::PropertyMap;
pub use render::{JobId, PollReport, RenderStatus};
pub use slot::{Slot, SlotBuilder};
pub use template::{TemplateConfig, TemplateConfigBuilder, Variant};
pub use tokens::{TextCompletion, TokenLedger, TokenUsage};
pub use topic::{Topic, TopicBuilder};
pub use values::SourceValues;
