//! Staged text generation with a strict tabular output contract.
//!
//! A topic goes through three model stages (creator, editor, final touch).
//! Every stage must answer with a numbered table of exactly N rows; stages
//! that don't are asked again within a bounded budget.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod pipeline;
mod products;
mod prompts;
mod table;

pub use context::ProductContext;
pub use pipeline::{PipelineOutput, StageOutput, StagedTextPipeline};
pub use products::{Product, ProductLookup, parse_products};
pub use prompts::{PromptSet, Stage};
pub use table::{PairedRow, TableMode, TableRow, TabularRow, format_table, parse_table};
