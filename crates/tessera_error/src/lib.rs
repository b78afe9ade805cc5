//! Error types for the Tessera workspace.
//!
//! This crate provides the error types shared by every Tessera crate.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! The categories map onto how the engine treats a failure:
//!
//! | Error | Policy |
//! |---|---|
//! | [`ConfigError`] | malformed template or slot reference, never retried |
//! | [`ValidationError`] | tabular output shape violation, retried within a stage budget |
//! | [`PipelineError`] | a stage exhausted its retry budget |
//! | [`UpstreamError`] | collaborator failure, retried at the call site when [`RetryableError::is_retryable`] |
//! | [`RenderError`] | a render job terminated in error, fatal for the batch |
//! | [`TimeoutError`] | polling exceeded its attempt ceiling |
//!
//! # Examples
//!
//! ```
//! use tessera_error::{ConfigError, TesseraResult};
//!
//! fn load_template() -> TesseraResult<String> {
//!     Err(ConfigError::new("No variants defined"))?
//! }
//!
//! match load_template() {
//!     Ok(name) => println!("Loaded: {}", name),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod pipeline;
mod render;
mod timeout;
mod upstream;
mod validation;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{TesseraError, TesseraErrorKind, TesseraResult};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use render::{RenderError, RenderErrorKind};
pub use timeout::TimeoutError;
pub use upstream::{RetryableError, UpstreamError, UpstreamErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
