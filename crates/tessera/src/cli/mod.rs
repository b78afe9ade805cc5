//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the tessera binary.

mod commands;
mod generate;
mod list;
mod text;
mod validate;

pub use commands::{Cli, Commands};
pub use generate::run_generate;
pub use list::{list_generators, list_templates};
pub use text::run_text;
pub use validate::run_validate;
