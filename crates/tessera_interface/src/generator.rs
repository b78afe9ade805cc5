//! Value generator trait.

use crate::{Capability, OutputMode};
use async_trait::async_trait;
use serde_json::Value;
use tessera_core::{JsonMap, TokenLedger, Topic};
use tessera_error::TesseraResult;

/// Everything a generator sees for one call.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GeneratorRequest {
    /// Topic of the batch
    topic: Topic,
    /// Request inputs overlaid with slot configuration
    #[builder(default)]
    inputs: JsonMap,
    /// Processing options
    #[builder(default)]
    options: JsonMap,
    /// Values wanted (1 for broadcast, N for batch and pool)
    #[getter(copy)]
    count: usize,
}

impl GeneratorRequest {
    /// Creates a new request builder.
    pub fn builder() -> GeneratorRequestBuilder {
        GeneratorRequestBuilder::default()
    }

    /// String input by key.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.inputs.get(key).and_then(Value::as_str)
    }

    /// Boolean option, falling back to `default`.
    pub fn option_flag(&self, key: &str, default: bool) -> bool {
        match self.options.get(key).or_else(|| self.inputs.get(key)) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
            _ => default,
        }
    }
}

/// Produces slot values for a source identifier.
///
/// Generators are built once per `generate` call from a registry and hold
/// the collaborators their capability requires.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Registry identifier (e.g. "text.header").
    fn name(&self) -> &str;

    /// Collaborators this generator depends on.
    fn capability(&self) -> Capability;

    /// Output shape outside batch mode.
    fn output_mode(&self) -> OutputMode {
        OutputMode::Values
    }

    /// Produce values for `request`.
    ///
    /// In `Values` mode exactly `request.count()` values must be returned; in
    /// `Pool` mode any non-empty list.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for missing or malformed inputs, and propagates
    /// collaborator failures.
    async fn generate(
        &self,
        request: &GeneratorRequest,
        ledger: &mut TokenLedger,
    ) -> TesseraResult<Vec<Value>>;
}
