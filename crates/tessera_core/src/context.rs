//! Per-call generation context.

use crate::Topic;
use serde_json::Value;

/// JSON object used for inputs, options and generator configuration.
pub type JsonMap = serde_json::Map<String, Value>;

/// Everything one `generate` call knows about its request.
///
/// Immutable for the duration of the call.
///
/// # Examples
///
/// ```
/// use tessera_core::{GenerationContext, JsonMap, Topic};
/// use serde_json::json;
///
/// let mut options = JsonMap::new();
/// options.insert("remove_bg".to_string(), json!(false));
///
/// let context = GenerationContext::builder()
///     .topic(Topic::new("Desk Lamps"))
///     .options(options)
///     .count(12usize)
///     .build()
///     .unwrap();
///
/// assert!(!context.option_flag("remove_bg", true));
/// assert!(context.option_flag("crop", true));
/// ```
#[derive(Debug, Clone, PartialEq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GenerationContext {
    /// Topic of the batch
    topic: Topic,
    /// Merged user inputs
    #[builder(default)]
    inputs: JsonMap,
    /// Processing options (e.g. `remove_bg`, `crop`)
    #[builder(default)]
    options: JsonMap,
    /// Number of creatives to produce
    count: usize,
}

impl GenerationContext {
    /// Creates a new context builder.
    pub fn builder() -> GenerationContextBuilder {
        GenerationContextBuilder::default()
    }

    /// Read a boolean processing option, falling back to `default`.
    pub fn option_flag(&self, key: &str, default: bool) -> bool {
        flag(&self.options, key, default)
    }

    /// Copy of the inputs with `overlay` entries written over them.
    pub fn inputs_with(&self, overlay: &JsonMap) -> JsonMap {
        let mut merged = self.inputs.clone();
        for (key, value) in overlay {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

fn flag(map: &JsonMap, key: &str, default: bool) -> bool {
    match map.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            _ => default,
        },
        _ => default,
    }
}
