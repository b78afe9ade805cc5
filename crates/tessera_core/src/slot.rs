//! Slot definitions binding a layer property to a value source.

use crate::JsonMap;
use serde::{Deserialize, Serialize};
use tessera_error::{BuilderError, ConfigError};

/// One layer property of a render template and the source that fills it.
///
/// The name always has the form `<layer>.<property>`, e.g. `header.text`.
///
/// # Examples
///
/// ```
/// use tessera_core::Slot;
///
/// let slot = Slot::builder()
///     .name("header.text")
///     .source("text.header")
///     .toggleable(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(slot.layer(), "header");
/// assert_eq!(slot.property(), "text");
/// assert_eq!(slot.toggle_key(), "include_header");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct Slot {
    /// Dotted `<layer>.<property>` name
    name: String,
    /// Source identifier (`text.header`, `style.background_color`, ...)
    source: String,
    /// Generator configuration overlaid on the request inputs
    #[builder(default)]
    #[serde(default)]
    config: JsonMap,
    /// Whether a user toggle can switch this slot off
    #[builder(default)]
    #[serde(default)]
    toggleable: bool,
    /// Whether the source should produce one value per creative
    #[builder(default)]
    #[serde(default)]
    batch: bool,
    /// Field to extract when the resolved value is an object
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    field: Option<String>,
    /// Input key overriding `include_<layer>`
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    toggle: Option<String>,
}

impl SlotBuilder {
    /// Build the Slot, checking the `<layer>.<property>` form.
    ///
    /// # Errors
    ///
    /// Returns error if a required field is missing or the name is malformed.
    pub fn build(&self) -> Result<Slot, BuilderError> {
        let slot = self.build_internal().map_err(|e| e.to_string())?;
        slot.validate().map_err(|e| e.message)?;
        Ok(slot)
    }
}

impl Slot {
    /// Creates a new slot builder.
    pub fn builder() -> SlotBuilder {
        SlotBuilder::default()
    }

    /// Check the name form and that a source is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the name is not `<layer>.<property>` with
    /// exactly one dot and both parts non-empty, or the source is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.name.split_once('.') {
            Some((layer, property))
                if !layer.is_empty() && !property.is_empty() && !property.contains('.') => {}
            _ => {
                return Err(ConfigError::new(format!(
                    "Slot name must be '<layer>.<property>', got '{}'",
                    self.name
                )));
            }
        }
        if self.source.trim().is_empty() {
            return Err(ConfigError::new(format!(
                "Slot '{}' has an empty source",
                self.name
            )));
        }
        Ok(())
    }

    /// Layer part of the name.
    pub fn layer(&self) -> &str {
        self.name
            .split_once('.')
            .map(|(layer, _)| layer)
            .unwrap_or(&self.name)
    }

    /// Property part of the name.
    pub fn property(&self) -> &str {
        self.name
            .split_once('.')
            .map(|(_, property)| property)
            .unwrap_or_default()
    }

    /// Input key that switches a toggleable slot off.
    pub fn toggle_key(&self) -> String {
        match &self.toggle {
            Some(key) => key.clone(),
            None => format!("include_{}", self.layer()),
        }
    }

    /// Whether the slot is switched off by the given inputs.
    ///
    /// Only toggleable slots can be switched off, and only by an explicit
    /// `false` (boolean or the string "false").
    pub fn is_disabled(&self, inputs: &JsonMap) -> bool {
        if !self.toggleable {
            return false;
        }
        match inputs.get(&self.toggle_key()) {
            Some(serde_json::Value::Bool(included)) => !included,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("false"),
            _ => false,
        }
    }
}
