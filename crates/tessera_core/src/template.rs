//! Template configurations: variants, slots and static pools.

use crate::{JsonMap, Slot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use tessera_error::ConfigError;

/// A physical render template a creative position can use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Variant {
    /// Label referenced by the variant sequence (e.g. "dark")
    label: String,
    /// Render service template id
    template_id: String,
}

impl Variant {
    /// Variant from label and template id.
    pub fn new(label: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            template_id: template_id.into(),
        }
    }
}

/// Immutable description of one creative type.
///
/// Loaded once at startup (from TOML or built in code) and validated on
/// construction.
///
/// # Examples
///
/// ```
/// use tessera_core::TemplateConfig;
///
/// let config: TemplateConfig = r#"
///     name = "headline_card"
///
///     [[variants]]
///     label = "dark"
///     template_id = "tpl-dark"
///
///     [[slots]]
///     name = "header.text"
///     source = "text.header"
/// "#
/// .parse()
/// .unwrap();
///
/// assert_eq!(config.display_name(), "headline_card");
/// assert_eq!(config.variants_for(3).unwrap().len(), 3);
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
pub struct TemplateConfig {
    /// Configuration name (e.g. "product_cluster")
    name: String,
    /// Human-readable name
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    #[getter(skip)]
    display_name: Option<String>,
    /// Physical templates, first is the default
    variants: Vec<Variant>,
    /// Variant label for each creative position
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    variant_sequence: Option<Vec<String>>,
    /// Slots in render order
    #[builder(default)]
    #[serde(default)]
    slots: Vec<Slot>,
    /// Style bundles cycled by creative index
    #[builder(default)]
    #[serde(default)]
    style_pool: Vec<JsonMap>,
    /// Call-to-action bundles cycled by creative index
    #[builder(default)]
    #[serde(default)]
    cta_pool: Vec<JsonMap>,
}

impl TemplateConfigBuilder {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required field is missing or validation fails.
    pub fn build(&self) -> Result<TemplateConfig, ConfigError> {
        let config = self
            .build_internal()
            .map_err(|e| ConfigError::new(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl TemplateConfig {
    /// Creates a new template builder.
    pub fn builder() -> TemplateConfigBuilder {
        TemplateConfigBuilder::default()
    }

    /// Load and validate a template from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed or validated.
    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!(
                "Failed to read template file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = content.parse()?;
        tracing::debug!(
            name = %config.name,
            slots = config.slots.len(),
            variants = config.variants.len(),
            "Loaded template"
        );
        Ok(config)
    }

    /// Display name, falling back to the configuration name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when there are no variants, a sequence label is
    /// unknown, a slot name is malformed or a slot name repeats.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::new("Template name must not be empty"));
        }
        if self.variants.is_empty() {
            return Err(ConfigError::new(format!(
                "Template '{}' defines no variants",
                self.name
            )));
        }
        if let Some(sequence) = &self.variant_sequence {
            for label in sequence {
                if self.variant(label).is_none() {
                    return Err(ConfigError::new(format!(
                        "Template '{}' sequence references unknown variant '{}'",
                        self.name, label
                    )));
                }
            }
        }
        let mut seen = HashSet::new();
        for slot in &self.slots {
            slot.validate()?;
            if !seen.insert(slot.name().as_str()) {
                return Err(ConfigError::new(format!(
                    "Template '{}' defines slot '{}' twice",
                    self.name,
                    slot.name()
                )));
            }
        }
        Ok(())
    }

    /// Look up a variant by label.
    pub fn variant(&self, label: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.label == label)
    }

    /// Variant for each of `count` creative positions.
    ///
    /// Without a sequence every position uses the first variant.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the sequence is shorter than `count`.
    pub fn variants_for(&self, count: usize) -> Result<Vec<&Variant>, ConfigError> {
        let default = self
            .variants
            .first()
            .ok_or_else(|| ConfigError::new(format!("Template '{}' defines no variants", self.name)))?;
        let Some(sequence) = &self.variant_sequence else {
            return Ok(vec![default; count]);
        };
        if sequence.len() < count {
            return Err(ConfigError::new(format!(
                "Template '{}' variant sequence covers {} positions, {} requested",
                self.name,
                sequence.len(),
                count
            )));
        }
        sequence[..count]
            .iter()
            .map(|label| {
                self.variant(label).ok_or_else(|| {
                    ConfigError::new(format!("Unknown variant '{}' in sequence", label))
                })
            })
            .collect()
    }

    /// Point variant `label` at a different render template.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no variant has that label.
    pub fn with_template_id(
        mut self,
        label: &str,
        template_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let variant = self
            .variants
            .iter_mut()
            .find(|v| v.label == label)
            .ok_or_else(|| {
                ConfigError::new(format!(
                    "Template '{}' has no variant '{}'",
                    self.name, label
                ))
            })?;
        variant.template_id = template_id.into();
        Ok(self)
    }

    /// Distinct slot sources in first-reference order.
    pub fn sources(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.slots
            .iter()
            .map(|slot| slot.source().as_str())
            .filter(|source| seen.insert(*source))
            .collect()
    }

    /// Every slot referencing `source`, in config order.
    pub fn slots_for_source<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Slot> + 'a {
        self.slots.iter().filter(move |slot| slot.source() == source)
    }

    /// Static pool for a pool-backed source family ("style" or "cta").
    pub fn pool(&self, family: &str) -> Option<&[JsonMap]> {
        match family {
            "style" => Some(self.style_pool.as_slice()),
            "cta" => Some(self.cta_pool.as_slice()),
            _ => None,
        }
    }
}

impl FromStr for TemplateConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s)
            .map_err(|e| ConfigError::new(format!("Failed to parse template TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
