//! Per-creative property maps built from resolved sources.

use crate::ResolvedSources;
use serde_json::Value;
use std::collections::HashMap;
use tessera_core::{JsonMap, PropertyMap, Slot, SourceValues, TemplateConfig};
use tessera_error::ConfigError;

/// Build the property map for creative `creative_index`.
///
/// Slots are visited in config order. A toggleable slot switched off in
/// `inputs` is skipped. Pool values are spread with
/// `(creative_index * slots_sharing_source + slot_position) % pool_len`, so
/// slots sharing a pool never show the same entry within one creative while
/// the pool is large enough.
///
/// # Errors
///
/// Returns `ConfigError` if a source was not resolved, a per-creative list is
/// too short, or a slot's `field` is missing from its value.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use std::collections::HashMap;
/// use tessera_core::{JsonMap, Slot, SourceValues, TemplateConfig, Variant};
/// use tessera_engine::{ResolvedSources, build_layers};
///
/// let config = TemplateConfig::builder()
///     .name("demo")
///     .variants(vec![Variant::new("dark", "tpl-dark")])
///     .slots(vec![Slot::builder().name("bg.color").source("style.color").build().unwrap()])
///     .build()
///     .unwrap();
///
/// let mut resolved = ResolvedSources::new();
/// resolved.insert(
///     "style.color".to_string(),
///     SourceValues::PerCreative(vec![json!("#000"), json!("#fff")]),
/// );
///
/// let layers = build_layers(&config, &resolved, &JsonMap::new(), 1).unwrap();
/// assert_eq!(layers.get("bg", "color"), Some(&json!("#fff")));
/// ```
pub fn build_layers(
    config: &TemplateConfig,
    resolved: &ResolvedSources,
    inputs: &JsonMap,
    creative_index: usize,
) -> Result<PropertyMap, ConfigError> {
    let mut sharing: HashMap<&str, usize> = HashMap::new();
    for slot in config.slots() {
        *sharing.entry(slot.source().as_str()).or_default() += 1;
    }

    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut layers = PropertyMap::default();
    for slot in config.slots() {
        let source = slot.source().as_str();
        let position = positions.entry(source).or_default();
        let slot_position = *position;
        *position += 1;

        if slot.is_disabled(inputs) {
            tracing::trace!(slot = %slot.name(), "Slot toggled off");
            continue;
        }

        let values = resolved.get(source).ok_or_else(|| {
            ConfigError::new(format!("Source '{}' was not resolved", source))
        })?;
        let value = match values {
            SourceValues::Broadcast(by_slot) => by_slot.get(slot.name()).ok_or_else(|| {
                ConfigError::new(format!("No broadcast value for slot '{}'", slot.name()))
            })?,
            SourceValues::PerCreative(list) => list.get(creative_index).ok_or_else(|| {
                ConfigError::new(format!(
                    "Source '{}' has {} values, creative {} requested",
                    source,
                    list.len(),
                    creative_index
                ))
            })?,
            SourceValues::Pool(pool) => {
                if pool.is_empty() {
                    return Err(ConfigError::new(format!("Source '{}' has an empty pool", source)));
                }
                let shared = sharing.get(source).copied().unwrap_or(1);
                &pool[(creative_index * shared + slot_position) % pool.len()]
            }
        };

        layers.insert(slot.layer(), slot.property(), extract(slot, value)?);
    }
    Ok(layers)
}

fn extract(slot: &Slot, value: &Value) -> Result<Value, ConfigError> {
    let Some(field) = slot.field() else {
        return Ok(value.clone());
    };
    value.get(field.as_str()).cloned().ok_or_else(|| {
        ConfigError::new(format!(
            "Slot '{}' expects field '{}' in its value",
            slot.name(),
            field
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_field() {
        let slot = Slot::builder()
            .name("header.text")
            .source("text.paired_copy")
            .field("header")
            .build()
            .unwrap();
        let value = json!({"header": "BIG SALE", "main_text": "Everything must go"});
        assert_eq!(extract(&slot, &value).unwrap(), json!("BIG SALE"));
    }

    #[test]
    fn test_extract_missing_field() {
        let slot = Slot::builder()
            .name("header.text")
            .source("text.paired_copy")
            .field("headline")
            .build()
            .unwrap();
        assert!(extract(&slot, &json!({"header": "x"})).is_err());
    }

    #[test]
    fn test_extract_without_field_passes_through() {
        let slot = Slot::builder()
            .name("header.text")
            .source("text.header")
            .build()
            .unwrap();
        assert_eq!(extract(&slot, &json!("LAMPS")).unwrap(), json!("LAMPS"));
    }
}
