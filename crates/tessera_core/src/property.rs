//! Layer/property maps sent to the renderer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Resolved properties for one creative, grouped by layer.
///
/// Serializes as `{"<layer>": {"<property>": value}}`, the shape render
/// services expect.
///
/// # Examples
///
/// ```
/// use tessera_core::PropertyMap;
/// use serde_json::json;
///
/// let mut properties = PropertyMap::default();
/// properties.insert("header", "text", json!("DESK LAMPS"));
/// properties.insert("header", "color", json!("#ffffff"));
///
/// assert_eq!(properties.get("header", "text"), Some(&json!("DESK LAMPS")));
/// assert_eq!(
///     properties.to_json(),
///     json!({"header": {"color": "#ffffff", "text": "DESK LAMPS"}})
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap(BTreeMap<String, BTreeMap<String, Value>>);

impl PropertyMap {
    /// Set `layer.property`, replacing any earlier value.
    pub fn insert(&mut self, layer: impl Into<String>, property: impl Into<String>, value: Value) {
        self.0
            .entry(layer.into())
            .or_default()
            .insert(property.into(), value);
    }

    /// Look up `layer.property`.
    pub fn get(&self, layer: &str, property: &str) -> Option<&Value> {
        self.0.get(layer).and_then(|props| props.get(property))
    }

    /// Whether any property of `layer` is set.
    pub fn has_layer(&self, layer: &str) -> bool {
        self.0.contains_key(layer)
    }

    /// Layer names in sorted order.
    pub fn layers(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of layers with at least one property.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no layer is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a JSON object.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or(Value::Null)
    }
}
