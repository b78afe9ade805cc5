//! Finished creatives.

use crate::PropertyMap;
use serde::{Deserialize, Serialize};

/// One rendered creative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Creative {
    /// Template configuration name
    template_name: String,
    /// Variant label used for this position
    variant: String,
    /// Full property set sent to the renderer
    properties: PropertyMap,
    /// Renderer-returned image URL
    url: String,
}

impl Creative {
    /// Assemble a creative from its parts.
    pub fn new(
        template_name: impl Into<String>,
        variant: impl Into<String>,
        properties: PropertyMap,
        url: impl Into<String>,
    ) -> Self {
        Self {
            template_name: template_name.into(),
            variant: variant.into(),
            properties,
            url: url.into(),
        }
    }
}
