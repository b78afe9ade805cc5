//! Core type definitions for the Tessera interface.

use serde::{Deserialize, Serialize};

/// Which collaborators a generator needs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Capability {
    /// Uses the text backend.
    Text,
    /// Uses the image, background-removal and upload services.
    Image,
}

/// Shape of what a generator returns when not forced into batch mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, Default,
)]
#[strum(serialize_all = "snake_case")]
pub enum OutputMode {
    /// Exactly `count` values.
    #[default]
    Values,
    /// A non-empty pool of any length.
    Pool,
}

/// Shaping parameters for image composition.
///
/// # Examples
///
/// ```
/// use tessera_interface::ComposeParams;
///
/// let params = ComposeParams::builder().aspect_ratio("16:9").build().unwrap();
/// assert_eq!(params.aspect_ratio(), "16:9");
/// assert!(!params.is_people_mode());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct ComposeParams {
    /// Target aspect ratio, e.g. "1:1"
    aspect_ratio: String,
    /// Whether the inputs show people rather than products
    #[builder(default)]
    #[getter(copy)]
    is_people_mode: bool,
    /// Optional extra instruction for the compositor
    #[builder(default, setter(into, strip_option))]
    instruction: Option<String>,
}

impl ComposeParams {
    /// Creates a new params builder.
    pub fn builder() -> ComposeParamsBuilder {
        ComposeParamsBuilder::default()
    }
}
