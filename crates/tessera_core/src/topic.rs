//! Topic description shared by every text stage.

use serde::{Deserialize, Serialize};

/// The subject of a creative batch.
///
/// Every staged-text request starts with the topic rendered as labelled lines.
///
/// # Examples
///
/// ```
/// use tessera_core::Topic;
///
/// let topic = Topic::builder()
///     .name("Wireless Earbuds")
///     .event("Black Friday")
///     .discount("up to 50%")
///     .build()
///     .unwrap();
///
/// let message = topic.to_user_message();
/// assert!(message.starts_with("Topic: Wireless Earbuds\nEvent: Black Friday"));
/// assert!(message.contains("Page type: general"));
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
pub struct Topic {
    /// Topic name (e.g. "Wireless Earbuds")
    name: String,
    /// Sales event, "none" when absent
    #[builder(default = "String::from(\"none\")")]
    #[serde(default = "default_none")]
    event: String,
    /// Discount wording, "none" when absent
    #[builder(default = "String::from(\"none\")")]
    #[serde(default = "default_none")]
    discount: String,
    /// Landing page type ("general" or "category")
    #[builder(default = "String::from(\"general\")")]
    #[serde(default = "default_page_type")]
    page_type: String,
    /// Page the topic was scraped from
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    source_url: Option<String>,
}

fn default_none() -> String {
    "none".to_string()
}

fn default_page_type() -> String {
    "general".to_string()
}

impl Topic {
    /// Topic with the given name and default event, discount and page type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            event: default_none(),
            discount: default_none(),
            page_type: default_page_type(),
            source_url: None,
        }
    }

    /// Creates a new topic builder.
    pub fn builder() -> TopicBuilder {
        TopicBuilder::default()
    }

    /// Render the topic as the opening lines of a stage's user message.
    pub fn to_user_message(&self) -> String {
        let mut lines = vec![
            format!("Topic: {}", self.name),
            format!("Event: {}", self.event),
            format!("Discount: {}", self.discount),
            format!("Page type: {}", self.page_type),
        ];
        if let Some(url) = &self.source_url {
            lines.push(format!("Source: {}", url));
        }
        lines.join("\n")
    }
}
