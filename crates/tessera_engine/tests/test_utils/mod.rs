//! Shared test utilities.

#![allow(dead_code)]

pub mod mock_image;
pub mod mock_render;
pub mod mock_text;

pub use mock_image::MockImageServices;
pub use mock_render::MockRenderBackend;
pub use mock_text::{MockResponse, MockTextBackend};

use serde_json::{Value, json};
use std::sync::Arc;
use tessera_core::{GenerationContext, JsonMap, Topic};
use tessera_engine::{ImageServices, Services, TextServices};
use tessera_rate_limit::{BackoffPolicy, PipelineSettings};

/// A plain table with rows `1..=count`, each tagged with `label`.
pub fn plain_table(label: &str, count: usize) -> String {
    let mut lines = vec!["Variation #\tText".to_string()];
    lines.extend((1..=count).map(|i| format!("{}\t{} line {}", i, label, i)));
    lines.join("\n")
}

/// Services over the given mocks with zero-delay retries.
pub fn services(text: &MockTextBackend, images: &MockImageServices) -> Services {
    let text = TextServices::new(Arc::new(text.clone()))
        .with_settings(PipelineSettings::default().with_max_stage_retries(1))
        .with_backoff(BackoffPolicy::immediate(3));
    let shared = Arc::new(images.clone());
    let image = ImageServices::new(shared.clone(), shared.clone(), shared.clone(), shared)
        .with_backoff(BackoffPolicy::immediate(3));
    Services::new(text, image)
}

/// Context for "Desk Lamps" with `inputs` and `count`.
pub fn context(inputs: Value, count: usize) -> GenerationContext {
    GenerationContext::builder()
        .topic(Topic::new("Desk Lamps"))
        .inputs(as_map(inputs))
        .count(count)
        .build()
        .unwrap()
}

/// A JSON object literal as a map.
pub fn as_map(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        Value::Null => JsonMap::new(),
        other => panic!("expected an object, got {}", other),
    }
}

/// Four single-color style entries.
pub fn four_styles() -> Value {
    json!([
        {"background_color": "#111111"},
        {"background_color": "#222222"},
        {"background_color": "#333333"},
        {"background_color": "#444444"},
    ])
}
