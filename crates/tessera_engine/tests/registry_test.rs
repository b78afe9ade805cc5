mod test_utils;

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tessera_core::{TokenLedger, Topic};
use tessera_engine::{GeneratorRegistry, Services};
use tessera_error::{TesseraErrorKind, TesseraResult};
use tessera_interface::{Capability, Generator, GeneratorRequest, OutputMode};
use test_utils::{MockImageServices, MockTextBackend, services};

struct Countdown;

#[async_trait]
impl Generator for Countdown {
    fn name(&self) -> &str {
        "text.countdown"
    }

    fn capability(&self) -> Capability {
        Capability::Text
    }

    async fn generate(
        &self,
        request: &GeneratorRequest,
        _ledger: &mut TokenLedger,
    ) -> TesseraResult<Vec<Value>> {
        Ok((0..request.count()).rev().map(|i| json!(i)).collect())
    }
}

#[test]
fn test_builtin_registry_lists_every_generator() {
    let registry = GeneratorRegistry::builtin();
    let names: Vec<String> = registry.list().iter().map(|info| info.name().clone()).collect();
    assert_eq!(
        names,
        vec![
            "image.cluster",
            "image.product",
            "image.products",
            "text.header",
            "text.main_text",
            "text.paired_copy",
        ]
    );
    assert_eq!(
        registry.info("image.products").unwrap().output_mode(),
        OutputMode::Pool
    );
    assert_eq!(
        registry.info("text.main_text").unwrap().capability(),
        Capability::Text
    );
}

#[test]
fn test_unknown_generator_is_config_error() {
    let registry = GeneratorRegistry::builtin();
    let err = registry.create("text.nope", &Services::default()).err().unwrap();
    assert!(matches!(err.kind(), TesseraErrorKind::Config(_)));
}

#[test]
fn test_image_generator_without_image_services_is_config_error() {
    let registry = GeneratorRegistry::builtin();
    let text = MockTextBackend::new_success("unused");
    let services = Services::text_only(tessera_engine::TextServices::new(Arc::new(text)));

    assert!(registry.create("text.header", &services).is_ok());
    let err = registry.create("image.cluster", &services).err().unwrap();
    assert!(err.to_string().contains("needs image services"));
}

#[tokio::test]
async fn test_custom_generators_can_be_registered() {
    let mut registry = GeneratorRegistry::new();
    assert!(registry.is_empty());
    registry.register_text(
        "text.countdown",
        OutputMode::Values,
        "Counts down to zero",
        &[],
        |_| Box::new(Countdown),
    );
    assert_eq!(registry.len(), 1);

    let text = MockTextBackend::new_success("unused");
    let images = MockImageServices::new();
    let generator = registry
        .create("text.countdown", &services(&text, &images))
        .unwrap();
    let request = GeneratorRequest::builder()
        .topic(Topic::new("Desk Lamps"))
        .count(3usize)
        .build()
        .unwrap();

    let values = generator
        .generate(&request, &mut TokenLedger::default())
        .await
        .unwrap();
    assert_eq!(values, vec![json!(2), json!(1), json!(0)]);
}
