mod test_utils;

use serde_json::json;
use std::sync::Arc;
use tessera_core::{JsonMap, TemplateConfig, TokenLedger, Topic};
use tessera_engine::{CreativeEngine, RenderOrchestrator, builtin_template};
use tessera_error::TesseraErrorKind;
use tessera_rate_limit::{BackoffPolicy, RenderSettings, TesseraConfig};
use test_utils::{MockImageServices, MockRenderBackend, MockTextBackend, context, plain_table, services};

const ALTERNATING: &str = r##"
name = "alternating"
display_name = "Alternating"
variant_sequence = [
  "dark", "light", "dark", "light", "dark", "light",
  "dark", "light", "dark", "light", "dark", "light",
]

[[variants]]
label = "dark"
template_id = "tpl-dark"

[[variants]]
label = "light"
template_id = "tpl-light"

[[slots]]
name = "header.text"
source = "text.header"
toggleable = true

[[slots]]
name = "bg.background_color"
source = "style.background_color"

[[style_pool]]
background_color = "#111111"

[[style_pool]]
background_color = "#222222"

[[style_pool]]
background_color = "#333333"

[[style_pool]]
background_color = "#444444"
"##;

fn engine(text: &MockTextBackend, images: &MockImageServices, render: &MockRenderBackend) -> CreativeEngine {
    let orchestrator = RenderOrchestrator::new(Arc::new(render.clone()))
        .with_settings(RenderSettings::new(0, 10, 5, 0))
        .with_backoff(BackoffPolicy::immediate(2));
    CreativeEngine::new(services(text, images), Arc::new(render.clone()))
        .with_orchestrator(orchestrator)
}

#[tokio::test]
async fn test_end_to_end_alternating_variants_with_style_pool() {
    let text = MockTextBackend::new_success("unused");
    let images = MockImageServices::new();
    let render = MockRenderBackend::new();
    let config: TemplateConfig = ALTERNATING.parse().unwrap();

    let creatives = engine(&text, &images, &render)
        .generate(Topic::new("Desk Lamps"), &config, JsonMap::new(), JsonMap::new(), 12)
        .await
        .unwrap();

    assert_eq!(creatives.len(), 12);
    let colors = ["#111111", "#222222", "#333333", "#444444"];
    for (i, creative) in creatives.iter().enumerate() {
        let expected_variant = if i % 2 == 0 { "dark" } else { "light" };
        assert_eq!(creative.template_name(), "alternating");
        assert_eq!(creative.variant(), expected_variant);
        assert_eq!(creative.url(), &format!("https://render.test/job-{}.png", i));
        assert_eq!(
            creative.properties().get("header", "text"),
            Some(&json!("DESK LAMPS"))
        );
        assert_eq!(
            creative.properties().get("bg", "background_color"),
            Some(&json!(colors[i % 4]))
        );
    }

    let templates = render.submitted_templates();
    assert_eq!(templates.len(), 12);
    assert_eq!(templates[0], "tpl-dark");
    assert_eq!(templates[1], "tpl-light");
    assert_eq!(templates[11], "tpl-light");
}

#[tokio::test]
async fn test_toggled_off_header_absent_from_every_creative() {
    let text = MockTextBackend::new_success("unused");
    let images = MockImageServices::new();
    let render = MockRenderBackend::new();
    let config: TemplateConfig = ALTERNATING.parse().unwrap();

    let creatives = engine(&text, &images, &render)
        .generate_with_ledger(
            &context(json!({"include_header": false}), 6),
            &config,
            &mut TokenLedger::default(),
        )
        .await
        .unwrap();

    assert_eq!(creatives.len(), 6);
    assert!(creatives.iter().all(|c| !c.properties().has_layer("header")));
}

#[tokio::test]
async fn test_poll_error_returns_no_creatives() {
    let text = MockTextBackend::new_success("unused");
    let images = MockImageServices::new();
    let render = MockRenderBackend::new().failing_job("job-4");
    let config: TemplateConfig = ALTERNATING.parse().unwrap();

    let result = engine(&text, &images, &render)
        .generate(Topic::new("Desk Lamps"), &config, JsonMap::new(), JsonMap::new(), 12)
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err.kind(), TesseraErrorKind::Render(_)));
    assert_eq!(render.submit_count(), 12);
}

#[tokio::test]
async fn test_submit_failure_aborts_after_all_submissions() {
    let text = MockTextBackend::new_success("unused");
    let images = MockImageServices::new();
    let render = MockRenderBackend::new().failing_submit(0);
    let config: TemplateConfig = ALTERNATING.parse().unwrap();

    let err = engine(&text, &images, &render)
        .generate(Topic::new("Desk Lamps"), &config, JsonMap::new(), JsonMap::new(), 4)
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), TesseraErrorKind::Render(_)));
    assert_eq!(render.submit_count(), 4);
}

#[tokio::test]
async fn test_zero_count_is_config_error() {
    let text = MockTextBackend::new_success("unused");
    let images = MockImageServices::new();
    let render = MockRenderBackend::new();
    let config: TemplateConfig = ALTERNATING.parse().unwrap();

    let err = engine(&text, &images, &render)
        .generate(Topic::new("Desk Lamps"), &config, JsonMap::new(), JsonMap::new(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), TesseraErrorKind::Config(_)));
    assert_eq!(render.submit_count(), 0);
}

#[tokio::test]
async fn test_uncovered_variant_sequence_is_config_error() {
    let text = MockTextBackend::new_success("unused");
    let images = MockImageServices::new();
    let render = MockRenderBackend::new();
    let config: TemplateConfig = ALTERNATING.parse().unwrap();

    let err = engine(&text, &images, &render)
        .generate(Topic::new("Desk Lamps"), &config, JsonMap::new(), JsonMap::new(), 13)
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), TesseraErrorKind::Config(_)));
}

#[tokio::test]
async fn test_product_cluster_runs_text_pipeline_and_cluster_image() {
    let text = MockTextBackend::new_success(plain_table("final", 4));
    let images = MockImageServices::new();
    let render = MockRenderBackend::new();
    let config = builtin_template("product_cluster").unwrap();
    let mut ledger = TokenLedger::default();

    let creatives = engine(&text, &images, &render)
        .generate_with_ledger(
            &context(
                json!({
                    "product_image_urls": ["https://a.test/0.png", "https://a.test/1.png"],
                    "product_names": ["Arc Lamp", "Clip Light"]
                }),
                4,
            ),
            &config,
            &mut ledger,
        )
        .await
        .unwrap();

    assert_eq!(creatives.len(), 4);
    assert_eq!(text.call_count(), 3);
    assert_eq!(*ledger.calls(), 3);
    assert!(text.user_messages()[0].contains("Product Context (use in exactly 2 of 4 lines):"));

    let image = creatives[0].properties().get("image", "image").unwrap().clone();
    assert!(creatives.iter().all(|c| c.properties().get("image", "image") == Some(&image)));
    assert_eq!(
        creatives[3].properties().get("main_text", "text"),
        Some(&json!("final line 4"))
    );
    assert_eq!(images.count("upload"), 1);
}

#[tokio::test]
async fn test_preview_builds_maps_without_rendering() {
    let text = MockTextBackend::new_success("unused");
    let images = MockImageServices::new();
    let render = MockRenderBackend::new();
    let config: TemplateConfig = ALTERNATING.parse().unwrap();

    let maps = engine(&text, &images, &render)
        .preview(&context(json!({}), 3), &config)
        .await
        .unwrap();

    assert_eq!(maps.len(), 3);
    assert_eq!(render.submit_count(), 0);
}

#[test]
fn test_from_config_uses_render_settings() {
    let config = TesseraConfig::default().with_render(RenderSettings::new(5, 3, 2, 0));
    let render = MockRenderBackend::new();
    let engine = CreativeEngine::from_config(
        tessera_engine::Services::default(),
        Arc::new(render),
        &config,
    );
    assert_eq!(*engine.orchestrator().settings().max_poll_rounds(), 3);
    assert!(engine.registry().contains("image.products"));
}
