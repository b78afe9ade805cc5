//! Tests for the re-exported surface.

use tessera::{
    Capability, GeneratorRegistry, ObservabilityConfig, OutputMode, PairedRow, TableRow,
    TemplateConfig, builtin_names, builtin_template, format_table, parse_table,
};

#[test]
fn test_builtins_available() {
    let names = builtin_names();
    assert!(names.contains(&"product_cluster"));
    assert!(names.contains(&"product_grid"));
    assert!(names.contains(&"half_half"));

    for name in names {
        let template = builtin_template(name).unwrap();
        template.validate().unwrap();
    }
}

#[test]
fn test_builtin_sources_are_registered() {
    let registry = GeneratorRegistry::builtin();
    for name in builtin_names() {
        let template = builtin_template(name).unwrap();
        for source in template.sources() {
            if source.starts_with("style.") || source.starts_with("cta.") {
                continue;
            }
            assert!(registry.contains(source), "{} uses unknown {}", name, source);
        }
    }
}

#[test]
fn test_registry_describes_generators() {
    let registry = GeneratorRegistry::builtin();
    let pool = registry.info("image.products").unwrap();
    assert_eq!(pool.capability(), Capability::Image);
    assert_eq!(pool.output_mode(), OutputMode::Pool);
    assert_eq!(
        registry.info("text.header").unwrap().capability(),
        Capability::Text
    );
}

#[test]
fn test_template_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("banner.toml");
    std::fs::write(
        &path,
        r#"
name = "banner"

[[variants]]
label = "default"
template_id = "tpl-1"

[[slots]]
name = "title.text"
source = "text.header"
"#,
    )
    .unwrap();

    let template = TemplateConfig::from_file(&path).unwrap();
    assert_eq!(template.name(), "banner");
    assert_eq!(template.variants_for(2).unwrap().len(), 2);
}

#[test]
fn test_table_helpers() {
    let rows = parse_table::<TableRow>("1\tFirst\n2\tSecond", 2).unwrap();
    let table = format_table("Lamps", &rows);
    assert_eq!(parse_table::<TableRow>(&table, 2).unwrap(), rows);

    let paired = parse_table::<PairedRow>("1\tHEAD\tBody", 1).unwrap();
    assert_eq!(paired[0].header(), "HEAD");
}

#[test]
fn test_observability_config_builder() {
    let config = ObservabilityConfig::new("tessera-test")
        .with_version("9.9.9")
        .with_log_level("debug")
        .with_json_logs(true)
        .with_stdout_spans(true);
    assert_eq!(config.service_name, "tessera-test");
    assert_eq!(config.service_version, "9.9.9");
    assert_eq!(config.log_level, "debug");
    assert!(config.json_logs);
    assert!(config.stdout_spans);
}

#[test]
fn test_observability_defaults_to_package_metadata() {
    let config = ObservabilityConfig::default();
    assert_eq!(config.service_name, "tessera");
    assert_eq!(config.service_version, env!("CARGO_PKG_VERSION"));
    assert!(!config.json_logs);
    assert!(!config.stdout_spans);
}
