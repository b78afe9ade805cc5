//! Tests for layered settings.

use std::io::Write;
use tessera_rate_limit::{BackoffPolicy, TesseraConfig};

#[test]
fn test_bundled_defaults_load() {
    let config = TesseraConfig::from_toml_str("").unwrap();

    assert_eq!(*config.pipeline().max_stage_retries(), 2);
    assert_eq!(*config.render().poll_interval_ms(), 2000);
    assert_eq!(*config.render().max_poll_attempts(), 60);
    assert_eq!(*config.backoff().max_retries(), 5);
    assert_eq!(config.models().placid_base_url(), "https://api.placid.app/api/rest");
}

#[test]
fn test_bundled_defaults_match_code_defaults() {
    let loaded = TesseraConfig::from_toml_str("").unwrap();
    let coded = TesseraConfig::default();

    assert_eq!(loaded.render(), coded.render());
    assert_eq!(loaded.backoff(), coded.backoff());
    assert_eq!(loaded.models(), coded.models());
}

#[test]
fn test_overrides_replace_only_named_keys() {
    let config = TesseraConfig::from_toml_str(
        r#"
        [backoff]
        initial_delay_ms = 0
        max_retries = 1

        [models]
        text_model = "gpt-4.1-mini"
        "#,
    )
    .unwrap();

    assert_eq!(*config.backoff().initial_delay_ms(), 0);
    assert_eq!(*config.backoff().max_delay_secs(), 60);
    assert_eq!(config.models().text_model(), "gpt-4.1-mini");
    assert_eq!(BackoffPolicy::from(config.backoff()).max_retries(), 1);
}

#[test]
fn test_malformed_toml_is_config_error() {
    let err = TesseraConfig::from_toml_str("[render]\npoll_interval_ms = \"soon\"\n").unwrap_err();
    assert!(format!("{}", err).contains("Configuration Error"));
}

#[test]
fn test_explicit_file_has_precedence() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[render]\nmax_poll_rounds = 7").unwrap();

    let config = TesseraConfig::load_with(Some(file.path())).unwrap();
    assert_eq!(*config.render().max_poll_rounds(), 7);
}

#[test]
fn test_missing_explicit_file_is_error() {
    let result = TesseraConfig::load_with(Some(std::path::Path::new("/nonexistent/tessera.toml")));
    assert!(result.is_err());
}
