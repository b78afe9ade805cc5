//! Tracing subscriber setup for the binary.
//!
//! With the `otel` feature, spans can additionally be bridged to
//! OpenTelemetry and printed by the stdout span exporter.

use std::env;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name for telemetry attribution
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Log level filter used when `RUST_LOG` is unset (e.g. "info", "debug")
    pub log_level: String,
    /// Emit JSON-formatted logs for structured logging
    pub json_logs: bool,
    /// Export finished spans through OpenTelemetry to stdout (`otel` feature)
    pub stdout_spans: bool,
}

impl ObservabilityConfig {
    /// Configuration for `service_name`, honouring `RUST_LOG` and defaulting
    /// to "info".
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json_logs: false,
            stdout_spans: false,
        }
    }

    /// Set the service version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Enable the OpenTelemetry stdout span exporter.
    ///
    /// Ignored with a warning unless built with the `otel` feature.
    pub fn with_stdout_spans(mut self, enabled: bool) -> Self {
        self.stdout_spans = enabled;
        self
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

/// Initialize logging with the default configuration.
pub fn init_observability() -> Result<(), Box<dyn std::error::Error>> {
    init_observability_with_config(ObservabilityConfig::default())
}

/// Initialize logging: an `EnvFilter` plus a text or JSON fmt layer on stderr,
/// and the OpenTelemetry bridge when requested.
///
/// `RUST_LOG` wins over `config.log_level` when set.
pub fn init_observability_with_config(
    config: ObservabilityConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .boxed()
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(fmt_layer);

    #[cfg(feature = "otel")]
    {
        use opentelemetry::{KeyValue, global, trace::TracerProvider};
        use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};

        let otel_layer = if config.stdout_spans {
            let resource = Resource::builder()
                .with_service_name(config.service_name.clone())
                .with_attributes(vec![KeyValue::new(
                    "service.version",
                    config.service_version.clone(),
                )])
                .build();
            let provider = SdkTracerProvider::builder()
                .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
                .with_resource(resource)
                .build();
            global::set_tracer_provider(provider.clone());
            let tracer = provider.tracer(config.service_name.clone());
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        } else {
            None
        };
        subscriber.with(otel_layer).try_init()?;
    }

    #[cfg(not(feature = "otel"))]
    {
        subscriber.try_init()?;
        if config.stdout_spans {
            tracing::warn!("Span export requested but built without the otel feature");
        }
    }

    Ok(())
}
