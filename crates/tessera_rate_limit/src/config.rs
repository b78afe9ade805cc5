//! Layered settings for the Tessera engine.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tessera_error::{ConfigError, TesseraError, TesseraResult};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../tessera.toml");

/// Staged text pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct PipelineSettings {
    /// Extra attempts per stage after a table fails validation
    max_stage_retries: usize,
    /// Share of lines that should mention product context
    product_context_share: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_stage_retries: 2,
            product_context_share: 1.0 / 3.0,
        }
    }
}

impl PipelineSettings {
    /// Settings with an explicit retry budget.
    pub fn with_max_stage_retries(mut self, retries: usize) -> Self {
        self.max_stage_retries = retries;
        self
    }
}

/// Render job polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct RenderSettings {
    /// Sleep between poll rounds
    poll_interval_ms: u64,
    /// Poll rounds before a batch times out
    max_poll_rounds: u32,
    /// Poll attempts before a single job times out
    max_poll_attempts: u32,
    /// Pause between consecutive submissions
    submit_delay_ms: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            max_poll_rounds: 90,
            max_poll_attempts: 60,
            submit_delay_ms: 0,
        }
    }
}

impl RenderSettings {
    /// Settings from explicit values.
    pub fn new(
        poll_interval_ms: u64,
        max_poll_rounds: u32,
        max_poll_attempts: u32,
        submit_delay_ms: u64,
    ) -> Self {
        Self {
            poll_interval_ms,
            max_poll_rounds,
            max_poll_attempts,
            submit_delay_ms,
        }
    }

    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Submission pause as a duration.
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

/// Backoff settings for rate-limited calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct BackoffSettings {
    /// First retry delay
    initial_delay_ms: u64,
    /// Retries after the first attempt
    max_retries: usize,
    /// Upper bound on any single delay
    max_delay_secs: u64,
    /// Randomize delays
    jitter: bool,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_retries: 5,
            max_delay_secs: 60,
            jitter: false,
        }
    }
}

/// Collaborator endpoints and model names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct ModelSettings {
    /// Text model identifier
    text_model: String,
    /// OpenAI-compatible API base URL
    openai_base_url: String,
    /// Render service REST base URL
    placid_base_url: String,
    /// Background removal endpoint
    removebg_url: String,
    /// Per-request HTTP timeout
    request_timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            text_model: "gpt-5.1".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            placid_base_url: "https://api.placid.app/api/rest".to_string(),
            removebg_url: "https://api.remove.bg/v1.0/removebg".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Complete Tessera settings.
///
/// # Examples
///
/// ```
/// use tessera_rate_limit::TesseraConfig;
///
/// let config = TesseraConfig::from_toml_str("[render]\npoll_interval_ms = 500\n").unwrap();
/// assert_eq!(*config.render().poll_interval_ms(), 500);
/// // Unset keys keep their defaults
/// assert_eq!(*config.pipeline().max_stage_retries(), 2);
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_getters::Getters,
)]
#[serde(default)]
pub struct TesseraConfig {
    /// Text pipeline settings
    pipeline: PipelineSettings,
    /// Render polling settings
    render: RenderSettings,
    /// Backoff for rate-limited calls
    backoff: BackoffSettings,
    /// Collaborator endpoints
    models: ModelSettings,
}

impl TesseraConfig {
    /// Load configuration from all layers.
    ///
    /// Precedence (highest first): `TESSERA_*` environment variables,
    /// `./tessera.toml`, `~/.config/tessera/tessera.toml`, bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a present file is malformed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tessera_rate_limit::TesseraConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = TesseraConfig::load()?;
    /// println!("Polling every {}ms", config.render().poll_interval_ms());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument]
    pub fn load() -> TesseraResult<Self> {
        Self::load_with(None)
    }

    /// Load configuration, adding `path` as the highest-precedence file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `path` is missing or any present file is malformed.
    #[instrument]
    pub fn load_with(path: Option<&Path>) -> TesseraResult<Self> {
        debug!("Loading configuration with precedence: env > explicit > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(config_dir) = dirs::config_dir() {
            let home_config = config_dir.join("tessera/tessera.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("tessera").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("TESSERA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(builder)
    }

    /// Defaults overlaid with a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the string is malformed.
    pub fn from_toml_str(toml: &str) -> TesseraResult<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml));
        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> TesseraResult<Self> {
        builder
            .build()
            .map_err(|e| {
                TesseraError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                TesseraError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Replace the render settings.
    pub fn with_render(mut self, render: RenderSettings) -> Self {
        self.render = render;
        self
    }

    /// Replace the pipeline settings.
    pub fn with_pipeline(mut self, pipeline: PipelineSettings) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Replace the backoff settings.
    pub fn with_backoff(mut self, backoff: BackoffSettings) -> Self {
        self.backoff = backoff;
        self
    }
}

impl BackoffSettings {
    /// Settings from explicit values.
    pub fn new(initial_delay_ms: u64, max_retries: usize, max_delay_secs: u64, jitter: bool) -> Self {
        Self {
            initial_delay_ms,
            max_retries,
            max_delay_secs,
            jitter,
        }
    }
}
