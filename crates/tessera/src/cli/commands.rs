//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tessera::{BuilderError, JsonMap, TesseraResult, Topic};

/// Tessera - config-driven generation of rendered marketing creatives
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(about = "Config-driven generation of rendered marketing creatives", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Print finished spans via the OpenTelemetry stdout exporter (needs the
    /// otel feature)
    #[arg(long, global = true)]
    pub trace_spans: bool,

    /// Settings file layered over the user config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and render a batch of creatives
    Generate(GenerateArgs),

    /// Run the staged text pipeline and print the final table
    Text(TextArgs),

    /// Check a tab-separated table file
    Validate {
        /// Table file to check
        #[arg(long)]
        file: PathBuf,

        /// Expected number of rows
        #[arg(long, default_value = "12")]
        count: usize,

        /// Expect header and main text columns
        #[arg(long)]
        paired: bool,
    },

    /// List built-in templates
    Templates,

    /// List registered generators
    Generators,
}

/// Topic fields shared by generating commands.
#[derive(Args, Debug, Clone)]
pub struct TopicArgs {
    /// Topic name (e.g. "Wireless Earbuds")
    #[arg(long)]
    pub topic: String,

    /// Sales event
    #[arg(long)]
    pub event: Option<String>,

    /// Discount wording
    #[arg(long)]
    pub discount: Option<String>,

    /// Landing page type ("general" or "category")
    #[arg(long)]
    pub page_type: Option<String>,

    /// Page the topic came from
    #[arg(long)]
    pub source_url: Option<String>,
}

impl TopicArgs {
    /// Build the topic, leaving unset fields at their defaults.
    pub fn to_topic(&self) -> TesseraResult<Topic> {
        let mut builder = Topic::builder();
        builder.name(self.topic.as_str());
        if let Some(event) = &self.event {
            builder.event(event.as_str());
        }
        if let Some(discount) = &self.discount {
            builder.discount(discount.as_str());
        }
        if let Some(page_type) = &self.page_type {
            builder.page_type(page_type.as_str());
        }
        if let Some(source_url) = &self.source_url {
            builder.source_url(source_url.as_str());
        }
        Ok(builder
            .build()
            .map_err(|e| BuilderError::from(e.to_string()))?)
    }
}

/// Arguments of `tessera generate`.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Template file, or the name of a built-in template
    #[arg(long)]
    pub template: String,

    #[command(flatten)]
    pub topic: TopicArgs,

    /// Number of creatives
    #[arg(long, default_value = "12")]
    pub count: usize,

    /// Generator input as key=value (value parsed as JSON when possible)
    #[arg(long = "input", value_parser = parse_key_value)]
    pub inputs: Vec<(String, Value)>,

    /// Processing option as key=value (e.g. remove_bg=false)
    #[arg(long = "option", value_parser = parse_key_value)]
    pub options: Vec<(String, Value)>,

    /// Render template override as label=template_id
    #[arg(long = "template-id", value_parser = parse_template_id)]
    pub template_ids: Vec<(String, String)>,

    /// Directory of prompt overrides
    #[arg(long)]
    pub prompts: Option<PathBuf>,

    /// Print the property maps instead of rendering
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments of `tessera text`.
#[derive(Args, Debug, Clone)]
pub struct TextArgs {
    #[command(flatten)]
    pub topic: TopicArgs,

    /// Number of rows
    #[arg(long, default_value = "12")]
    pub count: usize,

    /// Produce header and main text pairs
    #[arg(long)]
    pub paired: bool,

    /// Product names to mention (repeatable)
    #[arg(long = "product")]
    pub products: Vec<String>,

    /// Product page URLs to look product names up from (repeatable; ignored
    /// when --product is given)
    #[arg(long = "product-url")]
    pub product_urls: Vec<String>,

    /// Directory of prompt overrides
    #[arg(long)]
    pub prompts: Option<PathBuf>,
}

/// Parse `key=value`; the value is read as JSON, falling back to a string.
pub fn parse_key_value(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Parse `label=template_id`, keeping the id verbatim.
pub fn parse_template_id(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((label, id)) if !label.trim().is_empty() && !id.trim().is_empty() => {
            Ok((label.trim().to_string(), id.trim().to_string()))
        }
        _ => Err(format!("expected label=template_id, got '{}'", raw)),
    }
}

/// Collect parsed pairs into a JSON object; later keys win.
pub fn to_json_map(pairs: &[(String, Value)]) -> JsonMap {
    pairs.iter().cloned().collect()
}
