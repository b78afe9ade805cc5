//! Tessera CLI binary.
//!
//! This binary provides command-line access to Tessera's functionality:
//! - Generate and render batches of creatives from a template
//! - Run the staged text pipeline on its own
//! - Validate tab-separated tables
//! - List built-in templates and generators

use clap::Parser;
use tessera::{ObservabilityConfig, TesseraConfig, init_observability_with_config};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{
        Cli, Commands, list_generators, list_templates, run_generate, run_text, run_validate,
    };

    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut observability = ObservabilityConfig::default()
        .with_json_logs(cli.json_logs)
        .with_stdout_spans(cli.trace_spans);
    if cli.verbose {
        observability = observability.with_log_level("debug");
    }
    init_observability_with_config(observability)?;

    // Execute the requested command
    match cli.command {
        Commands::Generate(args) => {
            let config = TesseraConfig::load_with(cli.config.as_deref())?;
            run_generate(&args, &config).await?;
        }

        Commands::Text(args) => {
            let config = TesseraConfig::load_with(cli.config.as_deref())?;
            run_text(&args, &config).await?;
        }

        Commands::Validate {
            file,
            count,
            paired,
        } => {
            run_validate(&file, count, paired)?;
        }

        Commands::Templates => {
            list_templates()?;
        }

        Commands::Generators => {
            list_generators()?;
        }
    }

    Ok(())
}
