//! frontdoor-policy-eval
//!
//! Computes the rollout policy for one front-end workload snapshot and
//! prints the resulting Deployment, the way the reconciler would write it.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use frontdoor_labels::GenerationHash;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod input;

use config::Config;
use input::{evaluate, InputDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

/// Evaluate the rollout policy for a front-end workload.
#[derive(Debug, Parser)]
#[command(name = "frontdoor-policy-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input document (YAML or JSON). Reads stdin when omitted or `-`.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Output format.
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Yaml)]
    output: OutputFormat,

    /// Generation hash of the pod template; overrides the document's.
    #[arg(long, env = "FRONTDOOR_GENERATION_HASH")]
    hash: Option<GenerationHash>,
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut contents = String::new();
            std::io::stdin()
                .read_to_string(&mut contents)
                .context("failed to read stdin")?;
            Ok(contents)
        }
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            config
                .log_json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!config.log_json)
                .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config);

    debug!(
        deployment_label = %config.label_keys.deployment,
        hash_label = %config.label_keys.generation_hash,
        "Loaded configuration"
    );

    let contents = read_input(cli.input.as_ref())?;
    let doc = InputDocument::parse(&contents)?;
    let evaluation = evaluate(doc, &config.label_keys, cli.hash)?;

    let rendered = match cli.output {
        OutputFormat::Yaml => serde_yaml::to_string(&evaluation)?,
        OutputFormat::Json => serde_json::to_string_pretty(&evaluation)?,
    };
    println!("{rendered}");

    Ok(())
}
