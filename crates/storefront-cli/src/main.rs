//! Storefront CLI: upload feature images and inspect the feature list.
//!
//! Configuration comes from the environment (or `.env`): STOREFRONT_API_URL,
//! OBJECT_STORE_BACKEND and the settings of the chosen backend.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use storefront_cli::{format_feature_table, init_tracing, IngestReport};
use storefront_core::{CandidateFile, Config, FileSource, IngestionState};
use storefront_ingest::IngestPipeline;

#[derive(Parser)]
#[command(name = "storefront", about = "Storefront feature image CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and save its reference with the backend
    Ingest {
        /// Path to the image to upload
        file: PathBuf,
        /// Deliver the file as a drag-and-drop instead of a picker selection
        #[arg(long)]
        drop: bool,
        /// Add the uploaded image to the feature list
        #[arg(long)]
        commit: bool,
    },
    /// List the feature images
    Features {
        /// Print a table instead of JSON
        #[arg(long)]
        table: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    let IngestPipeline {
        controller,
        mut registry,
        ..
    } = IngestPipeline::from_config(&config).await?;

    match cli.command {
        Commands::Ingest { file, drop, commit } => {
            let candidate = CandidateFile::from_path(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let source = if drop {
                FileSource::Drop(vec![candidate])
            } else {
                FileSource::Picker(vec![candidate])
            };

            let task = controller.select_file(source)?;
            let state = tokio::select! {
                state = task.wait() => state,
                _ = tokio::signal::ctrl_c() => {
                    tracing::warn!("Interrupted, cancelling upload");
                    controller.cancel().ok();
                    IngestionState::Cancelled
                }
            };

            let mut report = IngestReport {
                file: file.display().to_string(),
                state: state.clone(),
                commit: None,
                commit_error: None,
            };
            if commit && state.confirmed_url().is_some() {
                match registry.commit(&controller).await {
                    Ok(outcome) => report.commit = Some(outcome),
                    Err(e) => report.commit_error = Some(e.to_string()),
                }
            } else if commit {
                tracing::warn!(file = %file.display(), "Upload not confirmed, skipping commit");
            }
            print_json(&report)?;

            if let Some(message) = state.error_message() {
                anyhow::bail!("{}", message);
            }
            if let Some(message) = report.commit_error {
                anyhow::bail!("{}", message);
            }
        }
        Commands::Features { table } => {
            let assets = registry.refresh().await?;
            if table {
                print!("{}", format_feature_table(assets));
            } else {
                print_json(&assets)?;
            }
        }
    }

    Ok(())
}
