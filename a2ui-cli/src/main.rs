//! # a2ui CLI
//!
//! Operator tooling for A2UI message streams: replay a recorded stream
//! through the protocol engine and inspect the resulting surfaces, or
//! validate a stream without applying it.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use a2ui_core::{MessageProcessor, ProcessOptions};
use a2ui_types::Message;

#[derive(Parser)]
#[command(name = "a2ui")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON file of messages and print the resulting surfaces
    Replay {
        /// Path to a JSON array of messages
        file: PathBuf,

        /// Print full data models alongside surface summaries
        #[arg(long)]
        with_data: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Decode-check a JSON file of messages without applying them
    Validate {
        /// Path to a JSON array of messages
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::WARN.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Replay {
            file,
            with_data,
            json,
        } => replay(&file, with_data, json),
        Commands::Validate { file } => validate(&file),
    }
}

fn read_message_array(file: &Path) -> anyhow::Result<Vec<serde_json::Value>> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let parsed: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", file.display()))?;

    match parsed {
        serde_json::Value::Array(items) => Ok(items),
        // A single message object is accepted as a one-element stream.
        object @ serde_json::Value::Object(_) => Ok(vec![object]),
        _ => bail!("{} must contain a JSON array of messages", file.display()),
    }
}

fn replay(file: &Path, with_data: bool, json: bool) -> anyhow::Result<()> {
    let messages = read_message_array(file)?;

    let mut processor = MessageProcessor::new();
    let report = processor.process_json(&messages, ProcessOptions::default());
    let surfaces = processor.surfaces();

    if json {
        let mut output = serde_json::json!({
            "report": report,
            "surfaces": surfaces,
        });
        if with_data {
            let mut models = serde_json::Map::new();
            for surface in &surfaces {
                if let Some(model) = processor.manager().data_model(&surface.id) {
                    models.insert(surface.id.clone(), model.clone());
                }
            }
            output["dataModels"] = serde_json::Value::Object(models);
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "Processed {} messages: {} succeeded, {} failed",
        report.total, report.success, report.failed
    );
    for surface in &surfaces {
        println!(
            "  surface {} (root: {}, components: {})",
            surface.id, surface.root_component_id, surface.component_count
        );
        if with_data {
            if let Some(model) = processor.manager().data_model(&surface.id) {
                println!("    data: {}", serde_json::to_string(model)?);
            }
        }
    }

    if report.failed > 0 {
        bail!("{} of {} messages failed", report.failed, report.total);
    }
    Ok(())
}

fn validate(file: &Path) -> anyhow::Result<()> {
    let messages = read_message_array(file)?;

    let mut failures = 0usize;
    for (index, raw) in messages.iter().enumerate() {
        match Message::from_json(raw.clone()) {
            Ok(message) => {
                println!(
                    "  [{index}] {} (surface: {})",
                    message.kind().as_str(),
                    message.surface_id()
                );
            }
            Err(err) => {
                failures += 1;
                eprintln!("  [{index}] invalid: {err}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} messages are invalid", messages.len());
    }
    println!("All {} messages are valid", messages.len());
    Ok(())
}
