// Sentilearn command-line entry point.
// Thin wrapper over the engine: every subcommand reads JSON files and prints JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sentilearn_core::config::EngineConfig;
use sentilearn_core::engine::SentimentEngine;
use sentilearn_core::evaluation::{compare_models, ModelComparison};
use sentilearn_core::logging::{init_tracing, LogFormat};
use sentilearn_core::models::{AnalysisInput, FeedbackInput, TrainingExample};
use sentilearn_core::store::ModelStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sentilearn")]
#[command(version, about = "Hybrid sentiment classification with feedback learning", long_about = None)]
struct Cli {
    /// Engine configuration JSON (defaults to SENTIMENT_* environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model snapshot to load and update
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one text, or a JSON array of {id?, text, language?}
    Analyze {
        /// Text to analyze
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Language hint (e.g. en, es, pt-BR)
        #[arg(long)]
        lang: Option<String>,

        /// Batch input file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Train on a JSON array of {text, label}
    Train {
        file: PathBuf,
    },

    /// Evaluate all methods on a labeled JSON dataset
    Evaluate {
        file: PathBuf,

        /// Also write the report under the data directory
        #[arg(long)]
        save: bool,
    },

    /// Compare a JSON array of {name, predictions}
    Compare {
        file: PathBuf,
    },

    /// Submit a JSON array of {text, actualLabel} and retrain
    Feedback {
        file: PathBuf,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::from_env()?,
    };
    if let Some(model) = &cli.model {
        config.model_path = Some(model.clone());
    }
    if config.model_path.is_none() {
        config.model_path = Some(ModelStore::default().snapshot_path("default"));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(LogFormat::from_env());

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let engine = Arc::new(SentimentEngine::new(config)?);
    info!("Running command {:?}", cli.command);

    match cli.command {
        Commands::Analyze { text, lang, file } => match (file, text) {
            (Some(file), _) => {
                let inputs: Vec<AnalysisInput> = read_json(&file)?;
                let outcome = engine.clone().analyze_batch(inputs).await;
                print_json(&outcome)?;
            }
            (None, Some(text)) => print_json(&engine.analyze(&text, lang.as_deref()))?,
            (None, None) => anyhow::bail!("analyze needs a text or --file"),
        },
        Commands::Train { file } => {
            let examples: Vec<TrainingExample> = read_json(&file)?;
            let version = engine.train(&examples)?;
            println!("Trained model v{} on {} examples", version, examples.len());
        }
        Commands::Evaluate { file, save } => {
            let examples: Vec<TrainingExample> = read_json(&file)?;
            let report = engine.evaluate_dataset(&examples)?;
            if save {
                let path = ModelStore::default().save_report(&report.report_id.to_string(), &report)?;
                info!("Report saved to {:?}", path);
            }
            print_json(&report)?;
        }
        Commands::Compare { file } => {
            let models: Vec<ModelComparison> = read_json(&file)?;
            print_json(&compare_models(&models)?)?;
        }
        Commands::Feedback { file } => {
            let inputs: Vec<FeedbackInput> = read_json(&file)?;
            print_json(&engine.provide_feedback_batch(inputs)?)?;
        }
    }

    Ok(())
}
