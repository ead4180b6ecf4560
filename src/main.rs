use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use sanctuary_review::config::{ClassifierBackend, Config};
use sanctuary_review::lexicon::Lexicon;
use sanctuary_review::moderation::ModerationService;
use sanctuary_review::output::terminal;
use sanctuary_review::sentiment::onnx::OnnxSentimentClassifier;
use sanctuary_review::sentiment::{NotLoadedClassifier, SentimentClassifier};

/// Sanctuary Review: automated pre-publication moderation for short posts.
///
/// Combines a sentiment classifier with a denylist lexicon to approve or
/// reject text, with a confidence score and human-readable reasons.
#[derive(Parser)]
#[command(name = "sanctuary", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Moderate a single text
    Check {
        /// The text to moderate
        text: String,
    },

    /// Moderate every non-blank line of a file
    Batch {
        /// Path to a UTF-8 text file, one submission per line
        file: PathBuf,
    },

    /// Show classifier readiness, thresholds and lexicon size
    Status,

    /// Inspect the denylist lexicon
    Lexicon {
        /// Add terms for this run before listing or testing (repeatable)
        #[arg(long = "add", value_name = "TERM")]
        add: Vec<String>,

        /// Print every term
        #[arg(long)]
        list: bool,

        /// Show which terms match this text
        #[arg(long)]
        test: Option<String>,
    },

    /// Start the HTTP API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: 8000)
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("sanctuary_review=info,sanctuary=info")
            }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { text } => {
            let config = Config::load()?;
            config.require_classifier()?;
            let service = build_service(&config)?;

            let report = service.moderate_detailed(&text).await;
            terminal::display_report(&text, &report);
        }

        Commands::Batch { file } => {
            let config = Config::load()?;
            config.require_classifier()?;
            let service = build_service(&config)?;

            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let texts: Vec<String> = raw
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect();

            if texts.is_empty() {
                println!("No texts found in {}", file.display());
                return Ok(());
            }

            info!(count = texts.len(), "Moderating batch");
            let batch = service.moderate_batch(&texts).await;
            terminal::display_batch(&texts, &batch);
        }

        Commands::Status => {
            let config = Config::load()?;
            let service = build_service(&config)?;
            terminal::display_status(&service.status().await);
        }

        Commands::Lexicon { add, list, test } => {
            let config = Config::load()?;
            let mut lexicon = Lexicon::with_source(config.lexicon_path.as_deref());

            if !add.is_empty() {
                let added = add_terms(&mut lexicon, &add);
                println!("Added {} of {} terms", added.len(), add.len());
                for term in &added {
                    println!("  {} {term}", "+".green());
                }
            }

            println!("Lexicon: {} terms", lexicon.count());
            if list {
                for term in lexicon.terms() {
                    println!("  {term}");
                }
            }
            if let Some(text) = test {
                let result = lexicon.detect(&text);
                if result.matched {
                    println!(
                        "{} {}",
                        "Matched:".red().bold(),
                        result.sorted_terms().join(", ")
                    );
                } else {
                    println!("{}", "No denylist terms matched.".green());
                }
            }
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_classifier()?;
            let service = build_service(&config)?;
            sanctuary_review::web::run_server(service, port, &bind).await?;
        }
    }

    Ok(())
}

/// Add each term in turn, returning the ones that were new.
fn add_terms(lexicon: &mut Lexicon, terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .filter(|term| lexicon.add(term))
        .map(|term| term.trim().to_string())
        .collect()
}

/// Construct the moderation service once, from configuration.
///
/// With the ONNX backend selected but no model on disk, the service still
/// starts, reporting the classifier as not loaded.
fn build_service(config: &Config) -> Result<Arc<ModerationService>> {
    let lexicon = Lexicon::with_source(config.lexicon_path.as_deref());

    let classifier: Arc<dyn SentimentClassifier> = match config.classifier_backend {
        ClassifierBackend::Onnx
            if sanctuary_review::sentiment::model::model_files_present(&config.model_dir) =>
        {
            info!("Loading ONNX sentiment model from {}", config.model_dir.display());
            Arc::new(OnnxSentimentClassifier::load(&config.model_dir)?)
        }
        ClassifierBackend::Onnx => {
            warn!(
                "ONNX model not found in {}; classifier not loaded",
                config.model_dir.display()
            );
            Arc::new(NotLoadedClassifier)
        }
        ClassifierBackend::None => Arc::new(NotLoadedClassifier),
    };

    Ok(Arc::new(ModerationService::new(
        classifier,
        lexicon,
        config.thresholds,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicon_add_flag_parses_repeated_terms() {
        let args = [
            "sanctuary",
            "lexicon",
            "--add",
            "troll",
            "--add",
            "jerk",
            "--list",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Lexicon { add, list, test } => {
                assert_eq!(add, vec!["troll", "jerk"]);
                assert!(list);
                assert!(test.is_none());
            }
            _ => panic!("expected the lexicon subcommand"),
        }
    }

    #[test]
    fn test_added_terms_are_matched() {
        let mut lexicon = Lexicon::new();
        let terms = vec![" troll ".to_string(), "troll".to_string(), "死ね".to_string()];
        let added = add_terms(&mut lexicon, &terms);
        assert_eq!(added, vec!["troll"]);
        assert_eq!(lexicon.detect("you troll").sorted_terms(), vec!["troll"]);
    }
}
