use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::decision::{
    Thresholds, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_SENTIMENT_APPROVAL_THRESHOLD,
};

/// Which sentiment classifier backend to use.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierBackend {
    /// Local ONNX model (default)
    Onnx,
    /// No model. Every non-blank, non-denylisted text is rejected with a
    /// system error; useful for exercising the lexicon on its own.
    None,
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
pub struct Config {
    /// Which classifier to use (default: Onnx)
    pub classifier_backend: ClassifierBackend,
    /// Directory containing the ONNX model files
    pub model_dir: PathBuf,
    /// Optional JSON file with extra `negative_words`
    pub lexicon_path: Option<PathBuf>,
    /// Thresholds the service starts with
    pub thresholds: Thresholds,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let classifier_backend = match env::var("SANCTUARY_CLASSIFIER").as_deref() {
            Ok("none") => ClassifierBackend::None,
            // "onnx" or unset both default to ONNX
            _ => ClassifierBackend::Onnx,
        };

        let model_dir = env::var("SANCTUARY_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::sentiment::model::default_model_dir());

        let lexicon_path = env::var("SANCTUARY_LEXICON_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let thresholds = Thresholds {
            sentiment_approval_threshold: threshold_var(
                "SANCTUARY_SENTIMENT_THRESHOLD",
                DEFAULT_SENTIMENT_APPROVAL_THRESHOLD,
            )?,
            confidence_threshold: threshold_var(
                "SANCTUARY_CONFIDENCE_THRESHOLD",
                DEFAULT_CONFIDENCE_THRESHOLD,
            )?,
        };

        Ok(Self {
            classifier_backend,
            model_dir,
            lexicon_path,
            thresholds,
        })
    }

    /// Validate that the chosen classifier backend has what it needs.
    pub fn require_classifier(&self) -> Result<()> {
        match self.classifier_backend {
            ClassifierBackend::Onnx => {
                if !crate::sentiment::model::model_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "ONNX sentiment model not found in {}\n\
                         Place model.onnx and tokenizer.json there or set SANCTUARY_MODEL_DIR.\n\
                         Or set SANCTUARY_CLASSIFIER=none to run with the lexicon only.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
            ClassifierBackend::None => Ok(()),
        }
    }
}

/// Read a threshold from the environment, falling back to `default` when
/// unset. A set but unparsable or out-of-range value is an error.
fn threshold_var(name: &str, default: f64) -> Result<f64> {
    match env::var(name) {
        Ok(raw) => parse_threshold(&raw).with_context(|| format!("Invalid {name}")),
        Err(_) => Ok(default),
    }
}

fn parse_threshold(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("`{raw}` is not a number"))?;
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        anyhow::bail!("{value} is outside 0.0..=1.0");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold_accepts_unit_range() {
        assert_eq!(parse_threshold("0.75").unwrap(), 0.75);
        assert_eq!(parse_threshold(" 1 ").unwrap(), 1.0);
        assert_eq!(parse_threshold("0").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_threshold_rejects_garbage() {
        assert!(parse_threshold("high").is_err());
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("-0.1").is_err());
        assert!(parse_threshold("NaN").is_err());
    }

    #[test]
    fn test_require_classifier_none_backend_always_ok() {
        let config = Config {
            classifier_backend: ClassifierBackend::None,
            model_dir: PathBuf::from("/nonexistent"),
            lexicon_path: None,
            thresholds: Thresholds::default(),
        };
        assert!(config.require_classifier().is_ok());
    }

    #[test]
    fn test_require_classifier_onnx_needs_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            classifier_backend: ClassifierBackend::Onnx,
            model_dir: dir.path().to_path_buf(),
            lexicon_path: None,
            thresholds: Thresholds::default(),
        };
        let err = config.require_classifier().unwrap_err();
        assert!(err.to_string().contains("sentiment model not found"));
    }
}
