// Sentiment classifier trait: the narrow seam in front of the model.
//
// The decision policy only ever sees `SentimentScores`. The default
// implementation is a local ONNX model; tests substitute a deterministic stub.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Three-way sentiment distribution for one text. Values are expected to sum
/// to roughly 1.0, but that is the classifier's contract and is not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl SentimentScores {
    pub fn new(positive: f64, negative: f64, neutral: f64) -> Self {
        Self {
            positive,
            negative,
            neutral,
        }
    }

    /// All three values are finite and inside [0, 1].
    pub fn is_well_formed(&self) -> bool {
        [self.positive, self.negative, self.neutral]
            .iter()
            .all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("sentiment model is not loaded")]
    NotLoaded,

    #[error("classifier returned unusable scores: {0}")]
    InvalidOutput(String),

    #[error("sentiment inference failed: {0:#}")]
    Inference(#[from] anyhow::Error),
}

/// Classifies text sentiment. Async because inference is the one slow step
/// of a moderation request.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Score a single text.
    async fn analyze(&self, text: &str) -> Result<SentimentScores, ClassifierError>;

    /// Whether a model is loaded and `analyze` can succeed.
    fn is_ready(&self) -> bool;

    /// Where inference runs (e.g. "cpu").
    fn device(&self) -> String;

    /// Score multiple texts, returning results in the same order.
    /// Default implementation calls `analyze` sequentially.
    async fn analyze_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<SentimentScores>, ClassifierError> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.analyze(text).await?);
        }
        Ok(results)
    }
}

/// Stand-in used when no model is configured. Reports not-ready and refuses
/// every request, so moderation falls back to the safe-default rejection
/// instead of inventing scores.
pub struct NotLoadedClassifier;

#[async_trait]
impl SentimentClassifier for NotLoadedClassifier {
    async fn analyze(&self, _text: &str) -> Result<SentimentScores, ClassifierError> {
        Err(ClassifierError::NotLoaded)
    }

    fn is_ready(&self) -> bool {
        false
    }

    fn device(&self) -> String {
        "none".to_string()
    }
}
