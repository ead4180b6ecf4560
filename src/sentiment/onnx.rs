// Local ONNX sentiment classifier.
//
// Runs a multilingual three-class sentiment model (XLM-RoBERTa fine-tuned on
// social media posts) on the local CPU. No network calls and no rate limits.
//
// Output: 3 logits in the order negative, neutral, positive, turned into a
// probability distribution with softmax.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::model::{MODEL_FILE, TOKENIZER_FILE};
use super::traits::{ClassifierError, SentimentClassifier, SentimentScores};

/// Labels output by the model, in the order the model returns them.
const LABEL_ORDER: [&str; 3] = ["negative", "neutral", "positive"];

/// Longest token sequence the model accepts.
const MAX_SEQUENCE_LEN: usize = 512;

/// XLM-RoBERTa pad token id.
const PAD_TOKEN_ID: i64 = 1;

/// Local ONNX-based sentiment classifier. Session and tokenizer sit behind
/// Arc so inference can be moved onto spawn_blocking.
pub struct OnnxSentimentClassifier {
    // ort::Session::run takes &mut self, hence the Mutex.
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxSentimentClassifier {
    /// Load the ONNX model and tokenizer from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        if !model_path.exists() {
            anyhow::bail!(
                "Model file not found: {}\nExport the sentiment model to ONNX and place it there, \
                 or set SANCTUARY_MODEL_DIR.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Tokenizer file not found: {}\nPlace the model's tokenizer.json next to {}.",
                tokenizer_path.display(),
                MODEL_FILE
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

        debug!("Loaded ONNX sentiment model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }
}

#[async_trait]
impl SentimentClassifier for OnnxSentimentClassifier {
    async fn analyze(&self, text: &str) -> Result<SentimentScores, ClassifierError> {
        let mut results = self.analyze_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| ClassifierError::InvalidOutput("empty result batch".to_string()))
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn device(&self) -> String {
        "cpu".to_string()
    }

    /// Tokenize all texts, run one forward pass, apply softmax per row.
    async fn analyze_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<SentimentScores>, ClassifierError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let texts = texts.to_vec();

        let logits =
            tokio::task::spawn_blocking(move || run_inference(&session, &tokenizer, &texts))
                .await
                .context("spawn_blocking panicked")??;

        let results: Vec<SentimentScores> = logits
            .chunks(LABEL_ORDER.len())
            .map(|row| map_probabilities(&softmax(row)))
            .collect();

        if let Some(bad) = results.iter().find(|s| !s.is_well_formed()) {
            return Err(ClassifierError::InvalidOutput(format!("{bad:?}")));
        }
        Ok(results)
    }
}

/// Tokenize, pad and run the model. Returns the flat `[batch, 3]` logits.
fn run_inference(
    session: &Mutex<Session>,
    tokenizer: &Tokenizer,
    texts: &[String],
) -> Result<Vec<f32>> {
    let encodings: Vec<_> = texts
        .iter()
        .map(|t| {
            tokenizer
                .encode(t.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch_size = encodings.len();
    let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);

    // Shape: [batch_size, max_len], right-padded
    let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

    for enc in &encodings {
        let ids = enc.get_ids();
        input_ids_flat.extend(ids.iter().map(|&id| id as i64));
        attention_mask_flat.extend(enc.get_attention_mask().iter().map(|&m| m as i64));

        for _ in ids.len()..max_len {
            input_ids_flat.push(PAD_TOKEN_ID);
            attention_mask_flat.push(0);
        }
    }

    let shape = [batch_size as i64, max_len as i64];
    let input_ids_tensor = Tensor::from_array((shape, input_ids_flat))
        .context("Failed to create input_ids tensor")?;
    let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat))
        .context("Failed to create attention_mask tensor")?;

    let mut session = session
        .lock()
        .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

    let outputs = session
        .run(ort::inputs! {
            "input_ids" => input_ids_tensor,
            "attention_mask" => attention_mask_tensor
        })
        .context("ONNX inference failed")?;

    let (_shape, data) = outputs[0]
        .try_extract_tensor::<f32>()
        .context("Failed to extract output tensor")?;

    if data.len() != batch_size * LABEL_ORDER.len() {
        anyhow::bail!(
            "Expected {} logits, model returned {}",
            batch_size * LABEL_ORDER.len(),
            data.len()
        );
    }
    Ok(data.to_vec())
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&l| (l as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Map probabilities in LABEL_ORDER to named scores.
fn map_probabilities(probs: &[f64]) -> SentimentScores {
    SentimentScores {
        negative: probs[0],
        neutral: probs[1],
        positive: probs[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_equal_logits() {
        let probs = softmax(&[0.0, 0.0, 0.0]);
        for p in probs {
            assert!((p - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_softmax_large_logits_stay_finite() {
        let probs = softmax(&[1000.0, 0.0, -1000.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!((probs[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_probabilities_follows_label_order() {
        let scores = map_probabilities(&[0.1, 0.2, 0.7]);
        assert_eq!(scores, SentimentScores::new(0.7, 0.1, 0.2));
    }

    #[test]
    fn test_load_reports_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxSentimentClassifier::load(dir.path()).err().unwrap();
        assert!(err.to_string().contains("Model file not found"));
    }
}
