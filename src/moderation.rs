// Moderation service: wires the lexicon and the sentiment classifier into
// the decision engine and owns the mutable configuration.
//
// Constructed once at startup and shared as Arc<ModerationService>. The
// lexicon and thresholds sit behind RwLocks: moderation takes read locks,
// `add_term` and `update_thresholds` take write locks. Each request reads a
// thresholds snapshot up front, so an update only affects later requests.
//
// `moderate` never fails. Classifier faults turn into the safe-default
// rejection, matcher faults into "no match".

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::decision::{self, Thresholds, Verdict};
use crate::lexicon::Lexicon;
use crate::output::truncate_chars;
use crate::sentiment::{ClassifierError, SentimentClassifier, SentimentScores};

/// A verdict plus the signals that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationReport {
    pub verdict: Verdict,
    /// Absent when the classifier was skipped (blank text, lexical veto) or failed.
    pub sentiment: Option<SentimentScores>,
    /// Matched denylist terms, sorted.
    pub negative_words: Vec<String>,
    pub processing_time_ms: f64,
    pub checked_at: String,
}

/// Results for several texts, in input order, with totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<ModerationReport>,
    pub total_count: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub total_processing_time_ms: f64,
}

/// Partial threshold update; `None` fields keep their current value.
/// Unknown field names are an error rather than a silent no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdUpdate {
    pub sentiment_approval_threshold: Option<f64>,
    pub confidence_threshold: Option<f64>,
}

/// Read-only snapshot for status endpoints and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub classifier_ready: bool,
    pub thresholds: Thresholds,
    pub lexicon_size: usize,
    pub compute_device: String,
}

pub struct ModerationService {
    classifier: Arc<dyn SentimentClassifier>,
    lexicon: RwLock<Lexicon>,
    thresholds: RwLock<Thresholds>,
}

impl ModerationService {
    pub fn new(
        classifier: Arc<dyn SentimentClassifier>,
        lexicon: Lexicon,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            classifier,
            lexicon: RwLock::new(lexicon),
            thresholds: RwLock::new(thresholds),
        }
    }

    /// Moderate one text and return only the verdict.
    pub async fn moderate(&self, text: &str) -> Verdict {
        self.moderate_detailed(text).await.verdict
    }

    /// Moderate one text: blank check, lexicon scan, sentiment, decision.
    pub async fn moderate_detailed(&self, text: &str) -> ModerationReport {
        let started = Instant::now();

        if text.trim().is_empty() {
            return report(Verdict::empty_submission(), None, Vec::new(), started);
        }

        let thresholds = *self.thresholds.read().await;
        let matches = self.lexicon.read().await.detect(text);
        let negative_words = matches.sorted_terms();

        // A lexical match decides on its own; skip inference.
        if let Some(verdict) = decision::lexical_veto(&matches) {
            log_outcome(&verdict, None, negative_words.len());
            return report(verdict, None, negative_words, started);
        }

        let scores = match self.classify(text).await {
            Ok(scores) => scores,
            Err(e) => {
                error!(
                    error = %e,
                    text_preview = %truncate_chars(text, 30),
                    "Sentiment classification failed; rejecting with system error"
                );
                return report(Verdict::system_error(), None, negative_words, started);
            }
        };

        let verdict = decision::decide(&scores, &matches, &thresholds);
        log_outcome(&verdict, Some(&scores), negative_words.len());
        debug!(text_preview = %truncate_chars(text, 50), "Moderated text");
        report(verdict, Some(scores), negative_words, started)
    }

    /// Moderate each text in turn. Results keep input order.
    pub async fn moderate_batch(&self, texts: &[String]) -> BatchReport {
        let started = Instant::now();
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.moderate_detailed(text).await);
        }

        let approved_count = results.iter().filter(|r| r.verdict.approved).count();
        BatchReport {
            total_count: results.len(),
            approved_count,
            rejected_count: results.len() - approved_count,
            results,
            total_processing_time_ms: elapsed_ms(started),
        }
    }

    /// Apply a partial threshold update. Out-of-range or non-finite values
    /// reject the whole update and leave the thresholds unchanged.
    pub async fn update_thresholds(&self, update: ThresholdUpdate) -> Result<Thresholds> {
        for (name, value) in [
            ("sentiment_approval_threshold", update.sentiment_approval_threshold),
            ("confidence_threshold", update.confidence_threshold),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                    anyhow::bail!("{name} must be between 0.0 and 1.0, got {v}");
                }
            }
        }

        let mut thresholds = self.thresholds.write().await;
        let previous = *thresholds;
        if let Some(v) = update.sentiment_approval_threshold {
            thresholds.sentiment_approval_threshold = v;
        }
        if let Some(v) = update.confidence_threshold {
            thresholds.confidence_threshold = v;
        }
        info!(
            old_sentiment = previous.sentiment_approval_threshold,
            new_sentiment = thresholds.sentiment_approval_threshold,
            old_confidence = previous.confidence_threshold,
            new_confidence = thresholds.confidence_threshold,
            "Updated thresholds"
        );
        Ok(*thresholds)
    }

    pub async fn thresholds(&self) -> Thresholds {
        *self.thresholds.read().await
    }

    /// Add a denylist term. Returns `true` if it was new.
    pub async fn add_term(&self, term: &str) -> bool {
        self.lexicon.write().await.add(term)
    }

    /// All denylist terms, sorted.
    pub async fn lexicon_terms(&self) -> Vec<String> {
        self.lexicon.read().await.terms().map(str::to_string).collect()
    }

    pub async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            classifier_ready: self.classifier.is_ready(),
            thresholds: *self.thresholds.read().await,
            lexicon_size: self.lexicon.read().await.count(),
            compute_device: self.classifier.device(),
        }
    }

    /// Run the classifier and refuse scores the decision engine can't use.
    async fn classify(&self, text: &str) -> Result<SentimentScores, ClassifierError> {
        let scores = self.classifier.analyze(text).await?;
        if !scores.is_well_formed() {
            return Err(ClassifierError::InvalidOutput(format!("{scores:?}")));
        }
        Ok(scores)
    }
}

fn report(
    verdict: Verdict,
    sentiment: Option<SentimentScores>,
    negative_words: Vec<String>,
    started: Instant,
) -> ModerationReport {
    ModerationReport {
        verdict,
        sentiment,
        negative_words,
        processing_time_ms: elapsed_ms(started),
        checked_at: Utc::now().to_rfc3339(),
    }
}

fn log_outcome(verdict: &Verdict, scores: Option<&SentimentScores>, matched: usize) {
    info!(
        approved = verdict.approved,
        confidence = verdict.confidence_score,
        positive = ?scores.map(|s| s.positive),
        negative_words = matched,
        "Moderation complete"
    );
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
