// Decision engine: merges the lexicon and sentiment signals into a verdict.
//
// Priority order:
//   1. Lexical veto: any denylist match rejects with confidence 1.0.
//   2. Sentiment: reject if positive < approval threshold or negative > 0.5,
//      with confidence max(negative, 1 - positive).
//   3. Otherwise approve with confidence = positive. An approval below the
//      confidence threshold carries an advisory reason but is still an
//      approval. Callers must read `approved`, not the reason list.
//
// Everything here is pure: no I/O, no locks, no logging.

use serde::{Deserialize, Serialize};

use crate::lexicon::MatchResult;
use crate::sentiment::SentimentScores;

/// Negative score above which a post is always rejected.
pub const NEGATIVE_CEILING: f64 = 0.5;

pub const DEFAULT_SENTIMENT_APPROVAL_THRESHOLD: f64 = 0.6;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.8;

pub const REASON_EMPTY: &str = "empty submission";
pub const REASON_SYSTEM_ERROR: &str = "moderation system error";
pub const REASON_LOW_CONFIDENCE: &str = "approved at low confidence";

/// Tunable cut-offs read by every decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum positive score for approval.
    pub sentiment_approval_threshold: f64,
    /// Approvals below this confidence get an advisory reason.
    pub confidence_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            sentiment_approval_threshold: DEFAULT_SENTIMENT_APPROVAL_THRESHOLD,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Approved,
    Rejected,
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModerationStatus::Approved => write!(f, "approved"),
            ModerationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// The outcome of moderating one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub approved: bool,
    /// How strongly the evidence supports this verdict, 0.0 to 1.0.
    pub confidence_score: f64,
    pub rejection_reasons: Vec<String>,
}

impl Verdict {
    pub fn status(&self) -> ModerationStatus {
        if self.approved {
            ModerationStatus::Approved
        } else {
            ModerationStatus::Rejected
        }
    }

    /// Blank input: rejected before any signal is collected.
    pub fn empty_submission() -> Self {
        Self {
            approved: false,
            confidence_score: 1.0,
            rejection_reasons: vec![REASON_EMPTY.to_string()],
        }
    }

    /// A signal could not be produced. Zero confidence marks the rejection
    /// as a fallback rather than a judgement on the content.
    pub fn system_error() -> Self {
        Self {
            approved: false,
            confidence_score: 0.0,
            rejection_reasons: vec![REASON_SYSTEM_ERROR.to_string()],
        }
    }
}

/// Apply the full policy to one text's signals.
pub fn decide(
    scores: &SentimentScores,
    lexicon: &MatchResult,
    thresholds: &Thresholds,
) -> Verdict {
    match lexical_veto(lexicon) {
        Some(verdict) => verdict,
        None => evaluate_sentiment(scores, thresholds),
    }
}

/// Stage 1: a denylist match rejects outright, whatever the sentiment.
pub fn lexical_veto(lexicon: &MatchResult) -> Option<Verdict> {
    if !lexicon.matched {
        return None;
    }
    let terms = lexicon.sorted_terms().join(", ");
    Some(Verdict {
        approved: false,
        confidence_score: 1.0,
        rejection_reasons: vec![format!("negative words detected: {terms}")],
    })
}

/// Stage 2: sentiment thresholds.
pub fn evaluate_sentiment(scores: &SentimentScores, thresholds: &Thresholds) -> Verdict {
    let positive = scores.positive;
    let negative = scores.negative;
    let mut reasons = Vec::new();

    if positive < thresholds.sentiment_approval_threshold {
        reasons.push(format!(
            "positive score below threshold: {positive:.3} < {}",
            thresholds.sentiment_approval_threshold
        ));
    }
    if negative > NEGATIVE_CEILING {
        reasons.push(format!("negative score too high: {negative:.3}"));
    }

    if !reasons.is_empty() {
        return Verdict {
            approved: false,
            confidence_score: negative.max(1.0 - positive).clamp(0.0, 1.0),
            rejection_reasons: reasons,
        };
    }

    let confidence_score = positive.clamp(0.0, 1.0);
    if confidence_score < thresholds.confidence_threshold {
        reasons.push(REASON_LOW_CONFIDENCE.to_string());
    }
    Verdict {
        approved: true,
        confidence_score,
        rejection_reasons: reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn matched(terms: &[&str]) -> MatchResult {
        MatchResult::from_terms(terms.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>())
    }

    #[test]
    fn test_lexical_veto_joins_sorted_terms() {
        let verdict = lexical_veto(&matched(&["ゴミ", "クズ"])).unwrap();
        assert_eq!(
            verdict.rejection_reasons,
            vec!["negative words detected: クズ, ゴミ".to_string()]
        );
    }

    #[test]
    fn test_no_veto_without_match() {
        assert!(lexical_veto(&MatchResult::none()).is_none());
    }

    #[test]
    fn test_boundary_positive_equal_to_threshold_approves() {
        let thresholds = Thresholds::default();
        let verdict = evaluate_sentiment(&SentimentScores::new(0.6, 0.1, 0.3), &thresholds);
        assert!(verdict.approved);
        assert_eq!(verdict.rejection_reasons, vec![REASON_LOW_CONFIDENCE]);
    }

    #[test]
    fn test_boundary_negative_exactly_half_is_allowed() {
        let thresholds = Thresholds {
            sentiment_approval_threshold: 0.4,
            confidence_threshold: 0.0,
        };
        let verdict = evaluate_sentiment(&SentimentScores::new(0.5, 0.5, 0.0), &thresholds);
        assert!(verdict.approved);
        assert!(verdict.rejection_reasons.is_empty());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Verdict::empty_submission().status().to_string(), "rejected");
    }
}
