//! Sentiment scoring seam.
//!
//! Model inference lives outside this crate. A scorer is constructed once and
//! handed to the news pipeline, which only sees this trait.

use serde::Serialize;

/// Coarse sentiment class derived from a score in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
        }
    }

    /// Map a score onto the three classes by rounding `score + 1` to the
    /// nearest of 0, 1, 2 (ties to even). NaN has no label.
    pub fn from_score(score: f64) -> Option<Self> {
        if score.is_nan() {
            return None;
        }
        let index = (score.clamp(-1.0, 1.0) + 1.0).round_ties_even();
        Some(if index < 0.5 {
            SentimentLabel::Negative
        } else if index < 1.5 {
            SentimentLabel::Neutral
        } else {
            SentimentLabel::Positive
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentScore {
    pub score: f64,
    pub label: SentimentLabel,
}

/// Rates a headline. Implementations must be shareable across tasks.
pub trait SentimentScorer: Send + Sync {
    /// Score in `[-1, 1]`, or `None` when the text cannot be rated.
    fn raw_score(&self, text: &str) -> Option<f64>;

    fn score(&self, text: &str) -> Option<SentimentScore> {
        if text.trim().is_empty() {
            return None;
        }
        let score = self.raw_score(text)?;
        let label = SentimentLabel::from_score(score)?;
        Some(SentimentScore { score, label })
    }
}

/// Scorer used when no model is wired in; stores headlines unrated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSentiment;

impl SentimentScorer for NoSentiment {
    fn raw_score(&self, _text: &str) -> Option<f64> {
        None
    }
}
