// =============================================================================
// News ingest - headlines aligned to the candle they were published in
// =============================================================================
//
// CryptoPanic posts are fetched, mapped onto `candle_time` with the same
// alignment the kline path uses, optionally scored by an injected
// `SentimentScorer`, and stored next to the klines.
// =============================================================================

pub mod client;
pub mod sentiment;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use client::CryptoPanicClient;
pub use sentiment::{NoSentiment, SentimentScore, SentimentScorer};

/// One news post attributed to a ticker and a candle bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    /// Provider id; unique per post.
    pub id: String,
    pub ticker: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Publisher name, e.g. `CoinDesk`.
    pub source: String,
    pub source_domain: Option<String>,
    pub publication_time: DateTime<Utc>,
    /// Start of the candle the post falls into.
    pub candle_time: DateTime<Utc>,
    pub sentiment: Option<SentimentScore>,
}

/// Attach a sentiment score to every item the scorer can rate.
pub fn score_items(items: &mut [NewsItem], scorer: &dyn SentimentScorer) {
    for item in items.iter_mut() {
        item.sentiment = scorer.score(&item.title);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::sentiment::SentimentLabel;
    use chrono::TimeZone;

    struct Fixed(f64);

    impl SentimentScorer for Fixed {
        fn raw_score(&self, _text: &str) -> Option<f64> {
            Some(self.0)
        }
    }

    fn item() -> NewsItem {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        NewsItem {
            id: "1".into(),
            ticker: "BTCUSDT".into(),
            title: "Bitcoin rallies".into(),
            description: None,
            url: None,
            source: "CoinDesk".into(),
            source_domain: None,
            publication_time: t,
            candle_time: t,
            sentiment: None,
        }
    }

    #[test]
    fn scorer_fills_sentiment() {
        let mut items = vec![item(), item()];
        score_items(&mut items, &Fixed(0.8));
        for it in &items {
            let s = it.sentiment.unwrap();
            assert_eq!(s.score, 0.8);
            assert_eq!(s.label, SentimentLabel::Positive);
        }
    }

    #[test]
    fn no_sentiment_leaves_items_unscored() {
        let mut items = vec![item()];
        score_items(&mut items, &NoSentiment);
        assert!(items[0].sentiment.is_none());
    }
}
