// =============================================================================
// Storage - persistence of engine output and news
// =============================================================================
//
// Sinks own idempotency: writing a frame that overlaps rows already stored
// must leave those rows untouched.  The engine never deduplicates against
// history.

pub mod sqlite;

use anyhow::Result;

use crate::news::NewsItem;
use crate::types::SignalFrame;

pub use sqlite::SqliteSink;

/// Rows actually inserted by one `store` call, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreReport {
    pub klines_inserted: usize,
    pub indicators_inserted: usize,
}

/// Destination for composed signal frames, keyed by `(ticker, candle_time)`.
pub trait SignalSink: Send + Sync {
    fn store(&self, frame: &SignalFrame) -> Result<StoreReport>;
}

/// Destination for news posts, keyed by `(news_id, ticker)`.
pub trait NewsSink: Send + Sync {
    /// Returns the number of posts actually inserted.
    fn store_news(&self, items: &[NewsItem]) -> Result<usize>;
}
