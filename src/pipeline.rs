// =============================================================================
// Collector pipeline - extract / transform / load cycles
// =============================================================================
//
//   Bybit klines     -> indicator engine -> SignalSink
//   CryptoPanic news -> SentimentScorer  -> NewsSink
//
// Fetches are async; the engine, the scorer and the sinks are synchronous, so
// they run on the blocking pool to keep SQLite writes off the async workers.
// Each source runs in its own polling loop; a failed cycle is logged and
// retried on the next tick.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::bybit::BybitClient;
use crate::engine::run_engine;
use crate::news::{score_items, CryptoPanicClient, NewsItem, SentimentScorer};
use crate::runtime_config::CollectorConfig;
use crate::storage::{NewsSink, SignalSink, StoreReport};
use crate::types::{Candle, RawFrame};

/// Fetch, compute and store one batch for `symbol`.
///
/// Returns `None` when the exchange had no candles to offer.
pub async fn run_cycle<S>(
    client: &BybitClient,
    sink: Arc<S>,
    config: &CollectorConfig,
    symbol: &str,
) -> Result<Option<StoreReport>>
where
    S: SignalSink + ?Sized + 'static,
{
    let candles = client
        .get_klines(symbol, config.interval_minutes, config.kline_limit)
        .await
        .with_context(|| format!("failed to fetch klines for {symbol}"))?;

    let symbol = symbol.to_string();
    tokio::task::spawn_blocking(move || process_batch(sink.as_ref(), &symbol, &candles))
        .await
        .context("signal batch task panicked")?
}

/// Run the engine over `candles` and hand the result to `sink`.
pub fn process_batch<S>(sink: &S, symbol: &str, candles: &[Candle]) -> Result<Option<StoreReport>>
where
    S: SignalSink + ?Sized,
{
    if candles.is_empty() {
        info!(symbol, "no new candles fetched");
        return Ok(None);
    }

    let frame = run_engine(&RawFrame::from_candles(candles))
        .with_context(|| format!("indicator engine failed for {symbol}"))?;

    let report = sink
        .store(&frame)
        .with_context(|| format!("failed to store signals for {symbol}"))?;

    info!(
        symbol,
        rows = frame.len(),
        klines_inserted = report.klines_inserted,
        indicators_inserted = report.indicators_inserted,
        "signal batch stored"
    );

    Ok(Some(report))
}

/// Fetch the latest news posts, score them and store the new ones.
pub async fn run_news_cycle<N>(
    client: &CryptoPanicClient,
    scorer: Arc<dyn SentimentScorer>,
    sink: Arc<N>,
    ticker: &str,
) -> Result<usize>
where
    N: NewsSink + ?Sized + 'static,
{
    let items = client
        .fetch_posts(ticker)
        .await
        .with_context(|| format!("failed to fetch news for {ticker}"))?;

    tokio::task::spawn_blocking(move || process_news(sink.as_ref(), scorer.as_ref(), items))
        .await
        .context("news batch task panicked")?
}

/// Score `items` and hand them to `sink`.
pub fn process_news<N>(sink: &N, scorer: &dyn SentimentScorer, mut items: Vec<NewsItem>) -> Result<usize>
where
    N: NewsSink + ?Sized,
{
    if items.is_empty() {
        info!("no news posts fetched");
        return Ok(0);
    }

    score_items(&mut items, scorer);
    let inserted = sink.store_news(&items).context("failed to store news posts")?;

    info!(fetched = items.len(), inserted, "news batch stored");
    Ok(inserted)
}

/// Poll klines for `symbol` every `poll_interval_secs` until aborted.
pub fn spawn_kline_loop<S>(
    client: BybitClient,
    sink: Arc<S>,
    config: Arc<CollectorConfig>,
    symbol: String,
) -> JoinHandle<()>
where
    S: SignalSink + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));
        loop {
            interval.tick().await;
            if let Err(e) = run_cycle(&client, sink.clone(), &config, &symbol).await {
                error!(symbol = %symbol, error = format!("{e:#}"), "collector cycle failed");
            }
        }
    })
}

/// Poll news every `news_poll_interval_secs` until aborted.
pub fn spawn_news_loop<N>(
    client: CryptoPanicClient,
    scorer: Arc<dyn SentimentScorer>,
    sink: Arc<N>,
    config: Arc<CollectorConfig>,
) -> JoinHandle<()>
where
    N: NewsSink + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(config.news_poll_interval_secs));
        loop {
            interval.tick().await;
            if let Err(e) =
                run_news_cycle(&client, scorer.clone(), sink.clone(), &config.news_ticker).await
            {
                error!(error = format!("{e:#}"), "news cycle failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::NoSentiment;
    use crate::storage::SqliteSink;
    use crate::types::SignalFrame;
    use chrono::{Duration, TimeZone, Utc};
    use parking_lot::Mutex;

    fn candles(n: usize) -> Vec<Candle> {
        let t0 = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| Candle {
                ticker: "SOLUSDT".into(),
                candle_time: t0 + Duration::hours(i as i64),
                open: 150.0,
                high: 152.0,
                low: 149.0,
                close: 150.0 + i as f64,
                volume: 500.0,
            })
            .collect()
    }

    /// Records the frames it receives.
    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<SignalFrame>>,
    }

    impl SignalSink for RecordingSink {
        fn store(&self, frame: &SignalFrame) -> Result<StoreReport> {
            self.frames.lock().push(frame.clone());
            Ok(StoreReport {
                klines_inserted: frame.len(),
                indicators_inserted: frame.len(),
            })
        }
    }

    struct FailingSink;

    impl SignalSink for FailingSink {
        fn store(&self, _frame: &SignalFrame) -> Result<StoreReport> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn empty_batch_skips_the_sink() {
        let sink = RecordingSink::default();
        assert_eq!(process_batch(&sink, "SOLUSDT", &[]).unwrap(), None);
        assert!(sink.frames.lock().is_empty());
    }

    #[test]
    fn batch_reaches_the_sink_unchanged_in_length() {
        let sink = RecordingSink::default();
        let report = process_batch(&sink, "SOLUSDT", &candles(30)).unwrap().unwrap();
        assert_eq!(report.klines_inserted, 30);

        let frames = sink.frames.lock();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), 30);
        assert!(frames[0].has_column("ticker"));
    }

    #[test]
    fn sink_errors_carry_the_symbol() {
        let err = process_batch(&FailingSink, "SOLUSDT", &candles(3)).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("SOLUSDT"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn news_is_scored_before_storing() {
        use crate::news::sentiment::SentimentLabel;

        struct Bearish;
        impl SentimentScorer for Bearish {
            fn raw_score(&self, _text: &str) -> Option<f64> {
                Some(-0.6)
            }
        }

        #[derive(Default)]
        struct NewsRecorder {
            items: Mutex<Vec<NewsItem>>,
        }
        impl NewsSink for NewsRecorder {
            fn store_news(&self, items: &[NewsItem]) -> Result<usize> {
                self.items.lock().extend_from_slice(items);
                Ok(items.len())
            }
        }

        let body = serde_json::json!({ "results": [
            { "id": 7, "title": "Exchange halts withdrawals", "published_at": "2024-04-01T03:59:59Z", "kind": "news" }
        ]});
        let items = crate::news::client::parse_posts_response("BTCUSDT", &body);

        let sink = NewsRecorder::default();
        assert_eq!(process_news(&sink, &Bearish, items).unwrap(), 1);

        let stored = sink.items.lock();
        let sentiment = stored[0].sentiment.unwrap();
        assert_eq!(sentiment.label, SentimentLabel::Negative);
        assert_eq!(stored[0].candle_time, Utc.with_ymd_and_hms(2024, 4, 1, 3, 0, 0).unwrap());
    }

    #[test]
    fn empty_news_batch_skips_the_sink() {
        let sink = SqliteSink::open_in_memory().unwrap();
        assert_eq!(process_news(&sink, &NoSentiment, Vec::new()).unwrap(), 0);
    }

    #[tokio::test]
    async fn kline_loop_stops_when_aborted() {
        // nothing listens on port 1, so every cycle fails fast and is logged
        let client = BybitClient::new("http://127.0.0.1:1", "linear", std::time::Duration::from_secs(1))
            .unwrap();
        let sink = Arc::new(RecordingSink::default());
        let config = Arc::new(CollectorConfig {
            poll_interval_secs: 3600,
            ..CollectorConfig::default()
        });

        let handle = spawn_kline_loop(client, sink.clone(), config, "BTCUSDT".into());
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        handle.abort();

        let err = handle.await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(sink.frames.lock().is_empty());
    }

    #[test]
    fn rerun_against_sqlite_is_idempotent() {
        let sink = SqliteSink::open_in_memory().unwrap();
        let first = process_batch(&sink, "SOLUSDT", &candles(20)).unwrap().unwrap();
        assert_eq!(first.klines_inserted, 20);

        let second = process_batch(&sink, "SOLUSDT", &candles(25)).unwrap().unwrap();
        assert_eq!(second.klines_inserted, 5);
        assert_eq!(second.indicators_inserted, 5);
    }
}
