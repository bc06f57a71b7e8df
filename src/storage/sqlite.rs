//! SQLite sink for raw klines and their indicators.
//!
//! Two tables keyed by `(ticker, candle_time)`:
//! - `kline_data`: raw OHLCV
//! - `technical_indicators`: every indicator (REAL, NaN stored as NULL) and
//!   every flag (INTEGER 0/1)
//!
//! and two for news:
//! - `news_source`: one row per publisher
//! - `market_sentiment`: one row per `(news_id, ticker)`
//!
//! Both are written with `INSERT OR IGNORE` inside a single transaction, so a
//! frame is stored completely or not at all, and re-running over an
//! overlapping range is harmless.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info};

use super::{NewsSink, SignalSink, StoreReport};
use crate::news::NewsItem;
use crate::types::{SignalFrame, FLAG_COLUMNS, INDICATOR_COLUMNS, REQUIRED_COLUMNS};

const KLINE_TABLE: &str = "kline_data";
const INDICATOR_TABLE: &str = "technical_indicators";
const SOURCE_TABLE: &str = "news_source";
const SENTIMENT_TABLE: &str = "market_sentiment";

/// SQLite-backed [`SignalSink`].
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open SQLite database {}", path.display()))?;
        let sink = Self {
            conn: Mutex::new(conn),
        };
        sink.init_schema()?;
        info!(path = %path.display(), "SQLite sink initialised");
        Ok(sink)
    }

    /// In-memory database, used by tests.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory SQLite")?;
        let sink = Self {
            conn: Mutex::new(conn),
        };
        sink.init_schema()?;
        debug!("in-memory SQLite sink initialised");
        Ok(sink)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        let kline_cols: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .map(|c| format!("{c} REAL"))
            .collect();
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {KLINE_TABLE} (
                    ticker TEXT NOT NULL,
                    candle_time TEXT NOT NULL,
                    {},
                    PRIMARY KEY (ticker, candle_time)
                )",
                kline_cols.join(", ")
            ),
            [],
        )
        .context("failed to create kline table")?;

        let indicator_cols: Vec<String> = INDICATOR_COLUMNS
            .iter()
            .map(|c| format!("{c} REAL"))
            .chain(FLAG_COLUMNS.iter().map(|c| format!("{c} INTEGER NOT NULL")))
            .collect();
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {INDICATOR_TABLE} (
                    ticker TEXT NOT NULL,
                    candle_time TEXT NOT NULL,
                    {},
                    PRIMARY KEY (ticker, candle_time)
                )",
                indicator_cols.join(", ")
            ),
            [],
        )
        .context("failed to create indicator table")?;

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {SOURCE_TABLE} (
                    name TEXT PRIMARY KEY,
                    url_base TEXT
                )"
            ),
            [],
        )
        .context("failed to create news source table")?;

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {SENTIMENT_TABLE} (
                    news_id TEXT NOT NULL,
                    ticker TEXT NOT NULL,
                    publication_time TEXT NOT NULL,
                    candle_time TEXT NOT NULL,
                    headline TEXT NOT NULL,
                    content TEXT,
                    url TEXT,
                    source TEXT NOT NULL REFERENCES {SOURCE_TABLE}(name),
                    sentiment_score REAL,
                    sentiment_label TEXT,
                    PRIMARY KEY (news_id, ticker)
                )"
            ),
            [],
        )
        .context("failed to create market sentiment table")?;

        Ok(())
    }
}

impl SignalSink for SqliteSink {
    fn store(&self, frame: &SignalFrame) -> Result<StoreReport> {
        if frame.is_empty() {
            return Ok(StoreReport::default());
        }
        if !frame.has_column("ticker") || !frame.has_column("candle_time") {
            anyhow::bail!("cannot store a frame without ticker and candle_time keys");
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction().context("failed to begin transaction")?;
        let mut report = StoreReport::default();

        {
            let mut kline_stmt = tx
                .prepare(&insert_sql(KLINE_TABLE, REQUIRED_COLUMNS.iter().copied()))
                .context("failed to prepare kline insert")?;
            let mut indicator_stmt = tx
                .prepare(&insert_sql(
                    INDICATOR_TABLE,
                    INDICATOR_COLUMNS.iter().chain(FLAG_COLUMNS.iter()).copied(),
                ))
                .context("failed to prepare indicator insert")?;

            for row in &frame.rows {
                let (Some(ticker), Some(candle_time)) = (&row.ticker, row.candle_time) else {
                    anyhow::bail!("row is missing its ticker or candle_time key");
                };
                let key = [
                    Value::Text(ticker.clone()),
                    Value::Text(timestamp(candle_time)),
                ];

                let ohlcv = [row.open, row.high, row.low, row.close, row.volume];
                report.klines_inserted += kline_stmt
                    .execute(params_from_iter(
                        key.iter().cloned().chain(ohlcv.into_iter().map(real)),
                    ))
                    .context("kline insert failed")?;

                let values = row
                    .indicators
                    .values()
                    .into_iter()
                    .map(real)
                    .chain(
                        row.flags
                            .values()
                            .into_iter()
                            .map(|f| Value::Integer(i64::from(f))),
                    );
                report.indicators_inserted += indicator_stmt
                    .execute(params_from_iter(key.iter().cloned().chain(values)))
                    .context("indicator insert failed")?;
            }
        }

        tx.commit().context("failed to commit signal frame")?;
        debug!(
            rows = frame.len(),
            klines = report.klines_inserted,
            indicators = report.indicators_inserted,
            "signal frame stored"
        );
        Ok(report)
    }
}

impl NewsSink for SqliteSink {
    fn store_news(&self, items: &[NewsItem]) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction().context("failed to begin transaction")?;
        let mut inserted = 0;

        {
            let mut source_stmt = tx
                .prepare(&format!(
                    "INSERT OR IGNORE INTO {SOURCE_TABLE} (name, url_base) VALUES (?1, ?2)"
                ))
                .context("failed to prepare news source insert")?;
            let mut post_stmt = tx
                .prepare(&format!(
                    "INSERT OR IGNORE INTO {SENTIMENT_TABLE} (
                        news_id, ticker, publication_time, candle_time, headline,
                        content, url, source, sentiment_score, sentiment_label
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ))
                .context("failed to prepare news insert")?;

            for item in items {
                source_stmt
                    .execute(rusqlite::params![item.source, item.source_domain])
                    .context("news source insert failed")?;

                inserted += post_stmt
                    .execute(rusqlite::params![
                        item.id,
                        item.ticker,
                        timestamp(item.publication_time),
                        timestamp(item.candle_time),
                        item.title,
                        item.description,
                        item.url,
                        item.source,
                        item.sentiment.map(|s| real(s.score)),
                        item.sentiment.map(|s| s.label.as_str()),
                    ])
                    .context("news insert failed")?;
            }
        }

        tx.commit().context("failed to commit news batch")?;
        debug!(posts = items.len(), inserted, "news batch stored");
        Ok(inserted)
    }
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn insert_sql<'a>(table: &str, columns: impl Iterator<Item = &'a str>) -> String {
    let cols: Vec<&str> = ["ticker", "candle_time"].into_iter().chain(columns).collect();
    let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT OR IGNORE INTO {table} ({}) VALUES ({})",
        cols.join(", "),
        placeholders.join(", ")
    )
}

/// Non-finite floats are stored as NULL.
fn real(v: f64) -> Value {
    if v.is_finite() {
        Value::Real(v)
    } else {
        Value::Null
    }
}
