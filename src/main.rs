// =============================================================================
// OHLCV Collector - Main Entry Point
// =============================================================================
//
// Polls Bybit klines for every configured ticker, computes indicators and
// flags, and stores both in SQLite.  CryptoPanic news is polled alongside
// when a token is configured.  Every source runs in its own task; a failed
// cycle is logged and retried on the next tick.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod bybit;
mod engine;
mod error;
mod indicators;
mod market_data;
mod news;
mod pipeline;
mod runtime_config;
mod signals;
mod storage;
mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::bybit::BybitClient;
use crate::news::{CryptoPanicClient, NoSentiment, SentimentScorer};
use crate::runtime_config::{CollectorConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, NEWS_TOKEN_ENV};
use crate::storage::SqliteSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("OHLCV collector starting up");

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = CollectorConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        CollectorConfig::default()
    });
    config.apply_env();
    config.validate().context("invalid collector configuration")?;

    info!(
        symbols = ?config.symbols,
        interval_minutes = config.interval_minutes,
        poll_interval_secs = config.poll_interval_secs,
        database = %config.database_path,
        "Configured collector"
    );

    // ── 2. Collaborators ─────────────────────────────────────────────────
    let client = BybitClient::new(
        config.base_url.clone(),
        config.category.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let sink = Arc::new(SqliteSink::open(&config.database_path)?);
    let config = Arc::new(config);

    // ── 3. One polling loop per ticker, plus news ────────────────────────
    let mut handles: Vec<JoinHandle<()>> = config
        .symbols
        .iter()
        .map(|symbol| {
            pipeline::spawn_kline_loop(client.clone(), sink.clone(), config.clone(), symbol.clone())
        })
        .collect();

    match config.news_api_token.as_deref() {
        Some(token) => {
            let news_client = CryptoPanicClient::new(
                config.news_posts_url.clone(),
                token,
                config.news_per_page,
                Duration::from_secs(config.request_timeout_secs),
            )?;
            let scorer: Arc<dyn SentimentScorer> = Arc::new(NoSentiment);
            handles.push(pipeline::spawn_news_loop(
                news_client,
                scorer,
                sink.clone(),
                config.clone(),
            ));
            info!(ticker = %config.news_ticker, "News ingest enabled");
        }
        None => warn!("{NEWS_TOKEN_ENV} not set, news ingest disabled"),
    }

    info!(loops = handles.len(), "Collector loops running. Press Ctrl+C to stop.");

    // ── 4. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received - stopping");

    for handle in &handles {
        handle.abort();
    }
    for handle in handles {
        if let Err(e) = handle.await {
            if !e.is_cancelled() {
                error!(error = %e, "collector loop ended abnormally");
            }
        }
    }

    info!("OHLCV collector shut down complete.");
    Ok(())
}
