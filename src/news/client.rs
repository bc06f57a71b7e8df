// =============================================================================
// CryptoPanic REST Client - developer v2 posts
// =============================================================================
//
// Posts come back under `results`, newest first.  Only `news` and `media`
// kinds are kept; posts without an id, title or parsable `published_at` are
// skipped with a warning.
// =============================================================================

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument, warn};

use super::NewsItem;
use crate::market_data::align_to_candle_time;

const CLIENT_USER_AGENT: &str = "ohlcv-collector/1.0";

/// Posts are attributed to hourly candles.
pub const NEWS_CANDLE_HOURS: u32 = 1;

/// Publisher name used when a post carries no source block.
const FALLBACK_SOURCE: &str = "Cryptopanic";

const KEPT_KINDS: &[&str] = &["news", "media"];

#[derive(Clone)]
pub struct CryptoPanicClient {
    posts_url: String,
    auth_token: String,
    per_page: u32,
    client: reqwest::Client,
}

impl CryptoPanicClient {
    pub fn new(
        posts_url: impl Into<String>,
        auth_token: impl Into<String>,
        per_page: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            posts_url: posts_url.into(),
            auth_token: auth_token.into(),
            per_page,
            client,
        })
    }

    /// GET the latest public posts and attribute them to `ticker`.
    #[instrument(skip(self), name = "cryptopanic::fetch_posts")]
    pub async fn fetch_posts(&self, ticker: &str) -> Result<Vec<NewsItem>> {
        let per_page = self.per_page.to_string();
        let resp = self
            .client
            .get(&self.posts_url)
            .query(&[
                ("auth_token", self.auth_token.as_str()),
                ("public", "true"),
                ("per_page", per_page.as_str()),
                ("sort", "published_at"),
                ("filter", "all"),
            ])
            .send()
            .await
            .context("GET CryptoPanic posts request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("CryptoPanic posts returned {}: {}", status, text);
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse CryptoPanic response")?;

        let items = parse_posts_response(ticker, &body);
        debug!(ticker, count = items.len(), "news posts fetched");
        Ok(items)
    }
}

impl std::fmt::Debug for CryptoPanicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoPanicClient")
            .field("posts_url", &self.posts_url)
            .field("per_page", &self.per_page)
            .finish_non_exhaustive()
    }
}

/// Turn a posts payload into news items, oldest first and unique by id.
pub fn parse_posts_response(ticker: &str, body: &serde_json::Value) -> Vec<NewsItem> {
    let Some(results) = body["results"].as_array() else {
        debug!(ticker, "posts response has no results");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut items: Vec<NewsItem> = results
        .iter()
        .filter(|post| {
            post["kind"]
                .as_str()
                .map_or(true, |kind| KEPT_KINDS.contains(&kind))
        })
        .filter_map(|post| match parse_post(ticker, post) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(ticker, error = %e, "skipping malformed news post");
                None
            }
        })
        .filter(|item| seen.insert(item.id.clone()))
        .collect();

    items.sort_by_key(|item| item.publication_time);
    items
}

fn parse_post(ticker: &str, post: &serde_json::Value) -> Result<NewsItem> {
    let id = match &post["id"] {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) if !s.is_empty() => s.clone(),
        other => anyhow::bail!("post id missing or invalid: {other}"),
    };
    let title = post["title"]
        .as_str()
        .filter(|t| !t.trim().is_empty())
        .context("post has no title")?
        .to_string();
    let published = post["published_at"]
        .as_str()
        .context("post has no published_at")?;
    let publication_time = DateTime::parse_from_rfc3339(published)
        .with_context(|| format!("invalid published_at '{published}'"))?
        .with_timezone(&Utc);

    let text = |v: &serde_json::Value| v.as_str().filter(|s| !s.is_empty()).map(String::from);

    Ok(NewsItem {
        id,
        ticker: ticker.to_string(),
        title,
        description: text(&post["description"]),
        url: text(&post["original_url"]).or_else(|| text(&post["url"])),
        source: text(&post["source"]["title"]).unwrap_or_else(|| FALLBACK_SOURCE.to_string()),
        source_domain: text(&post["source"]["domain"]),
        publication_time,
        candle_time: align_to_candle_time(publication_time, NEWS_CANDLE_HOURS),
        sentiment: None,
    })
}
