use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use scraper::Html;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

use crate::{config::ScraperConfig, metrics::MetricsCollector};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Source of parsed pages. Callers treat every error as "page unavailable".
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Html, FetchError>;
}

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Paced HTTP fetcher. One limiter cell per request, shared by every caller,
/// keeps outbound requests at least `request_delay_ms` apart.
pub struct HttpFetcher {
    client: reqwest::Client,
    rate_limiter: Option<Arc<DirectLimiter>>,
    metrics: MetricsCollector,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.scraping.user_agent)
            .timeout(Duration::from_secs(config.scraping.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let rate_limiter = Quota::with_period(Duration::from_millis(config.rate_limits.request_delay_ms))
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        Ok(Self {
            client,
            rate_limiter,
            metrics: MetricsCollector::new(),
        })
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    async fn wait_turn(&self) {
        if let Some(limiter) = &self.rate_limiter {
            let started = Instant::now();
            limiter.until_ready().await;
            self.metrics.record_rate_limit_wait(started.elapsed());
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Html, FetchError> {
        self.wait_turn().await;

        let tracker = self.metrics.record_request_start();
        match self.fetch_text(url).await {
            Ok(text) => {
                tracker.finish(true);
                debug!("Fetched {} ({} bytes)", url, text.len());
                Ok(Html::parse_document(&text))
            }
            Err(e) => {
                tracker.finish(false);
                warn!("Error fetching {}: {}", url, e);
                self.metrics.record_error(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn test_config(delay_ms: u64) -> ScraperConfig {
        let mut config = ScraperConfig::default();
        config.rate_limits.request_delay_ms = delay_ms;
        config.scraping.request_timeout_secs = 5;
        config.scraping.user_agent = "cricbuzz-scraper-test".to_string();
        config
    }

    #[tokio::test]
    async fn test_fetch_parses_document_and_sends_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/live-cricket-scores/1/ind-vs-aus")
            .match_header("user-agent", "cricbuzz-scraper-test")
            .with_status(200)
            .with_body("<html><body><h1>India vs Australia</h1></body></html>")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config(0)).unwrap();
        let url = format!("{}/live-cricket-scores/1/ind-vs-aus", server.url());
        let doc = fetcher.fetch(&url).await.unwrap();

        let h1 = Selector::parse("h1").unwrap();
        let heading = doc.select(&h1).next().map(|el| el.text().collect::<String>());
        assert_eq!(heading.as_deref(), Some("India vs Australia"));
        mock.assert_async().await;

        let metrics = fetcher.metrics().get_metrics();
        assert_eq!(metrics.successful_requests, 1);
        assert_eq!(metrics.failed_requests, 0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/profiles/99/player")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config(0)).unwrap();
        let url = format!("{}/profiles/99/player", server.url());
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        let metrics = fetcher.metrics().get_metrics();
        assert_eq!(metrics.failed_requests, 1);
        assert!(metrics.last_error.is_some());
    }

    #[tokio::test]
    async fn test_requests_are_spaced_by_the_delay() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/page")
            .with_status(200)
            .with_body("<p>ok</p>")
            .expect(3)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config(100)).unwrap();
        let url = format!("{}/page", server.url());
        let started = Instant::now();
        for _ in 0..3 {
            fetcher.fetch(&url).await.unwrap();
        }

        // First request goes out immediately, the next two wait a full period each.
        assert!(started.elapsed() >= Duration::from_millis(190));
    }
}
