#![allow(dead_code)]

use async_trait::async_trait;
use scraper::Html;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use cricbuzz_scraper::{
    config::ScraperConfig,
    fetcher::{FetchError, PageFetcher},
    urls::SiteUrls,
};

/// Serves canned pages by URL and remembers every request. Unknown URLs
/// answer with a 404.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: &str) -> Self {
        self.pages.insert(url.into(), html.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn into_shared(self) -> Arc<FakeFetcher> {
        Arc::new(self)
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Html, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Ok(Html::parse_document(html)),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

pub fn test_config() -> ScraperConfig {
    let mut config = ScraperConfig::default();
    config.rate_limits.request_delay_ms = 0;
    config
}

pub fn site_urls() -> SiteUrls {
    SiteUrls::from_config(&test_config().scraping)
}
