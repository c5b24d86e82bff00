use serde::{Deserialize, Serialize};
use std::env;

/// Match ids processed by the squads pipeline when none are given.
pub const DEFAULT_SQUAD_MATCH_IDS: &[&str] = &[
    "116441", "121389", "121400", "121406", "133000", "133011", "133017", "137826", "137831",
    "140537", "140548", "140559",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://cricbuzz.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimits {
    /// Minimum spacing between two outbound requests. Zero disables pacing.
    pub request_delay_ms: u64,
    pub concurrency: usize,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            request_delay_ms: 500,
            concurrency: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapingConfig {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.cricbuzz.com".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScraperConfig {
    pub database: DatabaseConfig,
    pub rate_limits: RateLimits,
    pub scraping: ScrapingConfig,
    pub squad_match_ids: Vec<String>,
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; values that fail to parse keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database.url = url;
        }
        if let Some(base_url) = lookup("CRICBUZZ_BASE_URL") {
            config.scraping.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(user_agent) = lookup("SCRAPER_USER_AGENT") {
            config.scraping.user_agent = user_agent;
        }
        if let Some(timeout) = lookup("SCRAPER_TIMEOUT_SECS").and_then(|t| t.parse::<u64>().ok()) {
            config.scraping.request_timeout_secs = timeout;
        }
        if let Some(delay) = lookup("REQUEST_DELAY_MS").and_then(|d| d.parse::<u64>().ok()) {
            config.rate_limits.request_delay_ms = delay;
        }
        if let Some(workers) = lookup("SCRAPER_CONCURRENCY").and_then(|c| c.parse::<usize>().ok()) {
            config.rate_limits.concurrency = workers.max(1);
        }
        if let Some(ids) = lookup("SQUAD_MATCH_IDS") {
            let ids: Vec<String> = ids
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
            if !ids.is_empty() {
                config.squad_match_ids = ids;
            }
        }

        config
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            rate_limits: RateLimits::default(),
            scraping: ScrapingConfig::default(),
            squad_match_ids: DEFAULT_SQUAD_MATCH_IDS.iter().map(|id| id.to_string()).collect(),
        }
    }
}
