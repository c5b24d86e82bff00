use futures::stream::{self, StreamExt};
use scraper::Html;
use serde::Serialize;
use std::{collections::HashSet, sync::Arc};
use tracing::{info, warn};

use crate::{
    config::ScraperConfig,
    discovery::discover_candidates,
    fetcher::{FetchError, PageFetcher},
    match_details::{parse_facts_page, parse_live_page, resolve_cascade, MatchDetails},
    store::{Store, StoreError},
    types::{MatchCandidate, MatchRecord},
    urls::SiteUrls,
};

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Listing page unavailable: {0}")]
    ListingUnavailable(#[source] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchRunReport {
    pub candidates: usize,
    pub accepted: Vec<MatchRecord>,
    pub rejected: Vec<MatchCandidate>,
}

type PageParser = fn(&Html, &str) -> MatchDetails;

/// Finds recent international matches and resolves each one from its live
/// and facts pages.
pub struct MatchScraper {
    fetcher: Arc<dyn PageFetcher>,
    urls: SiteUrls,
    concurrency: usize,
}

impl MatchScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &ScraperConfig) -> Self {
        Self {
            fetcher,
            urls: SiteUrls::from_config(&config.scraping),
            concurrency: config.rate_limits.concurrency.max(1),
        }
    }

    /// Fetches the recent-matches listing and returns the candidates not yet in `seen`.
    pub async fn discover(&self, seen: &mut HashSet<String>) -> Result<Vec<MatchCandidate>, FetchError> {
        info!("Scanning recent international matches");
        let document = self.fetcher.fetch(&self.urls.recent_matches()).await?;
        let candidates = discover_candidates(&document, seen);
        info!("Found {} candidate matches", candidates.len());
        Ok(candidates)
    }

    async fn page_details(&self, url: &str, teams: &str, parse: PageParser) -> Option<MatchDetails> {
        match self.fetcher.fetch(url).await {
            Ok(document) => Some(parse(&document, teams)),
            Err(e) => {
                warn!("Page unavailable, skipping its fields: {}", e);
                None
            }
        }
    }

    /// Live page first, then facts page; earlier pages win field by field.
    pub async fn resolve(&self, candidate: &MatchCandidate) -> MatchDetails {
        let live_url = self.urls.live_scores(&candidate.match_id, &candidate.slug);
        let facts_url = self.urls.match_facts(&candidate.match_id, &candidate.slug);

        let live = self.page_details(&live_url, &candidate.teams, parse_live_page).await;
        let facts = self.page_details(&facts_url, &candidate.teams, parse_facts_page).await;

        resolve_cascade(live.into_iter().chain(facts))
    }

    /// Resolves candidates through a bounded pool, keeping discovery order.
    pub async fn resolve_all(&self, candidates: Vec<MatchCandidate>) -> MatchRunReport {
        let mut report = MatchRunReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        let outcomes: Vec<(MatchCandidate, Option<MatchRecord>)> = stream::iter(candidates)
            .map(|candidate| async move {
                info!("Processing ID {}: {}", candidate.match_id, candidate.teams);
                let record = self.resolve(&candidate).await.into_record(&candidate);
                (candidate, record)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (candidate, record) in outcomes {
            match record {
                Some(record) => report.accepted.push(record),
                None => {
                    info!("Skipping upcoming/no-result: {} ({})", candidate.teams, candidate.match_id);
                    report.rejected.push(candidate);
                }
            }
        }

        report
    }

    /// Discovery and resolution without touching the store.
    pub async fn scrape(&self) -> Result<MatchRunReport, FetchError> {
        let mut seen = HashSet::new();
        let candidates = self.discover(&mut seen).await?;
        Ok(self.resolve_all(candidates).await)
    }

    /// Full match pipeline. The stored matches are replaced only when the
    /// listing page could be read.
    pub async fn run(&self, store: &Store) -> Result<MatchRunReport, ScrapeError> {
        let report = self.scrape().await.map_err(ScrapeError::ListingUnavailable)?;
        store.replace_matches(&report.accepted).await?;
        info!(
            "Accepted {} of {} candidates ({} rejected)",
            report.accepted.len(),
            report.candidates,
            report.rejected.len()
        );
        Ok(report)
    }
}
