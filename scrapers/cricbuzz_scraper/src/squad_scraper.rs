use serde::Serialize;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, info, warn};

use crate::{
    config::ScraperConfig,
    fetcher::{FetchError, PageFetcher},
    squads::{parse_profile_page, parse_squads_page, SquadEntry, TeamSquad},
    store::{Store, StoreError},
    types::{Player, PlayerProfile, SquadMembership},
    urls::SiteUrls,
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct SquadRunReport {
    pub matches_processed: usize,
    pub matches_skipped: Vec<String>,
    pub players_added: usize,
    pub players_updated: usize,
    pub memberships_added: usize,
    pub profiles_failed: usize,
}

/// Reads match squads and enriches each player once from their profile page.
pub struct SquadScraper {
    fetcher: Arc<dyn PageFetcher>,
    urls: SiteUrls,
}

impl SquadScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &ScraperConfig) -> Self {
        Self {
            fetcher,
            urls: SiteUrls::from_config(&config.scraping),
        }
    }

    async fn fetch_profile(&self, player_id: i64) -> Result<PlayerProfile, FetchError> {
        let document = self.fetcher.fetch(&self.urls.player_profile(player_id)).await?;
        Ok(parse_profile_page(&document))
    }

    async fn fetch_squads(&self, match_id: &str) -> Result<Option<[TeamSquad; 2]>, FetchError> {
        let document = self.fetcher.fetch(&self.urls.squads(match_id)).await?;
        Ok(parse_squads_page(&document))
    }

    /// Biography for a player not yet in the store. Known players get an
    /// empty profile, which the store never writes over existing fields.
    async fn profile_for(
        &self,
        store: &Store,
        entry: &SquadEntry,
        report: &mut SquadRunReport,
    ) -> Result<PlayerProfile, StoreError> {
        if store.player_exists(entry.player_id).await? {
            return Ok(PlayerProfile::default());
        }

        info!("Fetching profile for {} (ID: {})", entry.name, entry.player_id);
        match self.fetch_profile(entry.player_id).await {
            Ok(profile) => Ok(profile),
            Err(e) => {
                warn!("Could not fetch profile for player {}: {}", entry.player_id, e);
                report.profiles_failed += 1;
                Ok(PlayerProfile::default())
            }
        }
    }

    async fn save_squad(
        &self,
        store: &Store,
        match_id: &str,
        squad: TeamSquad,
        report: &mut SquadRunReport,
    ) -> Result<(), StoreError> {
        if let Some(first) = squad.players.first() {
            debug!("Sample for {}: {:?} -> {:?}", squad.team, first.name, first.role);
        }

        for entry in &squad.players {
            let profile = self.profile_for(store, entry, report).await?;
            let player = Player {
                player_id: entry.player_id,
                name: entry.name.clone(),
                role: entry.role.clone(),
                profile,
            };
            let membership = SquadMembership {
                match_id: match_id.to_string(),
                player_id: entry.player_id,
                team: squad.team.clone(),
            };

            let write = store.save_squad_entry(&player, &membership).await?;
            if write.player_inserted {
                report.players_added += 1;
            } else {
                report.players_updated += 1;
            }
            if write.membership_inserted {
                report.memberships_added += 1;
            }
        }

        Ok(())
    }

    /// Enriches one match. Returns `false` when the match had to be skipped.
    pub async fn process_match(
        &self,
        store: &Store,
        match_id: &str,
        report: &mut SquadRunReport,
    ) -> Result<bool, StoreError> {
        info!("Processing squads for match {}", match_id);

        let squads = match self.fetch_squads(match_id).await {
            Ok(Some(squads)) => squads,
            Ok(None) => {
                warn!("Match {} has fewer than two squad columns, skipping", match_id);
                return Ok(false);
            }
            Err(e) => {
                warn!("Failed to fetch squads for match {}: {}", match_id, e);
                return Ok(false);
            }
        };

        let [first, second] = squads;
        let teams = format!("{} & {}", first.team, second.team);
        self.save_squad(store, match_id, first, report).await?;
        self.save_squad(store, match_id, second, report).await?;

        info!("Processed {}", teams);
        Ok(true)
    }

    /// Enriches every match id once, in the given order.
    pub async fn run(&self, store: &Store, match_ids: &[String]) -> Result<SquadRunReport, StoreError> {
        let mut report = SquadRunReport::default();
        let mut seen = HashSet::new();

        for match_id in match_ids {
            if !seen.insert(match_id.as_str()) {
                continue;
            }
            if self.process_match(store, match_id, &mut report).await? {
                report.matches_processed += 1;
            } else {
                report.matches_skipped.push(match_id.clone());
            }
        }

        info!(
            "Squads done: {} matches, {} new players, {} memberships",
            report.matches_processed, report.players_added, report.memberships_added
        );
        Ok(report)
    }
}
