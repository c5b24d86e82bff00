use crate::config::ScrapingConfig;

/// Builds page URLs relative to the configured site root.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: String,
}

impl SiteUrls {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self::new(&config.base_url)
    }

    pub fn recent_matches(&self) -> String {
        format!("{}/cricket-match/live-scores/recent-matches", self.base)
    }

    pub fn live_scores(&self, match_id: &str, slug: &str) -> String {
        format!("{}/live-cricket-scores/{}/{}", self.base, match_id, slug)
    }

    pub fn match_facts(&self, match_id: &str, slug: &str) -> String {
        format!("{}/cricket-match-facts/{}/{}", self.base, match_id, slug)
    }

    pub fn squads(&self, match_id: &str) -> String {
        format!("{}/cricket-match-squads/{}/squads", self.base, match_id)
    }

    pub fn player_profile(&self, player_id: i64) -> String {
        format!("{}/profiles/{}/player", self.base, player_id)
    }
}
