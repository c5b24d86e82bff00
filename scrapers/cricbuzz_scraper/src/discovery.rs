use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;

use crate::{types::MatchCandidate, utils::teams_from_slug};

/// URL fragments that mark an international fixture.
pub const INCLUDE_KEYWORDS: &[&str] = &["tour-of", "t20i", "odi", "test-"];

/// URL fragments of domestic, franchise, age-group and women's competitions.
pub const EXCLUDE_KEYWORDS: &[&str] = &[
    "premier-league",
    "super-smash",
    "big-bash",
    "psl",
    "ipl",
    "bpl",
    "cpl",
    "sa20",
    "hundred",
    "ranji",
    "u19",
    "women",
    "domestic",
    "first-class",
];

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static LIVE_SCORE_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"/live-cricket-scores/(\d+)/").unwrap());

pub fn is_international(url: &str) -> bool {
    let url = url.to_lowercase();
    !EXCLUDE_KEYWORDS.iter().any(|k| url.contains(k)) && INCLUDE_KEYWORDS.iter().any(|k| url.contains(k))
}

fn slug_of(href: &str) -> &str {
    href.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

/// Collects international match candidates from a recent-matches listing.
///
/// `seen` holds the match ids already taken during this run; an id is only
/// added once its link passes the keyword filter, so a later link for the
/// same match can still qualify.
pub fn discover_candidates(document: &Html, seen: &mut HashSet<String>) -> Vec<MatchCandidate> {
    let mut candidates = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(caps) = LIVE_SCORE_HREF.captures(href) else {
            continue;
        };
        let match_id = caps[1].to_string();

        if seen.contains(&match_id) {
            continue;
        }
        if !is_international(href) {
            debug!("Skipping non-international match link {}", href);
            continue;
        }

        seen.insert(match_id.clone());
        let slug = slug_of(href).to_string();
        let teams = teams_from_slug(&slug);
        candidates.push(MatchCandidate { match_id, slug, teams });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn listing(links: &[&str]) -> Html {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{href}">link</a>"#))
            .collect();
        Html::parse_document(&format!("<html><body>{anchors}</body></html>"))
    }

    #[test]
    fn test_keyword_filter() {
        assert!(is_international("/live-cricket-scores/1/ind-vs-aus-1st-odi-australia-tour-of-india-2025"));
        assert!(!is_international("/live-cricket-scores/2/mi-vs-csk-12th-match-ipl-2025"));
        assert!(!is_international("/live-cricket-scores/3/indw-vs-ausw-1st-odi-women-tour"));
        assert!(!is_international("/live-cricket-scores/4/mum-vs-kar-elite-group-a-ranji-trophy"));
        // Neither list matches: dropped by the positive filter.
        assert!(!is_international("/live-cricket-scores/5/nep-vs-uae-warm-up"));
    }

    #[test]
    fn test_discover_in_document_order_without_duplicates() {
        let doc = listing(&[
            "/live-cricket-scores/121406/ind-vs-aus-3rd-test-australia-tour-of-india-2025",
            "/cricket-match-facts/121406/ind-vs-aus-3rd-test-australia-tour-of-india-2025",
            "/live-cricket-scores/133000/nz-vs-sl-1st-t20i-sri-lanka-tour-of-new-zealand-2025",
            "/live-cricket-scores/121406/ind-vs-aus-3rd-test-australia-tour-of-india-2025",
            "/live-cricket-scores/99999/mi-vs-csk-12th-match-ipl-2025",
        ]);

        let mut seen = HashSet::new();
        let candidates = discover_candidates(&doc, &mut seen);

        assert_eq!(
            candidates,
            vec![
                MatchCandidate {
                    match_id: "121406".to_string(),
                    slug: "ind-vs-aus-3rd-test-australia-tour-of-india-2025".to_string(),
                    teams: "India vs Australia".to_string(),
                },
                MatchCandidate {
                    match_id: "133000".to_string(),
                    slug: "nz-vs-sl-1st-t20i-sri-lanka-tour-of-new-zealand-2025".to_string(),
                    teams: "New Zealand vs Sri Lanka".to_string(),
                },
            ]
        );
        assert!(!seen.contains("99999"));
    }

    #[test]
    fn test_seen_set_spans_calls() {
        let doc = listing(&["/live-cricket-scores/140548/eng-vs-wi-2nd-odi-west-indies-tour-of-england"]);
        let mut seen = HashSet::new();
        assert_eq!(discover_candidates(&doc, &mut seen).len(), 1);
        assert!(discover_candidates(&doc, &mut seen).is_empty());
    }

    #[test]
    fn test_id_filtered_out_once_can_still_qualify_later() {
        let doc = listing(&[
            "/live-cricket-scores/137826/live",
            "/live-cricket-scores/137826/pak-vs-ban-1st-test-bangladesh-tour-of-pakistan",
        ]);
        let candidates = discover_candidates(&doc, &mut HashSet::new());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].teams, "Pakistan vs Bangladesh");
    }
}
