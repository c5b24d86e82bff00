use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::{
    types::{MatchCandidate, MatchFormat, MatchRecord, Officials},
    utils::{clean_text, collapse_whitespace, mentions_any_team, spaced_text, team_names},
};

const MATCH_NAME_SUFFIXES: &[&str] = &[" - Live Cricket Score", " Live Score", " - Scorecard"];
const UNKNOWN_VENUE: &str = "Unknown";

static VENUE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"a[href*="/venues/"]"#).unwrap());
static GROUND_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="/cricket-grounds/"]"#).unwrap());
static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static RESULT_BANNER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#sticky-mcomplete div div").unwrap());
static INFO_ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".cb-mtch-info-itm, .facts-row-grid, .cb-col-100.cb-col").unwrap());

static RESULT_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)won by|match tied|no result").unwrap());
static UMPIRES_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Umpires:?\s*").unwrap());
static TV_UMPIRE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^3rd Umpire:?\s*").unwrap());
static REFEREE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Referee:?\s*").unwrap());

/// Whatever one page told us about a match. Every field is optional; pages
/// are combined with [`MatchDetails::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchDetails {
    pub venue: Option<String>,
    pub match_name: Option<String>,
    pub winner: Option<String>,
    pub officials: Officials,
}

impl MatchDetails {
    /// First non-null wins: a field set by `self` is never replaced by `later`.
    pub fn merge(self, later: MatchDetails) -> MatchDetails {
        MatchDetails {
            venue: self.venue.or(later.venue),
            match_name: self.match_name.or(later.match_name),
            winner: self.winner.or(later.winner),
            officials: self.officials.merge(later.officials),
        }
    }

    pub fn format(&self) -> MatchFormat {
        self.match_name
            .as_deref()
            .map(MatchFormat::from_match_name)
            .unwrap_or(MatchFormat::Unknown)
    }

    /// Turns resolved details into a stored record. Without a validated
    /// winner the match is upcoming or indeterminate and nothing is kept.
    pub fn into_record(self, candidate: &MatchCandidate) -> Option<MatchRecord> {
        let format = self.format();
        let winner = self.winner?;
        Some(MatchRecord {
            match_id: candidate.match_id.clone(),
            teams: candidate.teams.clone(),
            match_name: self.match_name.unwrap_or_else(|| candidate.teams.clone()),
            format,
            winner,
            venue: self.venue.unwrap_or_else(|| UNKNOWN_VENUE.to_string()),
            officials: self.officials,
        })
    }
}

/// Folds page details left to right, earlier pages taking precedence.
pub fn resolve_cascade<I>(pages: I) -> MatchDetails
where
    I: IntoIterator<Item = MatchDetails>,
{
    pages.into_iter().fold(MatchDetails::default(), MatchDetails::merge)
}

fn extract_venue(document: &Html) -> Option<String> {
    document
        .select(&VENUE_SELECTOR)
        .next()
        .or_else(|| document.select(&GROUND_SELECTOR).next())
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|venue| !venue.is_empty())
}

fn extract_match_name(document: &Html) -> Option<String> {
    let heading = document.select(&HEADING_SELECTOR).next()?;
    let mut name = collapse_whitespace(&heading.text().collect::<String>());
    for suffix in MATCH_NAME_SUFFIXES {
        name = name.replace(suffix, "");
    }
    let name = name.trim().to_string();
    (!name.is_empty()).then_some(name)
}

fn validated_winner(text: String, teams: &[String]) -> Option<String> {
    if !text.is_empty() && mentions_any_team(&text, teams) {
        Some(text)
    } else {
        debug!("Discarding result text that names neither team: {:?}", text);
        None
    }
}

fn is_script_like(element: &ElementRef) -> bool {
    matches!(element.value().name(), "script" | "style" | "noscript")
}

/// Text of the element around the first text node that reads like a result.
fn find_result_text(document: &Html) -> Option<String> {
    document.root_element().descendants().find_map(|node| {
        let text = node.value().as_text()?;
        if !RESULT_TEXT.is_match(text) {
            return None;
        }
        let parent = node.parent().and_then(ElementRef::wrap)?;
        if is_script_like(&parent) {
            return None;
        }
        Some(clean_text(&parent.text().collect::<String>()))
    })
}

/// Details readable from the live scores page: venue, heading and the
/// result banner.
pub fn parse_live_page(document: &Html, teams: &str) -> MatchDetails {
    let teams = team_names(teams);
    let winner = document
        .select(&RESULT_BANNER_SELECTOR)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .and_then(|text| validated_winner(text, &teams));

    MatchDetails {
        venue: extract_venue(document),
        match_name: extract_match_name(document),
        winner,
        officials: Officials::default(),
    }
}

/// Details readable from the match facts page: venue, result and officials.
pub fn parse_facts_page(document: &Html, teams: &str) -> MatchDetails {
    let teams = team_names(teams);
    let winner = find_result_text(document).and_then(|text| validated_winner(text, &teams));

    MatchDetails {
        venue: extract_venue(document),
        match_name: None,
        winner,
        officials: parse_officials(document),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Reads umpires, TV umpire and referee from the facts info rows. A later
/// row overwrites an earlier one, so a nested row beats its container.
pub fn parse_officials(document: &Html) -> Officials {
    let mut officials = Officials::default();

    for row in document.select(&INFO_ROW_SELECTOR) {
        let text = spaced_text(&row);

        if text.starts_with("Umpires") {
            let names = UMPIRES_PREFIX.replace(&text, "");
            let mut names = names.split(',').filter_map(non_empty);
            officials.umpire_1 = names.next();
            officials.umpire_2 = names.next();
        } else if text.starts_with("3rd Umpire") {
            officials.tv_umpire = non_empty(&TV_UMPIRE_PREFIX.replace(&text, ""));
        } else if text.starts_with("Referee") {
            officials.match_referee = non_empty(&REFEREE_PREFIX.replace(&text, ""));
        }
    }

    officials
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEAMS: &str = "India vs Australia";

    fn candidate() -> MatchCandidate {
        MatchCandidate {
            match_id: "121406".to_string(),
            slug: "ind-vs-aus-3rd-test".to_string(),
            teams: TEAMS.to_string(),
        }
    }

    #[test]
    fn test_merge_first_non_null_wins() {
        let live = MatchDetails {
            venue: Some("Wankhede Stadium".to_string()),
            match_name: None,
            winner: None,
            officials: Officials::default(),
        };
        let facts = MatchDetails {
            venue: Some("Somewhere Else".to_string()),
            match_name: Some("3rd Test".to_string()),
            winner: Some("India won by 5 wkts".to_string()),
            officials: Officials::default(),
        };

        let merged = resolve_cascade([live, facts]);
        assert_eq!(merged.venue.as_deref(), Some("Wankhede Stadium"));
        assert_eq!(merged.match_name.as_deref(), Some("3rd Test"));
        assert_eq!(merged.winner.as_deref(), Some("India won by 5 wkts"));
    }

    #[test]
    fn test_live_page_parsing() {
        let doc = Html::parse_document(
            r#"<html><body>
                <h1>India vs Australia, 3rd Test, Australia tour of India 2025 - Live Cricket Score</h1>
                <a href="/cricket-series/1/australia-tour-of-india">Series</a>
                <a href="/cricket-stadium/venues/31/wankhede-stadium">  Wankhede   Stadium, Mumbai </a>
                <div id="sticky-mcomplete"><div><div>Australia won by 6 wkts</div></div></div>
            </body></html>"#,
        );

        let details = parse_live_page(&doc, TEAMS);
        assert_eq!(details.venue.as_deref(), Some("Wankhede Stadium, Mumbai"));
        assert_eq!(
            details.match_name.as_deref(),
            Some("India vs Australia, 3rd Test, Australia tour of India 2025")
        );
        assert_eq!(details.format(), MatchFormat::Test);
        assert_eq!(details.winner.as_deref(), Some("Australia won by 6 wkts"));
        assert!(details.officials.is_empty());
    }

    #[test]
    fn test_banner_naming_other_teams_is_rejected() {
        let doc = Html::parse_document(
            r#"<div id="sticky-mcomplete"><div><div>England won by 3 runs</div></div></div>"#,
        );
        assert_eq!(parse_live_page(&doc, TEAMS).winner, None);
    }

    #[test]
    fn test_facts_page_parsing() {
        let doc = Html::parse_document(
            r#"<html><head><script>var x = "Pakistan won by 10 runs";</script></head><body>
                <div class="cb-col-100 cb-col"><span>Match</span><span>3rd Test</span></div>
                <div class="cb-mtch-info-itm"><span>Umpires:</span><span>Richard Illingworth, Michael Gough, Extra Name</span></div>
                <div class="cb-mtch-info-itm"><span>3rd Umpire:</span><span>Joel Wilson</span></div>
                <div class="cb-mtch-info-itm"><span>Referee:</span><span>Javagal Srinath</span></div>
                <a href="/cricket-grounds/5/wankhede">Wankhede Stadium</a>
                <p><b>Result</b> <span>India won by 5 wkts (with 12 balls remaining)</span></p>
            </body></html>"#,
        );

        let details = parse_facts_page(&doc, TEAMS);
        assert_eq!(details.venue.as_deref(), Some("Wankhede Stadium"));
        assert_eq!(details.match_name, None);
        assert_eq!(
            details.winner.as_deref(),
            Some("India won by 5 wkts (with 12 balls remaining)")
        );
        assert_eq!(
            details.officials,
            Officials {
                umpire_1: Some("Richard Illingworth".to_string()),
                umpire_2: Some("Michael Gough".to_string()),
                tv_umpire: Some("Joel Wilson".to_string()),
                match_referee: Some("Javagal Srinath".to_string()),
            }
        );
    }

    #[test]
    fn test_officials_are_independently_optional() {
        let doc = Html::parse_document(
            r#"<div class="facts-row-grid">Umpires Nitin Menon</div>
               <div class="facts-row-grid">Referee</div>
               <div class="facts-row-grid">Toss India</div>"#,
        );
        let officials = parse_officials(&doc);
        assert_eq!(officials.umpire_1.as_deref(), Some("Nitin Menon"));
        assert_eq!(officials.umpire_2, None);
        assert_eq!(officials.tv_umpire, None);
        assert_eq!(officials.match_referee, None);
    }

    #[test]
    fn test_tie_and_no_result_are_winners_when_teams_are_named() {
        let doc = Html::parse_document("<p>Match tied (India won the Super Over)</p>");
        assert_eq!(
            parse_facts_page(&doc, TEAMS).winner.as_deref(),
            Some("Match tied (India won the Super Over)")
        );

        let doc = Html::parse_document("<p>No result</p>");
        assert_eq!(parse_facts_page(&doc, TEAMS).winner, None);
    }

    #[test]
    fn test_into_record_fallbacks() {
        let details = MatchDetails {
            winner: Some("India won by 5 wkts".to_string()),
            ..Default::default()
        };
        let record = details.into_record(&candidate()).unwrap();
        assert_eq!(record.match_name, TEAMS);
        assert_eq!(record.venue, "Unknown");
        assert_eq!(record.format, MatchFormat::Unknown);
    }

    #[test]
    fn test_into_record_without_winner_is_rejected() {
        let details = MatchDetails {
            venue: Some("Eden Gardens".to_string()),
            match_name: Some("1st T20I".to_string()),
            ..Default::default()
        };
        assert_eq!(details.into_record(&candidate()), None);
    }
}
