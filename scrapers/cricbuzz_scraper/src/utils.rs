use scraper::ElementRef;

use crate::types::{KNOWN_ROLES, TEAM_ABBREVIATIONS};

/// Maximum number of characters kept by [`clean_text`].
pub const MAX_TEXT_LEN: usize = 100;

const UNKNOWN_TEAM: &str = "Unknown";
const SQUADS_TITLE_PREFIX: &str = "Cricket match squads | ";
const TITLE_STOP_TOKENS: &[&str] = &[
    ",", "Squads", "Scorecard", "Live", "Match", "1st", "2nd", "3rd", "4th", "5th", "T20I", "ODI",
    "Test",
];

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses whitespace runs and caps the result at [`MAX_TEXT_LEN`] characters.
pub fn clean_text(text: &str) -> String {
    collapse_whitespace(text).chars().take(MAX_TEXT_LEN).collect()
}

/// Text of an element with every text node trimmed and glued back together
/// without separators.
pub fn stripped_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Text of an element with every text node trimmed and joined by single spaces.
pub fn spaced_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-cases every letter that follows a non-letter and lower-cases the rest.
pub fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_is_letter = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

fn resolve_team_token(token: &str) -> String {
    TEAM_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == token)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| title_case(token))
}

/// Turns a slug like `ind-vs-aus-3rd-test` into `India vs Australia`.
pub fn teams_from_slug(slug: &str) -> String {
    let upper = slug.to_uppercase();
    let parts: Vec<&str> = upper.split('-').collect();

    let Some(idx) = parts.iter().position(|p| *p == "VS") else {
        return format!("{UNKNOWN_TEAM} vs {UNKNOWN_TEAM}");
    };

    let team1 = idx
        .checked_sub(1)
        .map(|i| resolve_team_token(parts[i]))
        .unwrap_or_else(|| UNKNOWN_TEAM.to_string());
    let team2 = parts
        .get(idx + 1)
        .map(|token| resolve_team_token(token))
        .unwrap_or_else(|| UNKNOWN_TEAM.to_string());

    format!("{team1} vs {team2}")
}

/// Lower-cased team names of a `"A vs B"` string, used for winner validation.
pub fn team_names(teams: &str) -> Vec<String> {
    teams
        .split(" vs ")
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn mentions_any_team(text: &str, teams: &[String]) -> bool {
    let lower = text.to_lowercase();
    teams.iter().any(|team| lower.contains(team.as_str()))
}

/// Splits `"Kristian ClarkeBowler"` into `("Kristian Clarke", Some("Bowler"))`.
pub fn split_name_role(label: &str) -> (String, Option<String>) {
    let label = label.trim();
    for role in KNOWN_ROLES {
        if let Some(name) = label.strip_suffix(role) {
            return (name.trim().to_string(), Some(role.to_string()));
        }
    }
    (label.to_string(), None)
}

/// Pulls both team names out of a squads page title such as
/// `"Cricket match squads | India vs Australia, 3rd Test"`.
pub fn teams_from_title(title: &str) -> (String, String) {
    let mut pieces = title.split(" vs ");
    let (Some(first), Some(remainder)) = (pieces.next(), pieces.next()) else {
        return ("Unknown A".to_string(), "Unknown B".to_string());
    };

    let end = TITLE_STOP_TOKENS
        .iter()
        .filter_map(|token| remainder.find(token))
        .min()
        .unwrap_or(remainder.len());

    let team1 = first.trim().replace(SQUADS_TITLE_PREFIX, "");
    let team2 = remainder[..end].trim().replace(SQUADS_TITLE_PREFIX, "");
    (team1, team2)
}
