use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Abbreviations used in Cricbuzz URL slugs, mapped to full team names.
pub const TEAM_ABBREVIATIONS: &[(&str, &str)] = &[
    ("IND", "India"),
    ("NZ", "New Zealand"),
    ("AUS", "Australia"),
    ("ENG", "England"),
    ("RSA", "South Africa"),
    ("SA", "South Africa"),
    ("PAK", "Pakistan"),
    ("WI", "West Indies"),
    ("SL", "Sri Lanka"),
    ("BAN", "Bangladesh"),
    ("AFG", "Afghanistan"),
    ("ZIM", "Zimbabwe"),
    ("IRE", "Ireland"),
    ("ITA", "Italy"),
    ("SCO", "Scotland"),
    ("NED", "Netherlands"),
];

/// Player roles as they appear glued to the end of squad link text.
///
/// Checked in order, so a role that ends with another role's text
/// ("WK-Batter" vs "Batter") has to come first.
pub const KNOWN_ROLES: &[&str] = &[
    "Batting Allrounder",
    "Bowling Allrounder",
    "WK-Batter",
    "Batter",
    "Bowler",
    "Head Coach",
    "Assistant coach",
    "Fielding Coach",
    "Batting Coach",
    "Bowling Coach",
    "Coach",
];

/// A match link found on the listing page that has not been resolved yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub match_id: String,
    pub slug: String,
    pub teams: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchFormat {
    T20I,
    #[serde(rename = "ODI")]
    Odi,
    Test,
    Unknown,
}

impl MatchFormat {
    /// Keyword scan over a match name. T20I wins over ODI, ODI over Test.
    pub fn from_match_name(name: &str) -> Self {
        let upper = name.to_uppercase();
        if upper.contains("T20I") {
            MatchFormat::T20I
        } else if upper.contains("ODI") {
            MatchFormat::Odi
        } else if upper.contains("TEST") {
            MatchFormat::Test
        } else {
            MatchFormat::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchFormat::T20I => "T20I",
            MatchFormat::Odi => "ODI",
            MatchFormat::Test => "Test",
            MatchFormat::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "T20I" => MatchFormat::T20I,
            "ODI" => MatchFormat::Odi,
            "Test" => MatchFormat::Test,
            _ => MatchFormat::Unknown,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officials {
    pub umpire_1: Option<String>,
    pub umpire_2: Option<String>,
    pub tv_umpire: Option<String>,
    pub match_referee: Option<String>,
}

impl Officials {
    /// Field-by-field merge where values already present are kept.
    pub fn merge(self, later: Officials) -> Officials {
        Officials {
            umpire_1: self.umpire_1.or(later.umpire_1),
            umpire_2: self.umpire_2.or(later.umpire_2),
            tv_umpire: self.tv_umpire.or(later.tv_umpire),
            match_referee: self.match_referee.or(later.match_referee),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.umpire_1.is_none()
            && self.umpire_2.is_none()
            && self.tv_umpire.is_none()
            && self.match_referee.is_none()
    }
}

/// An accepted match, as stored in the `matches` and `officials` tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: String,
    pub teams: String,
    pub match_name: String,
    pub format: MatchFormat,
    pub winner: String,
    pub venue: String,
    pub officials: Officials,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerProfile {
    pub birth_date: Option<String>,
    pub birth_place: Option<String>,
    pub nickname: Option<String>,
    pub height: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub player_id: i64,
    pub name: String,
    pub role: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub profile: PlayerProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SquadMembership {
    pub match_id: String,
    pub player_id: i64,
    pub team: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_priority() {
        assert_eq!(MatchFormat::from_match_name("India vs Australia, 3rd Test"), MatchFormat::Test);
        assert_eq!(MatchFormat::from_match_name("1st ODI, Australia tour of India"), MatchFormat::Odi);
        assert_eq!(MatchFormat::from_match_name("2nd t20i"), MatchFormat::T20I);
        assert_eq!(MatchFormat::from_match_name("T20I after the Test series"), MatchFormat::T20I);
        assert_eq!(MatchFormat::from_match_name("Warm-up match"), MatchFormat::Unknown);
    }

    #[test]
    fn test_format_round_trips_through_column_text() {
        for format in [MatchFormat::T20I, MatchFormat::Odi, MatchFormat::Test, MatchFormat::Unknown] {
            assert_eq!(format.as_str().parse::<MatchFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_officials_merge_keeps_existing_values() {
        let first = Officials {
            umpire_1: Some("Richard Illingworth".to_string()),
            ..Default::default()
        };
        let second = Officials {
            umpire_1: Some("Someone Else".to_string()),
            match_referee: Some("Javagal Srinath".to_string()),
            ..Default::default()
        };
        let merged = first.merge(second);
        assert_eq!(merged.umpire_1.as_deref(), Some("Richard Illingworth"));
        assert_eq!(merged.match_referee.as_deref(), Some("Javagal Srinath"));
        assert!(merged.tv_umpire.is_none());
    }

    #[test]
    fn test_role_order_puts_longer_suffixes_first() {
        for (i, role) in KNOWN_ROLES.iter().enumerate() {
            for later in &KNOWN_ROLES[i + 1..] {
                assert!(
                    !later.ends_with(role),
                    "{later} must be checked before {role}"
                );
            }
        }
    }
}
