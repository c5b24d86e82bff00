use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{
    types::PlayerProfile,
    utils::{split_name_role, stripped_text, teams_from_title},
};

/// Players taken from each team column.
pub const MAX_SQUAD_SIZE: usize = 11;

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static COLUMN_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"div[class~="w-1/2"]"#).unwrap());
static PROFILE_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="/profiles/"]"#).unwrap());
static DIV_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div").unwrap());
static PROFILE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/profiles/(\d+)/").unwrap());

/// Profile labels and the field each one fills.
const PROFILE_LABELS: &[(&str, ProfileField)] = &[
    ("Born", ProfileField::BirthDate),
    ("Birth Place", ProfileField::BirthPlace),
    ("Nickname", ProfileField::Nickname),
    ("Height", ProfileField::Height),
    ("Batting Style", ProfileField::BattingStyle),
    ("Bowling Style", ProfileField::BowlingStyle),
];

#[derive(Debug, Clone, Copy)]
enum ProfileField {
    BirthDate,
    BirthPlace,
    Nickname,
    Height,
    BattingStyle,
    BowlingStyle,
}

impl PlayerProfile {
    fn slot(&mut self, field: ProfileField) -> &mut Option<String> {
        match field {
            ProfileField::BirthDate => &mut self.birth_date,
            ProfileField::BirthPlace => &mut self.birth_place,
            ProfileField::Nickname => &mut self.nickname,
            ProfileField::Height => &mut self.height,
            ProfileField::BattingStyle => &mut self.batting_style,
            ProfileField::BowlingStyle => &mut self.bowling_style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadEntry {
    pub player_id: i64,
    pub name: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSquad {
    pub team: String,
    pub players: Vec<SquadEntry>,
}

pub fn player_id_from_href(href: &str) -> Option<i64> {
    PROFILE_ID.captures(href).and_then(|caps| caps[1].parse().ok())
}

fn parse_column(column: ElementRef, team: String) -> TeamSquad {
    let players = column
        .select(&PROFILE_LINK_SELECTOR)
        .take(MAX_SQUAD_SIZE)
        .filter_map(|link| {
            let player_id = player_id_from_href(link.value().attr("href")?)?;
            let (name, role) = split_name_role(&link.text().collect::<String>());
            Some(SquadEntry { player_id, name, role })
        })
        .collect();
    TeamSquad { team, players }
}

/// Reads both team columns of a squads page. Returns `None` when the page
/// does not have the two-column layout.
pub fn parse_squads_page(document: &Html) -> Option<[TeamSquad; 2]> {
    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();
    let (team1, team2) = teams_from_title(&title);

    let mut columns = document.select(&COLUMN_SELECTOR);
    let first = columns.next()?;
    let second = columns.next()?;

    Some([parse_column(first, team1), parse_column(second, team2)])
}

fn is_label(text: &str) -> bool {
    PROFILE_LABELS.iter().any(|(label, _)| *label == text)
}

fn child_divs<'a>(parent: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "div")
        .collect()
}

/// Value paired with `label` among the parent's child divs.
fn value_from_parent(label_div: &ElementRef, label: &str) -> Option<String> {
    let parent = label_div.parent().and_then(ElementRef::wrap)?;
    let children = child_divs(parent);
    let idx = children.iter().position(|child| stripped_text(child) == label)?;
    let value = stripped_text(children.get(idx + 1)?);
    (!value.is_empty() && value != label).then_some(value)
}

fn value_from_next_sibling(label_div: &ElementRef) -> Option<String> {
    let next = label_div
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "div")?;
    let value = stripped_text(&next);
    (!value.is_empty() && !is_label(&value)).then_some(value)
}

/// Extracts biography fields from a player profile page.
///
/// Labels and values sit in sibling divs. The value is read from the div
/// after the label among the parent's children, falling back to the label's
/// own next sibling div.
pub fn parse_profile_page(document: &Html) -> PlayerProfile {
    let mut profile = PlayerProfile::default();

    for div in document.select(&DIV_SELECTOR) {
        let text = stripped_text(&div);
        let Some((label, field)) = PROFILE_LABELS.iter().find(|(label, _)| *label == text) else {
            continue;
        };

        if let Some(value) = value_from_parent(&div, label) {
            *profile.slot(*field) = Some(value);
        }
        let slot = profile.slot(*field);
        if slot.is_none() {
            *slot = value_from_next_sibling(&div);
        }
    }

    profile
}
