use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{self, PlayerId, PlayerRef};

const BUILTIN_OVERRIDES: &str = include_str!("../data/team_overrides.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TeamDetails {
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl TeamDetails {
    pub fn is_empty(&self) -> bool {
        self.team_name.is_none()
            && self.conference.is_none()
            && self.abbreviation.is_none()
            && self.city.is_none()
            && self.colors.is_none()
            && self.logo_url.is_none()
    }

    /// Fields set on `other` win.
    pub fn overlay(&mut self, other: &TeamDetails) {
        if other.team_name.is_some() {
            self.team_name = other.team_name.clone();
        }
        if other.conference.is_some() {
            self.conference = other.conference.clone();
        }
        if other.abbreviation.is_some() {
            self.abbreviation = other.abbreviation.clone();
        }
        if other.city.is_some() {
            self.city = other.city.clone();
        }
        if other.colors.is_some() {
            self.colors = other.colors.clone();
        }
        if other.logo_url.is_some() {
            self.logo_url = other.logo_url.clone();
        }
    }

    fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

/// Team fields from a prediction response: the nested `team` object when present,
/// otherwise the response root.
pub fn team_from_payload(root: &Value) -> Option<TeamDetails> {
    let src = root
        .get("team")
        .filter(|v| v.is_object())
        .unwrap_or(root);
    TeamDetails {
        team_name: text(src, &["team_name", "teamName", "team"]),
        conference: text(src, &["conference"]),
        abbreviation: text(src, &["abbreviation", "abbr"]),
        city: text(src, &["city"]),
        colors: colors(src, &["colors"]),
        logo_url: text(src, &["logo_url", "logo"]),
    }
    .non_empty()
}

/// Roster context carried on a players-list item.
pub fn team_from_player_item(item: &Value) -> Option<TeamDetails> {
    TeamDetails {
        team_name: text(item, &["team_name", "team"]),
        conference: text(item, &["conference"]),
        abbreviation: text(item, &["team_abbr", "team_abbreviation"]),
        city: text(item, &["team_city", "city"]),
        colors: colors(item, &["team_colors"]),
        logo_url: text(item, &["team_logo"]),
    }
    .non_empty()
}

/// Keyed by the id's string form, so `7` and `"7"` share an entry.
#[derive(Debug, Clone, Default)]
pub struct TeamOverrides {
    by_player: HashMap<String, TeamDetails>,
}

impl TeamOverrides {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_OVERRIDES)
    }

    /// Parses `{ "<player id>": { team fields... } }`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Self::default());
        }
        let table: HashMap<String, TeamDetails> =
            serde_json::from_str(trimmed).context("invalid team override json")?;
        Ok(Self {
            by_player: table
                .into_iter()
                .map(|(key, details)| (key.trim().to_string(), details))
                .collect(),
        })
    }

    pub fn insert(&mut self, player_id: &PlayerId, details: TeamDetails) {
        self.by_player.insert(player_id.to_string(), details);
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&TeamDetails> {
        self.by_player.get(&player_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.by_player.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty()
    }
}

/// API fields first; the players-list hint only when the API had none; the
/// override table on top of either. Always returns a value, possibly all-empty.
pub fn resolve_team_details(
    from_api: Option<&TeamDetails>,
    player: Option<&PlayerRef>,
    overrides: &TeamOverrides,
    player_id: &PlayerId,
) -> TeamDetails {
    let mut details = from_api
        .cloned()
        .or_else(|| player.and_then(|p| p.team_hint.clone()))
        .unwrap_or_default();
    if let Some(mapped) = overrides.get(player_id) {
        details.overlay(mapped);
    }
    details
}

fn text(value: &Value, keys: &[&str]) -> Option<String> {
    normalize::pick_text(value, keys).filter(|s| !s.is_empty())
}

fn colors(value: &Value, keys: &[&str]) -> Option<Vec<String>> {
    let raw = normalize::pick(value, keys)?;
    let list: Vec<String> = match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(normalize::as_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    };
    (!list.is_empty()).then_some(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn player(id: i64, hint: Option<TeamDetails>) -> PlayerRef {
        PlayerRef {
            player_id: PlayerId::Number(id),
            player_name: format!("P{id}"),
            team_hint: hint,
        }
    }

    #[test]
    fn nested_team_object_wins_over_root() {
        let root = json!({
            "predicted_points": 20.0,
            "city": "Root City",
            "team": { "teamName": "Bucks", "abbr": "MIL", "logo": "l.svg", "colors": ["#00471B"] }
        });
        let team = team_from_payload(&root).unwrap();
        assert_eq!(team.team_name.as_deref(), Some("Bucks"));
        assert_eq!(team.abbreviation.as_deref(), Some("MIL"));
        assert_eq!(team.logo_url.as_deref(), Some("l.svg"));
        assert_eq!(team.city, None);
        assert_eq!(team.colors, Some(vec!["#00471B".to_string()]));
    }

    #[test]
    fn all_null_team_yields_none() {
        let root = json!({ "team": { "team_name": null, "city": null } });
        assert!(team_from_payload(&root).is_none());
        assert!(team_from_payload(&json!({ "predicted_points": 3 })).is_none());
    }

    #[test]
    fn root_fields_used_without_team_object() {
        let root = json!({ "team": "Lakers", "conference": "West" });
        let team = team_from_payload(&root).unwrap();
        assert_eq!(team.team_name.as_deref(), Some("Lakers"));
        assert_eq!(team.conference.as_deref(), Some("West"));
    }

    #[test]
    fn player_hint_only_used_when_api_is_silent() {
        let hint = TeamDetails {
            team_name: Some("Hint".to_string()),
            ..TeamDetails::default()
        };
        let api = TeamDetails {
            city: Some("Api City".to_string()),
            ..TeamDetails::default()
        };
        let p = player(1, Some(hint));
        let overrides = TeamOverrides::default();

        let with_api = resolve_team_details(Some(&api), Some(&p), &overrides, &p.player_id);
        assert_eq!(with_api.team_name, None);
        assert_eq!(with_api.city.as_deref(), Some("Api City"));

        let without_api = resolve_team_details(None, Some(&p), &overrides, &p.player_id);
        assert_eq!(without_api.team_name.as_deref(), Some("Hint"));
    }

    #[test]
    fn overrides_take_highest_priority() {
        let mut overrides = TeamOverrides::from_json(
            r#"{ "2544": { "team_name": "Los Angeles Lakers", "abbreviation": "LAL" } }"#,
        )
        .unwrap();
        let api = TeamDetails {
            team_name: Some("Api".to_string()),
            city: Some("LA".to_string()),
            ..TeamDetails::default()
        };
        let id = PlayerId::Number(2544);
        let merged = resolve_team_details(Some(&api), None, &overrides, &id);
        assert_eq!(merged.team_name.as_deref(), Some("Los Angeles Lakers"));
        assert_eq!(merged.abbreviation.as_deref(), Some("LAL"));
        assert_eq!(merged.city.as_deref(), Some("LA"));

        overrides.insert(
            &PlayerId::Number(7),
            TeamDetails {
                conference: Some("East".to_string()),
                ..TeamDetails::default()
            },
        );
        let only_override = resolve_team_details(None, None, &overrides, &PlayerId::Number(7));
        assert_eq!(only_override.conference.as_deref(), Some("East"));
        let nothing = resolve_team_details(None, None, &overrides, &PlayerId::Number(8));
        assert!(nothing.is_empty());
    }

    #[test]
    fn override_matches_numeric_and_text_ids() {
        let overrides =
            TeamOverrides::from_json(r#"{ "1629029": { "team_name": "Dallas Mavericks" } }"#)
                .unwrap();
        for id in [PlayerId::Text("1629029".to_string()), PlayerId::Number(1629029)] {
            let merged = resolve_team_details(None, None, &overrides, &id);
            assert_eq!(merged.team_name.as_deref(), Some("Dallas Mavericks"));
        }
    }

    #[test]
    fn builtin_table_parses() {
        assert!(TeamOverrides::builtin().is_ok());
        assert!(TeamOverrides::from_json("").unwrap().is_empty());
        assert!(TeamOverrides::from_json("[1, 2]").is_err());
    }
}
