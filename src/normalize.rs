use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::team::{self, TeamDetails};

// Keys an object may wrap a list under. Anything else at the root yields an empty list.
pub const PLAYER_LIST_KEYS: &[&str] = &["players"];
pub const GAME_LIST_KEYS: &[&str] = &["recent_games", "games"];

// Accepted aliases per canonical field, highest priority first.
pub const PLAYER_ID_KEYS: &[&str] = &["player_id", "id", "playerId"];
pub const PLAYER_NAME_KEYS: &[&str] = &["player_name", "name", "full_name", "playerName"];
pub const GAME_DATE_KEYS: &[&str] = &["date", "game_date", "gameDate"];
pub const GAME_PTS_KEYS: &[&str] = &["pts"];
pub const GAME_MIN_KEYS: &[&str] = &["min"];
pub const GAME_FG_PCT_KEYS: &[&str] = &["fg_pct", "fgPct"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::Number(num) => write!(f, "{num}"),
            PlayerId::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlayerRow", into = "PlayerRow")]
pub struct PlayerRef {
    pub player_id: PlayerId,
    pub player_name: String,
    // Roster context some player lists carry; only used as a team fallback.
    pub team_hint: Option<TeamDetails>,
}

// Wire shape of a player: the hint travels under the roster keys the players
// list uses, so canonical output normalizes back to itself.
#[derive(Serialize, Deserialize)]
struct PlayerRow {
    player_id: PlayerId,
    player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    conference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    team_abbr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    team_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    team_colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    team_logo: Option<String>,
}

impl From<PlayerRef> for PlayerRow {
    fn from(player: PlayerRef) -> Self {
        let hint = player.team_hint.unwrap_or_default();
        Self {
            player_id: player.player_id,
            player_name: player.player_name,
            team_name: hint.team_name,
            conference: hint.conference,
            team_abbr: hint.abbreviation,
            team_city: hint.city,
            team_colors: hint.colors,
            team_logo: hint.logo_url,
        }
    }
}

impl From<PlayerRow> for PlayerRef {
    fn from(row: PlayerRow) -> Self {
        let hint = TeamDetails {
            team_name: row.team_name,
            conference: row.conference,
            abbreviation: row.team_abbr,
            city: row.team_city,
            colors: row.team_colors,
            logo_url: row.team_logo,
        };
        Self {
            player_id: row.player_id,
            player_name: row.player_name,
            team_hint: (!hint.is_empty()).then_some(hint),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GameRecord {
    pub date: Option<String>,
    pub pts: Option<f64>,
    pub min: Option<f64>,
    pub fg_pct: Option<f64>,
}

/// Players without a resolvable id or a non-blank name are dropped.
pub fn normalize_players(raw: &Value) -> Vec<PlayerRef> {
    list_items(raw, PLAYER_LIST_KEYS)
        .iter()
        .filter_map(normalize_player)
        .collect()
}

/// One record per source entry, in source order. Unresolvable fields become `None`.
pub fn normalize_games(raw: &Value) -> Vec<GameRecord> {
    list_items(raw, GAME_LIST_KEYS)
        .iter()
        .map(normalize_game)
        .collect()
}

fn normalize_player(item: &Value) -> Option<PlayerRef> {
    let player_id = pick(item, PLAYER_ID_KEYS).and_then(as_player_id)?;
    let player_name = pick(item, PLAYER_NAME_KEYS)
        .and_then(as_text)
        .filter(|name| !name.is_empty())?;
    Some(PlayerRef {
        player_id,
        player_name,
        team_hint: team::team_from_player_item(item),
    })
}

fn normalize_game(item: &Value) -> GameRecord {
    GameRecord {
        date: pick(item, GAME_DATE_KEYS).and_then(as_text),
        pts: pick(item, GAME_PTS_KEYS).and_then(as_f64),
        min: pick(item, GAME_MIN_KEYS).and_then(as_f64),
        fg_pct: pick(item, GAME_FG_PCT_KEYS).and_then(as_f64),
    }
}

fn list_items<'a>(raw: &'a Value, wrapper_keys: &[&str]) -> &'a [Value] {
    match raw {
        Value::Array(items) => items,
        Value::Object(map) => wrapper_keys
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// First alias whose value is present and not `null`.
pub(crate) fn pick<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| value.get(*key).filter(|v| !v.is_null()))
}

pub(crate) fn pick_text(value: &Value, keys: &[&str]) -> Option<String> {
    pick(value, keys).and_then(as_text)
}

pub(crate) fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    pick(value, keys).and_then(as_f64)
}

pub(crate) fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    let num = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    num.is_finite().then_some(num)
}

/// `deserialize_with` helper: null, a missing key or a non-number reads as 0.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(deserializer)?.unwrap_or(0.0))
}

pub(crate) fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(as_f64(&raw))
}

/// A nested object that does not match its type reads as `None`.
pub(crate) fn lenient_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(raw).ok())
}

fn as_player_id(value: &Value) -> Option<PlayerId> {
    match value {
        Value::Number(n) => {
            if let Some(num) = n.as_i64() {
                return Some(PlayerId::Number(num));
            }
            let float = n.as_f64()?;
            (float.is_finite() && float.fract() == 0.0 && float.abs() < i64::MAX as f64)
                .then(|| PlayerId::Number(float as i64))
        }
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| PlayerId::Text(trimmed.to_string()))
        }
        _ => None,
    }
}
