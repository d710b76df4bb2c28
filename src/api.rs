use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::RequestBuilder;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::ApiConfig;
use crate::http_client::http_client;
use crate::metrics::FormSummary;
use crate::normalize::{self, GameRecord, PlayerId, PlayerRef};
use crate::team::{self, TeamDetails};

/// Everything the dashboard reads from the prediction service.
pub trait StatsApi: Send + Sync {
    fn players(&self) -> Result<Vec<PlayerRef>>;
    fn recent_games(&self, player_id: &PlayerId) -> Result<Vec<GameRecord>>;
    fn predict(&self, player_id: &PlayerId) -> Result<PredictionResult>;
    fn standings(&self) -> Result<Standings>;
    fn schedule(&self) -> Result<Vec<ScheduledGame>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConfidenceLabel {
    Small,
    Medium,
    Large,
    Other(String),
}

impl From<String> for ConfidenceLabel {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Small" => ConfidenceLabel::Small,
            "Medium" => ConfidenceLabel::Medium,
            "Large" => ConfidenceLabel::Large,
            _ => ConfidenceLabel::Other(raw),
        }
    }
}

impl From<ConfidenceLabel> for String {
    fn from(label: ConfidenceLabel) -> Self {
        label.as_str().to_string()
    }
}

impl Default for ConfidenceLabel {
    fn default() -> Self {
        ConfidenceLabel::Other(String::new())
    }
}

impl ConfidenceLabel {
    pub fn as_str(&self) -> &str {
        match self {
            ConfidenceLabel::Small => "Small",
            ConfidenceLabel::Medium => "Medium",
            ConfidenceLabel::Large => "Large",
            ConfidenceLabel::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    #[serde(default, deserialize_with = "label_from_value")]
    pub label: ConfidenceLabel,
    // +/- points around the prediction.
    #[serde(default, deserialize_with = "normalize::lenient_f64")]
    pub band: f64,
    #[serde(default, deserialize_with = "normalize::lenient_opt_f64")]
    pub std: Option<f64>,
}

/// Labelled form notes the service attaches next to the numeric summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FormNotes {
    #[serde(default, deserialize_with = "normalize::lenient_opt_f64")]
    pub avg_pts_5: Option<f64>,
    #[serde(default)]
    pub minutes_stability: Option<String>,
    #[serde(default)]
    pub scoring_trend: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionResult {
    pub predicted_points: f64,
    pub model_prediction: f64,
    #[serde(default, deserialize_with = "normalize::lenient_opt_f64")]
    pub recent_avg_points: Option<f64>,
    #[serde(default, deserialize_with = "normalize::lenient_opt")]
    pub confidence: Option<Confidence>,
    #[serde(default, deserialize_with = "normalize::lenient_opt")]
    pub explanation: Option<String>,
    // The service sends the numeric summary as `summary` and the labelled one as
    // `form_summary`.
    #[serde(default, rename = "summary", deserialize_with = "normalize::lenient_opt")]
    pub form_summary: Option<FormSummary>,
    #[serde(default, rename = "form_summary", deserialize_with = "normalize::lenient_opt")]
    pub form_notes: Option<FormNotes>,
    #[serde(default, deserialize_with = "normalize::lenient_opt_f64")]
    pub avg_error_last_10: Option<f64>,
    #[serde(default, deserialize_with = "games_from_value")]
    pub recent_games: Vec<GameRecord>,
    #[serde(skip)]
    pub team: Option<TeamDetails>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StandingRow {
    pub rank: u32,
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    pub gb: Option<String>,
    pub streak: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Standings {
    pub east: Vec<StandingRow>,
    pub west: Vec<StandingRow>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScheduledGame {
    pub game_id: String,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: Option<String>,
    pub start_time_utc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpApi {
    config: ApiConfig,
}

impl HttpApi {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    fn get(&self, segments: &[&str]) -> Result<String> {
        let client = http_client()?;
        send(client.get(self.config.endpoint(segments)))
    }

    fn post(&self, segments: &[&str]) -> Result<String> {
        let client = http_client()?;
        send(client.post(self.config.endpoint(segments)))
    }
}

impl StatsApi for HttpApi {
    fn players(&self) -> Result<Vec<PlayerRef>> {
        let body = self.get(&["players"]).context("players request")?;
        parse_players_json(&body)
    }

    fn recent_games(&self, player_id: &PlayerId) -> Result<Vec<GameRecord>> {
        let id = player_id.to_string();
        let body = self
            .get(&["player", &id, "recent-games"])
            .context("recent games request")?;
        parse_recent_games_json(&body)
    }

    fn predict(&self, player_id: &PlayerId) -> Result<PredictionResult> {
        let id = player_id.to_string();
        let body = self
            .post(&["predict", "player", &id])
            .context("prediction request")?;
        parse_prediction_json(&body)
    }

    fn standings(&self) -> Result<Standings> {
        let body = self.get(&["standings"]).context("standings request")?;
        parse_standings_json(&body)
    }

    fn schedule(&self) -> Result<Vec<ScheduledGame>> {
        let body = self.get(&["api", "games"]).context("games request")?;
        parse_games_json(&body)
    }
}

fn send(req: RequestBuilder) -> Result<String> {
    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    check_status(status, &body)?;
    Ok(body)
}

/// Non-2xx responses become errors carrying the status and, when the service sent
/// one, its `detail` message.
pub fn check_status(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| normalize::pick_text(&v, &["detail", "message", "error"]))
        .filter(|d| !d.is_empty());
    Err(match detail {
        Some(detail) => anyhow!("request failed: {status} ({detail})"),
        None => anyhow!("request failed: {status}"),
    })
}

pub fn parse_players_json(raw: &str) -> Result<Vec<PlayerRef>> {
    let root = parse_root(raw, "invalid players json")?;
    Ok(normalize::normalize_players(&root))
}

pub fn parse_recent_games_json(raw: &str) -> Result<Vec<GameRecord>> {
    let root = parse_root(raw, "invalid recent games json")?;
    Ok(normalize::normalize_games(&root))
}

pub fn parse_prediction_json(raw: &str) -> Result<PredictionResult> {
    let root = parse_root(raw, "invalid prediction json")?;
    if root.is_null() {
        return Err(anyhow!("empty prediction response"));
    }
    let team = team::team_from_payload(&root);
    let mut result: PredictionResult =
        serde_json::from_value(root).context("unexpected prediction shape")?;
    result.team = team;
    Ok(result)
}

pub fn parse_standings_json(raw: &str) -> Result<Standings> {
    let root = parse_root(raw, "invalid standings json")?;
    Ok(Standings {
        east: parse_conference(root.get("east")),
        west: parse_conference(root.get("west")),
        last_updated: normalize::pick_text(&root, &["last_updated", "lastUpdated"]),
    })
}

pub fn parse_games_json(raw: &str) -> Result<Vec<ScheduledGame>> {
    let root = parse_root(raw, "invalid games json")?;
    let items = match &root {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("games")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };
    Ok(items.iter().filter_map(parse_scheduled_game).collect())
}

fn parse_root(raw: &str, what: &'static str) -> Result<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Value::Null);
    }
    serde_json::from_str(trimmed).context(what)
}

fn parse_conference(value: Option<&Value>) -> Vec<StandingRow> {
    let Some(list) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut rows: Vec<StandingRow> = list.iter().filter_map(parse_standing_row).collect();
    rows.sort_by_key(|row| row.rank);
    rows
}

fn parse_standing_row(value: &Value) -> Option<StandingRow> {
    let team = normalize::pick_text(value, &["team", "team_name", "teamName"])
        .filter(|t| !t.is_empty())?;
    Some(StandingRow {
        rank: pick_u32(value, &["rank", "conference_rank"]).unwrap_or(99),
        team,
        wins: pick_u32(value, &["wins", "w"]).unwrap_or(0),
        losses: pick_u32(value, &["losses", "l"]).unwrap_or(0),
        gb: normalize::pick_text(value, &["gb", "games_back"]).filter(|s| !s.is_empty()),
        streak: normalize::pick_text(value, &["streak"]).filter(|s| !s.is_empty()),
    })
}

fn parse_scheduled_game(value: &Value) -> Option<ScheduledGame> {
    if !value.is_object() {
        return None;
    }
    Some(ScheduledGame {
        game_id: normalize::pick_text(value, &["game_id", "gameId", "id"]).unwrap_or_default(),
        home_team: normalize::pick_text(value, &["home_team"]).filter(|s| !s.is_empty()),
        away_team: normalize::pick_text(value, &["away_team"]).filter(|s| !s.is_empty()),
        home_score: pick_u32(value, &["home_score"]),
        away_score: pick_u32(value, &["away_score"]),
        status: normalize::pick_text(value, &["status"]).filter(|s| !s.is_empty()),
        start_time_utc: normalize::pick_text(value, &["start_time_utc", "gameTimeUTC"])
            .filter(|s| !s.is_empty()),
    })
}

fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    let num = normalize::pick_f64(value, keys)?;
    (num >= 0.0 && num <= u32::MAX as f64).then(|| num.round() as u32)
}

fn games_from_value<'de, D>(deserializer: D) -> Result<Vec<GameRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize::normalize_games(&raw))
}

fn label_from_value<'de, D>(deserializer: D) -> Result<ConfidenceLabel, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize::as_text(&raw)
        .map(ConfidenceLabel::from)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_carry_status_and_detail() {
        let err = check_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail":"Dataset not loaded"}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "request failed: 500 Internal Server Error (Dataset not loaded)"
        );

        let err = check_status(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert_eq!(err.to_string(), "request failed: 502 Bad Gateway");
        assert!(check_status(StatusCode::OK, "").is_ok());
    }

    #[test]
    fn prediction_requires_point_estimate() {
        assert!(parse_prediction_json("null").is_err());
        assert!(parse_prediction_json(r#"{"model_prediction": 3}"#).is_err());
        assert!(parse_prediction_json("{not json").is_err());
    }

    #[test]
    fn minimal_prediction_defaults_optional_fields() {
        let result =
            parse_prediction_json(r#"{"predicted_points": 18.5, "model_prediction": 17}"#).unwrap();
        assert_eq!(result.predicted_points, 18.5);
        assert!(result.confidence.is_none());
        assert!(result.recent_games.is_empty());
        assert!(result.team.is_none());
    }

    #[test]
    fn unknown_confidence_label_is_kept() {
        let result = parse_prediction_json(
            r#"{"predicted_points": 1, "model_prediction": 1, "confidence": {"label": "Huge"}}"#,
        )
        .unwrap();
        let confidence = result.confidence.unwrap();
        assert_eq!(confidence.label, ConfidenceLabel::Other("Huge".to_string()));
        assert_eq!(confidence.band, 0.0);
    }

    #[test]
    fn null_summary_fields_read_as_zero() {
        let result = parse_prediction_json(
            r#"{"predicted_points": 20, "model_prediction": 18,
                "summary": {"avg_pts_5": 20, "avg_min_5": null, "pts_trend": "1.5"}}"#,
        )
        .unwrap();
        let summary = result.form_summary.unwrap();
        assert_eq!(summary.avg_pts_5, 20.0);
        assert_eq!(summary.avg_min_5, 0.0);
        assert_eq!(summary.pts_trend, 1.5);
    }

    #[test]
    fn null_confidence_fields_fall_back() {
        let result = parse_prediction_json(
            r#"{"predicted_points": 20, "model_prediction": 18,
                "confidence": {"label": null, "band": null, "std": "n/a"}}"#,
        )
        .unwrap();
        let confidence = result.confidence.unwrap();
        assert_eq!(confidence.label, ConfidenceLabel::Other(String::new()));
        assert_eq!(confidence.band, 0.0);
        assert_eq!(confidence.std, None);
    }

    #[test]
    fn malformed_nested_objects_degrade_to_none() {
        let result = parse_prediction_json(
            r#"{"predicted_points": 20, "model_prediction": 18,
                "recent_avg_points": null, "avg_error_last_10": "4.5",
                "confidence": "high", "summary": "n/a", "form_summary": 7,
                "explanation": {"text": "x"}}"#,
        )
        .unwrap();
        assert_eq!(result.predicted_points, 20.0);
        assert!(result.confidence.is_none());
        assert!(result.form_summary.is_none());
        assert!(result.form_notes.is_none());
        assert!(result.explanation.is_none());
        assert_eq!(result.recent_avg_points, None);
        assert_eq!(result.avg_error_last_10, Some(4.5));
    }

    #[test]
    fn empty_bodies_are_empty_lists() {
        assert!(parse_players_json("").unwrap().is_empty());
        assert!(parse_recent_games_json("null").unwrap().is_empty());
        assert!(parse_games_json("null").unwrap().is_empty());
        let standings = parse_standings_json("null").unwrap();
        assert!(standings.east.is_empty() && standings.west.is_empty());
    }

    #[test]
    fn malformed_bodies_are_errors() {
        assert!(parse_players_json("[{").is_err());
        assert!(parse_standings_json("{").is_err());
    }
}
