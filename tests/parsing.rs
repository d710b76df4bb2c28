use std::fs;
use std::path::PathBuf;

use chrono::{FixedOffset, NaiveDate};
use hoops_terminal::api::{
    ConfidenceLabel, parse_games_json, parse_players_json, parse_prediction_json,
    parse_recent_games_json, parse_standings_json,
};
use hoops_terminal::metrics::{compute_form_summary, rolling_fg_pct};
use hoops_terminal::normalize::PlayerId;
use hoops_terminal::present::{AdjustmentDirection, GaugeTier, map_breakdown, map_confidence_to_gauge};
use hoops_terminal::schedule::{GameStatus, classify_status, group_by_day};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn parses_players_fixture() {
    let raw = read_fixture("players_wrapped.json");
    let players = parse_players_json(&raw).expect("fixture should parse");
    let ids: Vec<&PlayerId> = players.iter().map(|p| &p.player_id).collect();
    assert_eq!(
        ids,
        vec![
            &PlayerId::Number(201939),
            &PlayerId::Number(2544),
            &PlayerId::Text("1629029".to_string()),
            &PlayerId::Number(203999),
        ]
    );
    assert_eq!(players[2].player_name, "Luka Doncic");
    assert_eq!(players[3].player_name, "Nikola Jokic");

    let hint = players[0].team_hint.as_ref().expect("curry has roster context");
    assert_eq!(hint.abbreviation.as_deref(), Some("GSW"));
    assert_eq!(hint.conference.as_deref(), Some("West"));
    assert!(players[1].team_hint.is_none());
}

#[test]
fn parses_recent_games_fixture() {
    let raw = read_fixture("recent_games.json");
    let games = parse_recent_games_json(&raw).expect("fixture should parse");
    assert_eq!(games.len(), 6);
    assert_eq!(games[1].date.as_deref(), Some("2026-10-03"));
    assert_eq!(games[1].fg_pct, Some(0.55));
    assert_eq!(games[2].date.as_deref(), Some("2026-10-05"));
    assert_eq!(games[2].pts, None);
    assert_eq!(games[2].fg_pct, None);
    assert_eq!(games[3].pts, Some(18.0));
    assert_eq!(games[5].min, None);

    let summary = compute_form_summary(&games).expect("non-empty");
    assert!(close(summary.avg_pts_5, 130.0 / 6.0));
    assert!(close(summary.avg_min_5, 147.75 / 6.0));
    assert!(close(summary.pts_trend, 6.0));

    let rolling: Vec<Option<f64>> = rolling_fg_pct(&games).map(|p| p.rolling).collect();
    let expected = [0.48, 0.515, 0.515, 0.475, 0.40, 0.46];
    assert_eq!(rolling.len(), expected.len());
    for (got, want) in rolling.iter().zip(expected) {
        assert!(close(got.expect("window has a value"), want), "{got:?} vs {want}");
    }
}

#[test]
fn parses_prediction_fixture() {
    let raw = read_fixture("prediction.json");
    let result = parse_prediction_json(&raw).expect("fixture should parse");
    assert_eq!(result.predicted_points, 27.4);
    assert_eq!(result.model_prediction, 25.9);
    assert_eq!(result.recent_avg_points, Some(26.0));
    assert_eq!(result.avg_error_last_10, Some(4.87));

    let confidence = result.confidence.as_ref().expect("confidence present");
    assert_eq!(confidence.label, ConfidenceLabel::Medium);
    assert_eq!(confidence.band, 4.2);
    assert_eq!(confidence.std, Some(5.1));

    let summary = result.form_summary.expect("numeric summary");
    assert_eq!(summary.pts_trend, 6.0);
    let notes = result.form_notes.as_ref().expect("form notes");
    assert_eq!(notes.minutes_stability.as_deref(), Some("Stable"));
    assert_eq!(notes.scoring_trend.as_deref(), Some("Rising"));

    assert_eq!(result.recent_games.len(), 5);
    assert_eq!(result.recent_games[0].date.as_deref(), Some("2026-10-01"));

    let team = result.team.as_ref().expect("team present");
    assert_eq!(team.team_name.as_deref(), Some("Golden State Warriors"));
    assert_eq!(team.colors.as_ref().map(Vec::len), Some(2));

    let gauge = map_confidence_to_gauge(confidence);
    assert_eq!(gauge.percentage, 60);
    assert_eq!(gauge.tier, GaugeTier::Warning);

    let breakdown = map_breakdown(result.predicted_points, result.model_prediction);
    assert_eq!(breakdown.direction, AdjustmentDirection::Positive);
    assert!((breakdown.adjustment_share - 1.5).abs() < 1e-6);
}

#[test]
fn parses_standings_fixture() {
    let raw = read_fixture("standings.json");
    let standings = parse_standings_json(&raw).expect("fixture should parse");
    let ranks: Vec<u32> = standings.east.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 99]);
    assert_eq!(standings.east[0].team, "Boston Celtics");
    assert_eq!(standings.east[0].streak.as_deref(), Some("W4"));
    assert_eq!(standings.east[2].gb, None);
    assert_eq!(standings.west.len(), 1);
    assert_eq!(
        standings.last_updated.as_deref(),
        Some("2026-10-16T09:00:00Z")
    );
}

#[test]
fn parses_games_fixture_into_days() {
    let raw = read_fixture("games.json");
    let games = parse_games_json(&raw).expect("fixture should parse");
    assert_eq!(games.len(), 3);
    assert_eq!(games[2].away_team, None);
    assert_eq!(games[2].home_score, None);
    assert_eq!(classify_status(games[1].status.as_deref()), GameStatus::Live);

    let today = NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date");
    let utc = FixedOffset::east_opt(0).expect("valid offset");
    let days = group_by_day(&games, today, utc);
    assert_eq!(days.yesterday[0].game_id, "0022600101");
    assert_eq!(days.today[0].game_id, "0022600102");
    assert_eq!(days.upcoming[0].game_id, "0022600103");
}
