use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate, NaiveDateTime};

use crate::api::ScheduledGame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Final,
    Live,
    Scheduled,
}

/// `final` anywhere in the text wins; then `live` or a quarter marker (`q`).
pub fn classify_status(status: Option<&str>) -> GameStatus {
    let Some(raw) = status else {
        return GameStatus::Scheduled;
    };
    let lower = raw.to_lowercase();
    if lower.contains("final") {
        GameStatus::Final
    } else if lower.contains("live") || lower.contains('q') {
        GameStatus::Live
    } else {
        GameStatus::Scheduled
    }
}

/// Badge text: live and overtime statuses are shown as sent ("Q3 5:12", "OT").
pub fn status_label(status: Option<&str>) -> String {
    let Some(raw) = status.map(str::trim).filter(|s| !s.is_empty()) else {
        return "Scheduled".to_string();
    };
    let lower = raw.to_lowercase();
    if lower.contains("final") {
        "Final".to_string()
    } else if lower.contains("ot") || lower.contains("live") || lower.contains('q') {
        raw.to_string()
    } else if lower.contains("scheduled") {
        "Scheduled".to_string()
    } else {
        raw.to_string()
    }
}

pub fn score_text(game: &ScheduledGame) -> (String, String) {
    if classify_status(game.status.as_deref()) == GameStatus::Scheduled {
        return ("-".to_string(), "-".to_string());
    }
    let fmt = |score: Option<u32>| score.map_or_else(|| "-".to_string(), |s| s.to_string());
    (fmt(game.away_score), fmt(game.home_score))
}

pub fn team_badge(team: Option<&str>) -> String {
    match team.map(str::trim).filter(|t| !t.is_empty()) {
        Some(name) => name.chars().take(3).collect::<String>().to_uppercase(),
        None => "???".to_string(),
    }
}

pub fn parse_start_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt);
    }
    // Offset-less timestamps are UTC.
    FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(cleaned, fmt)
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

/// Start time as local wall clock for scheduled games ("7:30 PM"), calendar day
/// ("Oct 16") otherwise.
pub fn start_time_text(game: &ScheduledGame, offset: FixedOffset) -> String {
    let scheduled = classify_status(game.status.as_deref()) == GameStatus::Scheduled;
    let Some(start) = game.start_time_utc.as_deref().and_then(parse_start_time) else {
        return if scheduled { "TBD".to_string() } else { String::new() };
    };
    let local = start.with_timezone(&offset);
    if scheduled {
        local.format("%-I:%M %p").to_string()
    } else {
        local.format("%b %-d").to_string()
    }
}

#[derive(Debug, Default)]
pub struct GameDays<'a> {
    pub yesterday: Vec<&'a ScheduledGame>,
    pub today: Vec<&'a ScheduledGame>,
    pub upcoming: Vec<&'a ScheduledGame>,
}

impl GameDays<'_> {
    pub fn is_empty(&self) -> bool {
        self.yesterday.is_empty() && self.today.is_empty() && self.upcoming.is_empty()
    }
}

/// Buckets games by local calendar day relative to `today`. Games older than
/// yesterday or without a parseable start time are left out.
pub fn group_by_day(games: &[ScheduledGame], today: NaiveDate, offset: FixedOffset) -> GameDays<'_> {
    let mut days = GameDays::default();
    let yesterday = today - ChronoDuration::days(1);
    for game in games {
        let Some(start) = game.start_time_utc.as_deref().and_then(parse_start_time) else {
            continue;
        };
        let day = start.with_timezone(&offset).date_naive();
        if day == yesterday {
            days.yesterday.push(game);
        } else if day == today {
            days.today.push(game);
        } else if day > today {
            days.upcoming.push(game);
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: &str, status: Option<&str>, start: Option<&str>) -> ScheduledGame {
        ScheduledGame {
            game_id: id.to_string(),
            home_team: Some("Boston Celtics".to_string()),
            away_team: Some("Miami Heat".to_string()),
            home_score: Some(112),
            away_score: Some(104),
            status: status.map(str::to_string),
            start_time_utc: start.map(str::to_string),
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn status_classification() {
        assert_eq!(classify_status(Some("Final/OT")), GameStatus::Final);
        assert_eq!(classify_status(Some("LIVE")), GameStatus::Live);
        assert_eq!(classify_status(Some("Q3 4:12")), GameStatus::Live);
        assert_eq!(classify_status(Some("7:30 pm ET")), GameStatus::Scheduled);
        assert_eq!(classify_status(None), GameStatus::Scheduled);
    }

    #[test]
    fn status_labels_keep_live_text() {
        assert_eq!(status_label(Some("final")), "Final");
        assert_eq!(status_label(Some("Q4 0:31")), "Q4 0:31");
        assert_eq!(status_label(Some("scheduled")), "Scheduled");
        assert_eq!(status_label(None), "Scheduled");
    }

    #[test]
    fn scheduled_games_hide_scores() {
        let upcoming = game("1", Some("Scheduled"), None);
        assert_eq!(score_text(&upcoming), ("-".to_string(), "-".to_string()));
        let done = game("2", Some("Final"), None);
        assert_eq!(score_text(&done), ("104".to_string(), "112".to_string()));
    }

    #[test]
    fn badges_use_first_three_letters() {
        assert_eq!(team_badge(Some("Boston Celtics")), "BOS");
        assert_eq!(team_badge(Some("  ")), "???");
        assert_eq!(team_badge(None), "???");
    }

    #[test]
    fn groups_by_local_day() {
        let games = vec![
            game("old", Some("Final"), Some("2026-10-13T23:00:00Z")),
            game("y", Some("Final"), Some("2026-10-15T23:30:00Z")),
            game("t", Some("Q2"), Some("2026-10-16T19:00:00Z")),
            game("u", Some("Scheduled"), Some("2026-10-18T00:00:00")),
            game("bad", Some("Scheduled"), Some("soon")),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let days = group_by_day(&games, today, utc());
        assert_eq!(days.yesterday.len(), 1);
        assert_eq!(days.yesterday[0].game_id, "y");
        assert_eq!(days.today[0].game_id, "t");
        assert_eq!(days.upcoming[0].game_id, "u");

        // Eight hours ahead, the late game on the 15th lands on the 16th.
        let sgt = FixedOffset::east_opt(8 * 3600).unwrap();
        let shifted = group_by_day(&games, today, sgt);
        assert!(shifted.yesterday.is_empty());
        assert_eq!(shifted.today.len(), 1);
        assert_eq!(shifted.today[0].game_id, "y");
    }

    #[test]
    fn start_time_formats() {
        let upcoming = game("u", Some("Scheduled"), Some("2026-10-16T23:30:00Z"));
        assert_eq!(start_time_text(&upcoming, utc()), "11:30 PM");
        let done = game("d", Some("Final"), Some("2026-10-16T23:30:00Z"));
        assert_eq!(start_time_text(&done, utc()), "Oct 16");
        let tbd = game("x", Some("Scheduled"), None);
        assert_eq!(start_time_text(&tbd, utc()), "TBD");
    }
}
