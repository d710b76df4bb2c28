use serde::{Deserialize, Serialize};

use crate::normalize::{self, GameRecord};

/// Below this many games the chart-grade metrics are suppressed by the views.
pub const MIN_CHART_GAMES: usize = 5;
pub const ROLLING_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FormSummary {
    #[serde(default, deserialize_with = "normalize::lenient_f64")]
    pub avg_pts_5: f64,
    #[serde(default, deserialize_with = "normalize::lenient_f64")]
    pub avg_min_5: f64,
    #[serde(default, deserialize_with = "normalize::lenient_f64")]
    pub pts_trend: f64,
}

/// Summarizes whatever window was supplied; `None` only for an empty slice.
///
/// Missing `pts`/`min` count as zero in the averages and in the trend.
pub fn compute_form_summary(games: &[GameRecord]) -> Option<FormSummary> {
    let first = games.first()?;
    let last = games.last()?;
    let n = games.len() as f64;

    let total_pts: f64 = games.iter().map(|g| g.pts.unwrap_or(0.0)).sum();
    let total_min: f64 = games.iter().map(|g| g.min.unwrap_or(0.0)).sum();

    Some(FormSummary {
        avg_pts_5: total_pts / n,
        avg_min_5: total_min / n,
        pts_trend: last.pts.unwrap_or(0.0) - first.pts.unwrap_or(0.0),
    })
}

pub fn has_enough_games(games: &[GameRecord]) -> bool {
    games.len() >= MIN_CHART_GAMES
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingPoint<'a> {
    pub date: Option<&'a str>,
    pub fg_pct: Option<f64>,
    pub rolling: Option<f64>,
}

/// Lazily yields one point per game: the mean of the non-null `fg_pct` values in the
/// trailing window ending at that game.
#[derive(Debug, Clone)]
pub struct RollingShooting<'a> {
    games: &'a [GameRecord],
    window: usize,
    idx: usize,
}

pub fn rolling_fg_pct(games: &[GameRecord]) -> RollingShooting<'_> {
    RollingShooting {
        games,
        window: ROLLING_WINDOW,
        idx: 0,
    }
}

impl<'a> Iterator for RollingShooting<'a> {
    type Item = RollingPoint<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let game = self.games.get(self.idx)?;
        let start = (self.idx + 1).saturating_sub(self.window);
        let (sum, count) = self.games[start..=self.idx]
            .iter()
            .filter_map(|g| g.fg_pct)
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        self.idx += 1;

        Some(RollingPoint {
            date: game.date.as_deref(),
            fg_pct: game.fg_pct,
            rolling: (count > 0).then(|| sum / count as f64),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.games.len().saturating_sub(self.idx);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RollingShooting<'_> {}

/// `(game index, points)` pairs for charting; games without points are skipped.
pub fn points_series(games: &[GameRecord]) -> Vec<(f64, f64)> {
    games
        .iter()
        .enumerate()
        .filter_map(|(i, g)| g.pts.map(|pts| (i as f64, pts)))
        .collect()
}

/// `(game index, rolling fg%)` pairs for charting, as percentages.
pub fn rolling_series(games: &[GameRecord]) -> Vec<(f64, f64)> {
    rolling_fg_pct(games)
        .enumerate()
        .filter_map(|(i, p)| p.rolling.map(|r| (i as f64, r * 100.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(pts: Option<f64>, fg_pct: Option<f64>) -> GameRecord {
        GameRecord {
            date: None,
            pts,
            min: pts.map(|p| p + 10.0),
            fg_pct,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn summary_averages_and_trends_over_given_window() {
        let games = vec![
            game(Some(10.0), None),
            game(Some(20.0), None),
            game(Some(30.0), None),
        ];
        let summary = compute_form_summary(&games).unwrap();
        assert!(close(summary.avg_pts_5, 20.0));
        assert!(close(summary.avg_min_5, 30.0));
        assert!(close(summary.pts_trend, 20.0));
    }

    #[test]
    fn summary_counts_missing_values_as_zero() {
        let games = vec![game(None, None), game(Some(12.0), None)];
        let summary = compute_form_summary(&games).unwrap();
        assert!(close(summary.avg_pts_5, 6.0));
        assert!(close(summary.avg_min_5, 11.0));
        assert!(close(summary.pts_trend, 12.0));
    }

    #[test]
    fn single_game_has_flat_trend_and_empty_has_no_summary() {
        let summary = compute_form_summary(&[game(Some(17.0), None)]).unwrap();
        assert!(close(summary.pts_trend, 0.0));
        assert!(close(summary.avg_pts_5, 17.0));
        assert!(compute_form_summary(&[]).is_none());
    }

    #[test]
    fn trend_uses_full_supplied_length() {
        let games: Vec<GameRecord> = (0..8).map(|i| game(Some(i as f64), None)).collect();
        let summary = compute_form_summary(&games).unwrap();
        assert!(close(summary.pts_trend, 7.0));
    }

    #[test]
    fn rolling_window_caps_at_three_games() {
        let values = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let games: Vec<GameRecord> = values.iter().map(|v| game(None, Some(*v))).collect();
        let rolling: Vec<Option<f64>> = rolling_fg_pct(&games).map(|p| p.rolling).collect();

        assert_eq!(rolling.len(), games.len());
        assert!(close(rolling[0].unwrap(), 0.1));
        assert!(close(rolling[1].unwrap(), 0.15));
        assert!(close(rolling[2].unwrap(), 0.2));
        assert!(close(rolling[5].unwrap(), 0.5));
    }

    #[test]
    fn rolling_skips_nulls_in_window_and_divisor() {
        let games = vec![
            game(None, Some(0.4)),
            game(None, None),
            game(None, Some(0.6)),
            game(None, None),
            game(None, None),
        ];
        let rolling: Vec<Option<f64>> = rolling_fg_pct(&games).map(|p| p.rolling).collect();
        assert!(close(rolling[1].unwrap(), 0.4));
        assert!(close(rolling[2].unwrap(), 0.5));
        assert!(close(rolling[3].unwrap(), 0.6));
        assert!(close(rolling[4].unwrap(), 0.6));
    }

    #[test]
    fn rolling_is_all_null_without_any_fg_pct() {
        let games: Vec<GameRecord> = (0..4).map(|_| game(Some(5.0), None)).collect();
        assert!(rolling_fg_pct(&games).all(|p| p.rolling.is_none()));
        assert!(rolling_series(&games).is_empty());
    }

    #[test]
    fn rolling_points_keep_dates_aligned() {
        let games = vec![
            GameRecord {
                date: Some("2025-03-01".to_string()),
                fg_pct: Some(0.5),
                ..GameRecord::default()
            },
            GameRecord {
                date: Some("2025-03-03".to_string()),
                ..GameRecord::default()
            },
        ];
        let dates: Vec<Option<&str>> = rolling_fg_pct(&games).map(|p| p.date).collect();
        assert_eq!(dates, vec![Some("2025-03-01"), Some("2025-03-03")]);
        assert_eq!(rolling_fg_pct(&games).len(), 2);
    }

    #[test]
    fn chart_gate_needs_five_games() {
        let four: Vec<GameRecord> = (0..4).map(|_| GameRecord::default()).collect();
        let five: Vec<GameRecord> = (0..5).map(|_| GameRecord::default()).collect();
        assert!(!has_enough_games(&four));
        assert!(has_enough_games(&five));
    }
}
