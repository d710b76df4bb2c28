use std::io;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, Offset};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, Gauge, GraphType,
    Paragraph, Wrap,
};

use hoops_terminal::api::{HttpApi, PredictionResult, ScheduledGame, StandingRow};
use hoops_terminal::config::ApiConfig;
use hoops_terminal::metrics;
use hoops_terminal::normalize::GameRecord;
use hoops_terminal::present::{self, AdjustmentDirection, GaugeTier};
use hoops_terminal::provider;
use hoops_terminal::schedule;
use hoops_terminal::state::{
    AppState, Delta, Load, ProviderCommand, Screen, Tracked, apply_delta,
};
use hoops_terminal::team::TeamOverrides;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
    api_label: String,
}

impl App {
    fn new(state: AppState, cmd_tx: mpsc::Sender<ProviderCommand>, api_label: String) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
            api_label,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            KeyCode::Char('1') => self.state.enter_screen(Screen::Home),
            KeyCode::Char('2') => self.state.enter_screen(Screen::Dashboard),
            KeyCode::Char('3') => self.state.enter_screen(Screen::Results),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            _ => match self.state.screen {
                Screen::Home => self.on_home_key(key),
                Screen::Dashboard => self.on_dashboard_key(key),
                Screen::Results => self.on_results_key(key),
            },
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.state.open_featured(),
            KeyCode::Char('s') => self.state.shuffle_spotlight(),
            KeyCode::Char('o') => self.state.open_spotlight(),
            KeyCode::Char('r') => self.state.request_standings(),
            _ => {}
        }
    }

    fn on_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.state.select_player_at_cursor(),
            KeyCode::Char('p') => self.state.request_prediction(),
            KeyCode::Char('c') => self.state.toggle_comparison(),
            KeyCode::Char(']') => self.state.cycle_secondary(1),
            KeyCode::Char('[') => self.state.cycle_secondary(-1),
            KeyCode::Char('v') => self.state.request_comparison(),
            KeyCode::Char('x') => self.state.clear_selection(),
            KeyCode::Char('r') => self.state.request_players(),
            _ => {}
        }
    }

    fn on_results_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('r') {
            self.state.request_schedule();
        }
    }

    fn flush_commands(&mut self) {
        for cmd in self.state.drain_outbox() {
            if self.cmd_tx.send(cmd).is_err() {
                self.state.push_log("[WARN] Fetch worker unavailable");
                break;
            }
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = ApiConfig::from_env()?;
    let api_label = config.base_url.to_string();

    let mut state = AppState::new();
    match TeamOverrides::builtin() {
        Ok(overrides) => state = state.with_team_overrides(overrides),
        Err(err) => state.push_log(format!("[WARN] Team overrides ignored: {err:#}")),
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    provider::spawn_provider(Arc::new(HttpApi::new(config)), tx, cmd_rx);

    let mut app = App::new(state, cmd_tx, api_label);
    app.state.enter_screen(Screen::Home);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    // Short enough for the prediction tween to look smooth.
    let tick_rate = Duration::from_millis(33);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.flush_commands();
        app.state.displayed_points.tick(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
            app.flush_commands();
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Home => render_home(frame, chunks[1], &app.state),
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state),
        Screen::Results => render_results(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let title = match app.state.screen {
        Screen::Home => "HOOPS HOME",
        Screen::Dashboard => "HOOPS DASHBOARD",
        Screen::Results => "HOOPS RESULTS",
    };
    let line1 = format!("  .-.  {title} | API {}", app.api_label);
    let line2 = " (-+-)".to_string();
    let line3 = "  '-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Home => {
            "1 Home | 2 Dashboard | 3 Results | j/k Move | Enter Open | s Shuffle | o Open spotlight | r Standings | ? Help | q Quit".to_string()
        }
        Screen::Dashboard => {
            "j/k Move | Enter Select | p Predict | c Compare | [ ] Other player | v Rerun compare | x Clear | r Reload | ? Help | q Quit".to_string()
        }
        Screen::Results => {
            "1 Home | 2 Dashboard | j/k Scroll | r Refresh | ? Help | q Quit".to_string()
        }
    }
}

fn render_home(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(3)])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[1]);

    let spotlight = Paragraph::new(spotlight_text(state))
        .block(Block::default().title("Spotlight").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(spotlight, left[0]);

    let featured = Paragraph::new(featured_lines(state))
        .block(Block::default().title("Featured players").borders(Borders::ALL));
    frame.render_widget(featured, left[1]);

    render_conference(frame, right[0], "Eastern Conference", state, true);
    render_conference(frame, right[1], "Western Conference", state, false);
}

fn spotlight_text(state: &AppState) -> String {
    let Some(player) = &state.spotlight else {
        return match &state.players {
            Load::Failed(msg) => format!("Players unavailable: {msg}"),
            _ => "Loading players...".to_string(),
        };
    };
    let body = match &state.spotlight_prediction.load {
        Load::Idle | Load::Loading => "Predicting...".to_string(),
        Load::Failed(msg) => format!("Prediction unavailable: {msg}"),
        Load::Ready(result) => prediction_summary(result),
    };
    format!("{}\n{body}", player.player_name)
}

fn prediction_summary(result: &PredictionResult) -> String {
    let mut lines = vec![format!("Predicted {:.1} pts", result.predicted_points)];
    if let Some(confidence) = &result.confidence {
        lines.push(format!(
            "Confidence {} (±{:.1})",
            confidence.label.as_str(),
            confidence.band
        ));
    }
    lines.push(format!(
        "Recent avg {}",
        present::format_optional(result.recent_avg_points, 1)
    ));
    if let Some(explanation) = &result.explanation {
        lines.push(explanation.clone());
    }
    lines.join("\n")
}

fn featured_lines(state: &AppState) -> Vec<Line<'static>> {
    if state.featured.is_empty() {
        return vec![Line::styled(
            "No players yet",
            Style::default().fg(Color::DarkGray),
        )];
    }
    state
        .featured
        .iter()
        .enumerate()
        .map(|(idx, player)| {
            let selected = idx == state.featured_cursor;
            let marker = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::styled(format!("{marker}{}", player.player_name), style)
        })
        .collect()
}

fn render_conference(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    state: &AppState,
    east: bool,
) {
    let text = match &state.standings {
        Load::Idle | Load::Loading => "Loading standings...".to_string(),
        Load::Failed(msg) => format!("Standings unavailable: {msg}"),
        Load::Ready(standings) => {
            let rows = if east { &standings.east } else { &standings.west };
            if rows.is_empty() {
                "No standings".to_string()
            } else {
                let mut lines: Vec<String> = rows.iter().map(standing_line).collect();
                if let Some(updated) = &standings.last_updated {
                    lines.push(format!("Updated {updated}"));
                }
                lines.join("\n")
            }
        }
    };
    let widget =
        Paragraph::new(text).block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn standing_line(row: &StandingRow) -> String {
    format!(
        "{:>2} {:<24} {:>2}-{:<2} GB {:<4} {}",
        row.rank,
        row.team,
        row.wins,
        row.losses,
        row.gb.as_deref().unwrap_or("-"),
        row.streak.as_deref().unwrap_or("")
    )
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(area);
    render_player_list(frame, columns[0], state);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10),
            Constraint::Length(3),
            Constraint::Min(6),
        ])
        .split(columns[1]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(35),
            Constraint::Percentage(25),
        ])
        .split(rows[0]);
    render_prediction_card(frame, top[0], state);
    render_confidence(frame, top[1], state);
    render_team_card(frame, top[2], state);

    render_summary_cards(frame, rows[1], state);

    if state.comparison.enabled {
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(rows[2]);
        render_charts(frame, bottom[0], state);
        render_comparison(frame, bottom[1], state);
    } else {
        render_charts(frame, rows[2], state);
    }
}

fn render_player_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(format!("Players ({})", state.player_list().len()))
        .borders(Borders::ALL);
    let lines: Vec<Line> = match &state.players {
        Load::Idle | Load::Loading => vec![Line::from("Loading players...")],
        Load::Failed(msg) => vec![Line::styled(
            format!("Error: {msg}"),
            Style::default().fg(Color::Red),
        )],
        Load::Ready(players) => {
            let visible = area.height.saturating_sub(2) as usize;
            let (start, end) = visible_range(state.player_cursor, players.len(), visible);
            let selected_id = state.selected.as_ref().map(|p| &p.player_id);
            players[start..end]
                .iter()
                .enumerate()
                .map(|(offset, player)| {
                    let idx = start + offset;
                    let cursor = if idx == state.player_cursor { ">" } else { " " };
                    let active = if Some(&player.player_id) == selected_id {
                        "*"
                    } else {
                        " "
                    };
                    let style = if idx == state.player_cursor {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    Line::styled(format!("{cursor}{active} {}", player.player_name), style)
                })
                .collect()
        }
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_prediction_card(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = match &state.selected {
        Some(player) => format!("Prediction | {}", player.player_name),
        None => "Prediction".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let text: Text = match &state.prediction.load {
        Load::Idle if state.selected.is_none() => "Pick a player (Enter)".into(),
        Load::Idle => "Press p to predict".into(),
        Load::Loading => "Predicting...".into(),
        Load::Failed(msg) => {
            Line::styled(format!("Error: {msg}"), Style::default().fg(Color::Red)).into()
        }
        Load::Ready(result) => {
            let shown = state
                .displayed_points
                .displayed()
                .unwrap_or(result.predicted_points);
            let mut lines = vec![
                Line::styled(
                    format!("{shown:.2} pts"),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Line::from(format!("Model base {:.1}", result.model_prediction)),
                Line::from(format!(
                    "Recent avg {}",
                    present::format_optional(result.recent_avg_points, 1)
                )),
                Line::from(format!(
                    "Avg error (last 10) {}",
                    present::format_optional(result.avg_error_last_10, 2)
                )),
            ];
            if let Some(notes) = &result.form_notes {
                lines.push(Line::from(format!(
                    "Minutes {} | Scoring {}",
                    notes.minutes_stability.as_deref().unwrap_or("--"),
                    notes.scoring_trend.as_deref().unwrap_or("--")
                )));
            }
            if let Some(explanation) = &result.explanation {
                lines.push(Line::styled(
                    explanation.clone(),
                    Style::default().fg(Color::Gray),
                ));
            }
            Text::from(lines)
        }
    };
    let widget = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn tier_color(tier: GaugeTier) -> Color {
    match tier {
        GaugeTier::Success => Color::Green,
        GaugeTier::Warning => Color::Yellow,
        GaugeTier::Danger => Color::Red,
    }
}

fn render_confidence(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    let Some(result) = state.prediction.load.ready() else {
        let empty = Paragraph::new("No prediction yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Confidence").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    match (state.gauge(), &result.confidence) {
        (Some(gauge), Some(confidence)) => {
            let widget = Gauge::default()
                .block(Block::default().title("Confidence").borders(Borders::ALL))
                .gauge_style(Style::default().fg(tier_color(gauge.tier)))
                .percent(u16::from(gauge.percentage))
                .label(format!(
                    "{} ±{:.1}",
                    confidence.label.as_str(),
                    confidence.band
                ));
            frame.render_widget(widget, rows[0]);
        }
        _ => {
            let widget = Paragraph::new("--")
                .block(Block::default().title("Confidence").borders(Borders::ALL));
            frame.render_widget(widget, rows[0]);
        }
    }

    let Some(breakdown) = state.breakdown() else {
        return;
    };
    let predicted = result.predicted_points;
    let base = Gauge::default()
        .block(Block::default().title("Model base").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Blue))
        .percent(breakdown.base_width_pct(predicted).round() as u16)
        .label(format!("{:.1}", breakdown.base_share));
    frame.render_widget(base, rows[1]);

    let (sign, color) = match breakdown.direction {
        AdjustmentDirection::Positive => ("+", Color::Green),
        AdjustmentDirection::Negative => ("-", Color::Red),
        AdjustmentDirection::Zero => ("", Color::DarkGray),
    };
    let adjustment = Gauge::default()
        .block(Block::default().title("Adjustment").borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .percent(breakdown.adjustment_width_pct(predicted).round() as u16)
        .label(format!("{sign}{:.1}", breakdown.adjustment_share));
    frame.render_widget(adjustment, rows[2]);
}

fn render_team_card(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Team").borders(Borders::ALL);
    let text = match &state.team_details {
        Some(team) if !team.is_empty() => {
            let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "--".to_string());
            let mut lines = vec![
                field(&team.team_name),
                format!("{} ({})", field(&team.city), field(&team.abbreviation)),
                format!("{} Conference", field(&team.conference)),
            ];
            if let Some(colors) = &team.colors {
                lines.push(colors.join(" "));
            }
            if let Some(logo) = &team.logo_url {
                lines.push(logo.clone());
            }
            lines.join("\n")
        }
        Some(_) => "No team info".to_string(),
        None => "--".to_string(),
    };
    let widget = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_summary_cards(frame: &mut Frame, area: Rect, state: &AppState) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);
    let summary = state.card_summary();
    let values = [
        (
            "Avg PTS (5)",
            present::format_optional(summary.map(|s| s.avg_pts_5), 1),
        ),
        (
            "Avg MIN (5)",
            present::format_optional(summary.map(|s| s.avg_min_5), 1),
        ),
        (
            "PTS trend",
            summary.map_or_else(|| "--".to_string(), |s| present::trend_text(s.pts_trend)),
        ),
    ];
    for ((title, value), area) in values.into_iter().zip(cards.iter()) {
        let card = Paragraph::new(value)
            .alignment(Alignment::Center)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(card, *area);
    }
}

fn chart_placeholder(state: &AppState) -> Option<String> {
    if state.selected.is_none() {
        return Some("Select a player to see recent games".to_string());
    }
    match &state.recent_games.load {
        Load::Idle | Load::Loading => Some("Loading recent games...".to_string()),
        Load::Failed(msg) => Some(format!("Recent games unavailable: {msg}")),
        Load::Ready(_) if !state.chart_ready() => {
            Some("Need at least 5 games for charts.".to_string())
        }
        Load::Ready(_) => None,
    }
}

fn render_charts(frame: &mut Frame, area: Rect, state: &AppState) {
    if let Some(msg) = chart_placeholder(state) {
        let placeholder = Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Recent form").borders(Borders::ALL));
        frame.render_widget(placeholder, area);
        return;
    }

    let games = state.games();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let points = metrics::points_series(games);
    let rolling = metrics::rolling_series(games);
    let x_max = games.len().saturating_sub(1).max(1) as f64;
    let pts_max = points
        .iter()
        .map(|(_, pts)| *pts)
        .fold(10.0_f64, f64::max)
        * 1.1;

    frame.render_widget(
        line_chart("Points", &points, x_max, pts_max, Color::Cyan),
        columns[0],
    );
    frame.render_widget(
        line_chart("FG% (3-game)", &rolling, x_max, 100.0, Color::Magenta),
        columns[1],
    );
    frame.render_widget(minutes_chart(games), columns[2]);
}

fn line_chart<'a>(
    title: &'a str,
    data: &'a [(f64, f64)],
    x_max: f64,
    y_max: f64,
    color: Color,
) -> Chart<'a> {
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data);
    Chart::new(vec![dataset])
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(Axis::default().bounds([0.0, x_max]))
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels(vec![Span::raw("0"), Span::raw(format!("{y_max:.0}"))]),
        )
}

fn minutes_chart(games: &[GameRecord]) -> BarChart<'static> {
    let bars: Vec<Bar> = games
        .iter()
        .enumerate()
        .map(|(idx, game)| {
            let minutes = game.min.unwrap_or(0.0).max(0.0).round() as u64;
            Bar::default()
                .value(minutes)
                .label(Line::from(format!("G{}", idx + 1)))
                .text_value(minutes.to_string())
                .style(Style::default().fg(Color::Yellow))
        })
        .collect();

    BarChart::default()
        .block(Block::default().title("Minutes").borders(Borders::ALL))
        .data(BarGroup::default().bars(&bars))
        .bar_width(3)
        .bar_gap(1)
        .max(48)
}

fn render_comparison(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Compare").borders(Borders::ALL);
    let primary = state
        .selected
        .as_ref()
        .map_or("--", |p| p.player_name.as_str());
    let secondary = state
        .comparison
        .secondary
        .as_ref()
        .map_or("--", |p| p.player_name.as_str());

    let text = format!(
        "{primary}\n  {}\n\n{secondary}\n  {}",
        compare_line(&state.prediction),
        compare_line(&state.comparison.prediction)
    );
    let widget = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn compare_line(tracked: &Tracked<PredictionResult>) -> String {
    match &tracked.load {
        Load::Idle => "not requested".to_string(),
        Load::Loading => "predicting...".to_string(),
        Load::Failed(msg) => format!("error: {msg}"),
        Load::Ready(result) => {
            let label = result
                .confidence
                .as_ref()
                .map_or("--", |c| c.label.as_str());
            format!(
                "{:.1} pts | {label} | avg {}",
                result.predicted_points,
                present::format_optional(result.recent_avg_points, 1)
            )
        }
    }
}

fn render_results(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("NBA Games & Results")
        .borders(Borders::ALL);
    let lines: Vec<Line> = match &state.schedule {
        Load::Idle | Load::Loading => vec![Line::from("Loading games...")],
        Load::Failed(msg) => vec![
            Line::styled(
                "Failed to load games. Press r to try again.",
                Style::default().fg(Color::Red),
            ),
            Line::styled(msg.clone(), Style::default().fg(Color::DarkGray)),
        ],
        Load::Ready(games) => results_lines(games),
    };
    let widget = Paragraph::new(lines)
        .block(block)
        .scroll((state.schedule_scroll, 0));
    frame.render_widget(widget, area);
}

fn results_lines(games: &[ScheduledGame]) -> Vec<Line<'static>> {
    if games.is_empty() {
        return vec![Line::from("No Games Available")];
    }
    let now = Local::now();
    let offset = now.offset().fix();
    let days = schedule::group_by_day(games, now.date_naive(), offset);
    if days.is_empty() {
        return vec![Line::from("No games for yesterday, today or later")];
    }

    let mut lines = Vec::new();
    let sections = [
        ("Yesterday's Final Games", &days.yesterday),
        ("Today's Games", &days.today),
        ("Upcoming Games", &days.upcoming),
    ];
    for (title, section) in sections {
        if section.is_empty() {
            continue;
        }
        lines.push(Line::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        for game in section.iter() {
            lines.push(game_line(game, offset));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn game_line(game: &ScheduledGame, offset: chrono::FixedOffset) -> Line<'static> {
    let status = schedule::status_label(game.status.as_deref());
    let color = match schedule::classify_status(game.status.as_deref()) {
        schedule::GameStatus::Final => Color::Gray,
        schedule::GameStatus::Live => Color::Red,
        schedule::GameStatus::Scheduled => Color::Green,
    };
    let (away_score, home_score) = schedule::score_text(game);
    Line::from(vec![
        Span::styled(format!("{status:<10}"), Style::default().fg(color)),
        Span::raw(format!(
            " {} {away_score:>3} @ {} {home_score:>3}  {:<9} {} at {}",
            schedule::team_badge(game.away_team.as_deref()),
            schedule::team_badge(game.home_team.as_deref()),
            schedule::start_time_text(game, offset),
            game.away_team.as_deref().unwrap_or("TBD"),
            game.home_team.as_deref().unwrap_or("TBD"),
        )),
    ])
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Hoops Terminal - Help",
        "",
        "Global:",
        "  1 / 2 / 3    Home / Dashboard / Results",
        "  j/k or ↑/↓   Move/scroll",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Home:",
        "  Enter        Open featured player",
        "  s            Shuffle spotlight",
        "  o            Open spotlight in dashboard",
        "  r            Refresh standings",
        "",
        "Dashboard:",
        "  Enter        Select player",
        "  p            Predict points",
        "  c            Toggle comparison",
        "  [ / ]        Previous/next comparison player",
        "  v            Rerun comparison",
        "  x            Clear selection",
        "  r            Reload players",
        "",
        "Results:",
        "  r            Refresh games",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
