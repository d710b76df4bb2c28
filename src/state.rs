use std::collections::VecDeque;
use std::time::Instant;

use rand::seq::SliceRandom;

use crate::api::{PredictionResult, ScheduledGame, Standings};
use crate::metrics::{self, FormSummary};
use crate::normalize::{GameRecord, PlayerId, PlayerRef};
use crate::present::{self, Breakdown, ConfidenceGauge};
use crate::team::{self, TeamDetails, TeamOverrides};
use crate::tween::AnimatedValue;

pub const FEATURED_COUNT: usize = 5;
const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Dashboard,
    Results,
}

/// Lifecycle of one independent data source.
#[derive(Debug, Clone, PartialEq)]
pub enum Load<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for Load<T> {
    fn default() -> Self {
        Load::Idle
    }
}

impl<T> Load<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Load::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Load::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Load::Failed(msg) => Some(msg.as_str()),
            _ => None,
        }
    }

    fn settle(&mut self, result: Result<T, String>) {
        *self = match result {
            Ok(value) => Load::Ready(value),
            Err(msg) => Load::Failed(msg),
        };
    }
}

/// Identity of a selection-scoped request. A response is only applied while its
/// ticket is still the pending one for that source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub player_id: PlayerId,
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub struct Tracked<T> {
    pub load: Load<T>,
    pending: Option<Ticket>,
}

impl<T> Default for Tracked<T> {
    fn default() -> Self {
        Self {
            load: Load::Idle,
            pending: None,
        }
    }
}

impl<T> Tracked<T> {
    fn begin(&mut self, ticket: Ticket) {
        self.pending = Some(ticket);
        self.load = Load::Loading;
    }

    fn accept(&mut self, ticket: &Ticket) -> bool {
        if self.pending.as_ref() == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.pending = None;
        self.load = Load::Idle;
    }

    pub fn pending(&self) -> Option<&Ticket> {
        self.pending.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSlot {
    Primary,
    Secondary,
    Spotlight,
}

#[derive(Debug, Clone, Default)]
pub struct Comparison {
    pub enabled: bool,
    pub secondary: Option<PlayerRef>,
    pub prediction: Tracked<PredictionResult>,
}

#[derive(Debug, Clone)]
pub enum Delta {
    Players(Result<Vec<PlayerRef>, String>),
    RecentGames {
        ticket: Ticket,
        result: Result<Vec<GameRecord>, String>,
    },
    Prediction {
        slot: PredictionSlot,
        ticket: Ticket,
        result: Result<PredictionResult, String>,
    },
    Standings(Result<Standings, String>),
    Schedule(Result<Vec<ScheduledGame>, String>),
    Log(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCommand {
    FetchPlayers,
    FetchRecentGames { ticket: Ticket },
    FetchPrediction { slot: PredictionSlot, ticket: Ticket },
    FetchStandings,
    FetchSchedule,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub players: Load<Vec<PlayerRef>>,
    pub player_cursor: usize,
    pub featured: Vec<PlayerRef>,
    pub featured_cursor: usize,
    pub selected: Option<PlayerRef>,
    pub recent_games: Tracked<Vec<GameRecord>>,
    pub summary: Option<FormSummary>,
    pub prediction: Tracked<PredictionResult>,
    pub team_details: Option<TeamDetails>,
    pub displayed_points: AnimatedValue,
    pub comparison: Comparison,
    pub spotlight: Option<PlayerRef>,
    pub spotlight_prediction: Tracked<PredictionResult>,
    pub standings: Load<Standings>,
    pub schedule: Load<Vec<ScheduledGame>>,
    pub schedule_scroll: u16,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub team_overrides: TeamOverrides,
    next_seq: u64,
    outbox: Vec<ProviderCommand>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Home,
            players: Load::Idle,
            player_cursor: 0,
            featured: Vec::with_capacity(FEATURED_COUNT),
            featured_cursor: 0,
            selected: None,
            recent_games: Tracked::default(),
            summary: None,
            prediction: Tracked::default(),
            team_details: None,
            displayed_points: AnimatedValue::default(),
            comparison: Comparison::default(),
            spotlight: None,
            spotlight_prediction: Tracked::default(),
            standings: Load::Idle,
            schedule: Load::Idle,
            schedule_scroll: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            team_overrides: TeamOverrides::default(),
            next_seq: 0,
            outbox: Vec::new(),
        }
    }

    pub fn with_team_overrides(mut self, overrides: TeamOverrides) -> Self {
        self.team_overrides = overrides;
        self
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Commands queued since the last drain, oldest first.
    pub fn drain_outbox(&mut self) -> Vec<ProviderCommand> {
        std::mem::take(&mut self.outbox)
    }

    fn ticket_for(&mut self, player_id: &PlayerId) -> Ticket {
        self.next_seq += 1;
        Ticket {
            player_id: player_id.clone(),
            seq: self.next_seq,
        }
    }

    pub fn enter_screen(&mut self, screen: Screen) {
        self.screen = screen;
        match screen {
            Screen::Home => {
                if self.players.is_idle() {
                    self.request_players();
                }
                if self.standings.is_idle() {
                    self.request_standings();
                }
            }
            Screen::Dashboard => {
                if self.players.is_idle() {
                    self.request_players();
                }
            }
            Screen::Results => {
                if self.schedule.is_idle() {
                    self.request_schedule();
                }
            }
        }
    }

    pub fn request_players(&mut self) {
        self.players = Load::Loading;
        self.outbox.push(ProviderCommand::FetchPlayers);
    }

    pub fn request_standings(&mut self) {
        self.standings = Load::Loading;
        self.outbox.push(ProviderCommand::FetchStandings);
    }

    pub fn request_schedule(&mut self) {
        self.schedule = Load::Loading;
        self.outbox.push(ProviderCommand::FetchSchedule);
    }

    pub fn player_list(&self) -> &[PlayerRef] {
        self.players.ready().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Switches the primary selection. Everything derived from the previous player
    /// is dropped, so late responses for it no longer match a pending ticket.
    pub fn select_player(&mut self, player: PlayerRef) {
        let ticket = self.ticket_for(&player.player_id);
        self.push_log(format!("[INFO] Selected {}", player.player_name));
        self.prediction.reset();
        self.displayed_points.clear();
        self.team_details = None;
        self.summary = None;
        self.recent_games.begin(ticket.clone());
        self.outbox.push(ProviderCommand::FetchRecentGames { ticket });

        let clashes = self
            .comparison
            .secondary
            .as_ref()
            .is_some_and(|s| s.player_id == player.player_id);
        self.selected = Some(player);
        if clashes {
            self.comparison.secondary = None;
            self.comparison.prediction.reset();
            if self.comparison.enabled {
                self.cycle_secondary(1);
            }
        }
    }

    pub fn select_player_at_cursor(&mut self) {
        if let Some(player) = self.player_list().get(self.player_cursor).cloned() {
            self.select_player(player);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.recent_games.reset();
        self.prediction.reset();
        self.displayed_points.clear();
        self.team_details = None;
        self.summary = None;
        self.comparison = Comparison::default();
    }

    pub fn request_prediction(&mut self) {
        let Some(player_id) = self.selected.as_ref().map(|p| p.player_id.clone()) else {
            self.push_log("[INFO] Select a player first");
            return;
        };
        let ticket = self.ticket_for(&player_id);
        self.prediction.begin(ticket.clone());
        self.outbox.push(ProviderCommand::FetchPrediction {
            slot: PredictionSlot::Primary,
            ticket,
        });
    }

    pub fn toggle_comparison(&mut self) {
        if self.comparison.enabled {
            self.comparison = Comparison::default();
            return;
        }
        if self.selected.is_none() {
            self.push_log("[INFO] Select a player before comparing");
            return;
        }
        self.comparison.enabled = true;
        self.cycle_secondary(1);
    }

    /// Moves the secondary pick through the list, skipping the primary player, and
    /// requests its prediction.
    pub fn cycle_secondary(&mut self, step: isize) {
        if !self.comparison.enabled {
            return;
        }
        let primary = self.selected.as_ref().map(|p| p.player_id.clone());
        let candidates: Vec<&PlayerRef> = self
            .player_list()
            .iter()
            .filter(|p| Some(&p.player_id) != primary.as_ref())
            .collect();
        if candidates.is_empty() {
            self.push_log("[INFO] No other player to compare with");
            return;
        }
        let current = self.comparison.secondary.as_ref().and_then(|s| {
            candidates
                .iter()
                .position(|p| p.player_id == s.player_id)
        });
        let len = candidates.len() as isize;
        let next = match current {
            Some(idx) => (idx as isize + step).rem_euclid(len) as usize,
            None => 0,
        };
        let pick = candidates[next].clone();
        self.comparison.secondary = Some(pick);
        self.request_comparison();
    }

    pub fn request_comparison(&mut self) {
        let Some(player_id) = self
            .comparison
            .secondary
            .as_ref()
            .map(|p| p.player_id.clone())
        else {
            return;
        };
        let ticket = self.ticket_for(&player_id);
        self.comparison.prediction.begin(ticket.clone());
        self.outbox.push(ProviderCommand::FetchPrediction {
            slot: PredictionSlot::Secondary,
            ticket,
        });
    }

    pub fn shuffle_spotlight(&mut self) {
        let current = self.spotlight.as_ref().map(|p| p.player_id.clone());
        let mut rng = rand::thread_rng();
        let candidates: Vec<&PlayerRef> = self
            .player_list()
            .iter()
            .filter(|p| Some(&p.player_id) != current.as_ref())
            .collect();
        let pick = candidates
            .choose(&mut rng)
            .map(|p| (*p).clone())
            .or_else(|| self.player_list().first().cloned());
        let Some(pick) = pick else {
            return;
        };
        let ticket = self.ticket_for(&pick.player_id);
        self.spotlight = Some(pick);
        self.spotlight_prediction.begin(ticket.clone());
        self.outbox.push(ProviderCommand::FetchPrediction {
            slot: PredictionSlot::Spotlight,
            ticket,
        });
    }

    /// Opens a player on the Dashboard and asks for its prediction straight away.
    pub fn open_in_dashboard(&mut self, player: PlayerRef) {
        self.enter_screen(Screen::Dashboard);
        if let Some(idx) = self
            .player_list()
            .iter()
            .position(|p| p.player_id == player.player_id)
        {
            self.player_cursor = idx;
        }
        self.select_player(player);
        self.request_prediction();
    }

    pub fn open_spotlight(&mut self) {
        if let Some(player) = self.spotlight.clone() {
            self.open_in_dashboard(player);
        }
    }

    pub fn open_featured(&mut self) {
        if let Some(player) = self.featured.get(self.featured_cursor).cloned() {
            self.open_in_dashboard(player);
        }
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Home => {
                if self.featured_cursor + 1 < self.featured.len() {
                    self.featured_cursor += 1;
                }
            }
            Screen::Dashboard => {
                if self.player_cursor + 1 < self.player_list().len() {
                    self.player_cursor += 1;
                }
            }
            Screen::Results => self.schedule_scroll = self.schedule_scroll.saturating_add(1),
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Home => self.featured_cursor = self.featured_cursor.saturating_sub(1),
            Screen::Dashboard => self.player_cursor = self.player_cursor.saturating_sub(1),
            Screen::Results => self.schedule_scroll = self.schedule_scroll.saturating_sub(1),
        }
    }

    pub fn games(&self) -> &[GameRecord] {
        self.recent_games.load.ready().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn chart_ready(&self) -> bool {
        metrics::has_enough_games(self.games())
    }

    /// Summary shown on the cards; blank below the chart threshold.
    pub fn card_summary(&self) -> Option<FormSummary> {
        self.summary.filter(|_| self.chart_ready())
    }

    pub fn predicted_points(&self) -> Option<f64> {
        self.prediction.load.ready().map(|p| p.predicted_points)
    }

    pub fn gauge(&self) -> Option<ConfidenceGauge> {
        let confidence = self.prediction.load.ready()?.confidence.as_ref()?;
        Some(present::map_confidence_to_gauge(confidence))
    }

    pub fn breakdown(&self) -> Option<Breakdown> {
        let result = self.prediction.load.ready()?;
        Some(present::map_breakdown(
            result.predicted_points,
            result.model_prediction,
        ))
    }

    fn prediction_slot(&mut self, slot: PredictionSlot) -> &mut Tracked<PredictionResult> {
        match slot {
            PredictionSlot::Primary => &mut self.prediction,
            PredictionSlot::Secondary => &mut self.comparison.prediction,
            PredictionSlot::Spotlight => &mut self.spotlight_prediction,
        }
    }

    fn pick_featured(&mut self) {
        let mut rng = rand::thread_rng();
        let list = self.player_list();
        let featured: Vec<PlayerRef> = list
            .choose_multiple(&mut rng, FEATURED_COUNT.min(list.len()))
            .cloned()
            .collect();
        self.featured = featured;
        self.featured_cursor = 0;
    }

    fn apply_primary_prediction(&mut self, ticket: &Ticket, mut result: PredictionResult) {
        let details = team::resolve_team_details(
            result.team.as_ref(),
            self.selected.as_ref(),
            &self.team_overrides,
            &ticket.player_id,
        );
        self.team_details = Some(details);
        self.displayed_points
            .retarget(result.predicted_points, Instant::now());

        if !result.recent_games.is_empty() {
            // Supersedes any recent-games fetch still in flight.
            let games = std::mem::take(&mut result.recent_games);
            self.recent_games.reset();
            self.recent_games.load = Load::Ready(games);
        }
        self.summary = result
            .form_summary
            .or_else(|| metrics::compute_form_summary(self.games()));
        self.push_log(format!(
            "[INFO] Prediction for {}: {:.1} pts",
            ticket.player_id, result.predicted_points
        ));
        self.prediction.load = Load::Ready(result);
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Players(result) => match result {
            Ok(players) => {
                state.push_log(format!("[INFO] Loaded {} players", players.len()));
                state.player_cursor = state.player_cursor.min(players.len().saturating_sub(1));
                state.players = Load::Ready(players);
                state.pick_featured();
                state.shuffle_spotlight();
            }
            Err(msg) => {
                state.push_log(format!("[WARN] Players fetch failed: {msg}"));
                state.players = Load::Failed(msg);
            }
        },
        Delta::RecentGames { ticket, result } => {
            if !state.recent_games.accept(&ticket) {
                state.push_log(format!(
                    "[INFO] Discarded stale recent games for player {}",
                    ticket.player_id
                ));
                return;
            }
            if let Err(msg) = &result {
                state.push_log(format!("[WARN] Recent games fetch failed: {msg}"));
            }
            state.recent_games.load.settle(result);
            if state.prediction.load.ready().is_none() {
                state.summary = metrics::compute_form_summary(state.games());
            }
        }
        Delta::Prediction {
            slot,
            ticket,
            result,
        } => {
            if !state.prediction_slot(slot).accept(&ticket) {
                state.push_log(format!(
                    "[INFO] Discarded stale prediction for player {}",
                    ticket.player_id
                ));
                return;
            }
            match (slot, result) {
                (PredictionSlot::Primary, Ok(result)) => {
                    state.apply_primary_prediction(&ticket, result);
                }
                (PredictionSlot::Primary, Err(msg)) => {
                    state.push_log(format!("[WARN] Prediction failed: {msg}"));
                    state.displayed_points.clear();
                    state.team_details = None;
                    state.prediction.load = Load::Failed(msg);
                }
                (slot, result) => {
                    if let Err(msg) = &result {
                        state.push_log(format!(
                            "[WARN] Prediction for player {} failed: {msg}",
                            ticket.player_id
                        ));
                    }
                    state.prediction_slot(slot).load.settle(result);
                }
            }
        }
        Delta::Standings(result) => {
            if let Err(msg) = &result {
                state.push_log(format!("[WARN] Standings fetch failed: {msg}"));
            }
            state.standings.settle(result);
        }
        Delta::Schedule(result) => {
            if let Err(msg) = &result {
                state.push_log(format!("[WARN] Games fetch failed: {msg}"));
            }
            state.schedule_scroll = 0;
            state.schedule.settle(result);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
