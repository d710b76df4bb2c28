use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::api::StatsApi;
use crate::state::{Delta, ProviderCommand};

/// Runs each command on its own worker thread so a slow endpoint never holds up
/// the others. Responses arrive in completion order; the reducer sorts out
/// which are still wanted.
pub fn spawn_provider(
    api: Arc<dyn StatsApi>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for cmd in cmd_rx {
            let api = Arc::clone(&api);
            let tx = tx.clone();
            thread::spawn(move || {
                let delta = execute(api.as_ref(), cmd);
                let _ = tx.send(delta);
            });
        }
    })
}

pub fn execute(api: &dyn StatsApi, cmd: ProviderCommand) -> Delta {
    match cmd {
        ProviderCommand::FetchPlayers => Delta::Players(api.players().map_err(describe)),
        ProviderCommand::FetchRecentGames { ticket } => {
            let result = api.recent_games(&ticket.player_id).map_err(describe);
            Delta::RecentGames { ticket, result }
        }
        ProviderCommand::FetchPrediction { slot, ticket } => {
            let result = api.predict(&ticket.player_id).map_err(describe);
            Delta::Prediction {
                slot,
                ticket,
                result,
            }
        }
        ProviderCommand::FetchStandings => Delta::Standings(api.standings().map_err(describe)),
        ProviderCommand::FetchSchedule => Delta::Schedule(api.schedule().map_err(describe)),
    }
}

// Innermost cause first: "request failed: 500 ..." reads better than the call site.
fn describe(err: anyhow::Error) -> String {
    err.root_cause().to_string()
}
