use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use serde::Serialize;

use crate::config::settings::AppConfig;
use crate::domain::{Game, Player};
use crate::rating::apply_game;
use crate::store::{GameOrder, RecordStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub players: usize,
    pub applied: usize,
    pub skipped: usize,
}

/// Rebuilds every rating, counter and history from the recorded games.
pub struct ReplayService {
    store: Arc<dyn RecordStore>,
    config: AppConfig,
}

// Two distinct players out of one slice.
fn pair_mut(players: &mut [Player], first: usize, second: usize) -> Option<(&mut Player, &mut Player)> {
    if first == second || first >= players.len() || second >= players.len() {
        return None;
    }
    if first < second {
        let (head, tail) = players.split_at_mut(second);
        Some((&mut head[first], &mut tail[0]))
    } else {
        let (head, tail) = players.split_at_mut(first);
        Some((&mut tail[0], &mut head[second]))
    }
}

impl ReplayService {
    pub fn new(store: Arc<dyn RecordStore>, config: AppConfig) -> Self {
        Self { store, config }
    }

    pub fn run(&self) -> Result<ReplayReport> {
        info!("=== Starting History Replay ===");

        let mut players = self.store.find_all_players()?;
        let games = self.store.find_all_games(GameOrder::Chronological)?;
        info!("  → Loaded {} players and {} games", players.len(), games.len());

        let report = replay(&mut players, &games, &self.config);

        for player in players.iter_mut() {
            self.store.save_player(player)?;
        }
        info!(
            "=== Replay Complete: {} games applied, {} skipped, {} players saved ===",
            report.applied, report.skipped, report.players
        );

        Ok(report)
    }
}

/// Resets `players` and applies `games` in the order given, linking each
/// new history entry to its game. Games naming an unknown player are skipped.
pub fn replay(players: &mut [Player], games: &[Game], config: &AppConfig) -> ReplayReport {
    for player in players.iter_mut() {
        player.reset();
    }

    let index: HashMap<String, usize> = players
        .iter()
        .enumerate()
        .map(|(idx, p)| (p.name.clone(), idx))
        .collect();

    let mut report = ReplayReport {
        players: players.len(),
        ..ReplayReport::default()
    };

    for game in games {
        let Some((winner, loser)) = game.decisive_pair() else {
            continue;
        };

        let resolved = match (index.get(winner), index.get(loser)) {
            (Some(&w), Some(&l)) => pair_mut(players, w, l),
            _ => None,
        };

        match resolved {
            Some((winner, loser)) => {
                apply_game(winner, loser, game.timestamp, &config.rating);
                winner.ledger.link_latest(game.id);
                loser.ledger.link_latest(game.id);
                report.applied += 1;
            }
            None => {
                warn!("Skipping game {}: {} vs {} does not resolve to two players", game.id, winner, loser);
                report.skipped += 1;
            }
        }
    }

    report
}
