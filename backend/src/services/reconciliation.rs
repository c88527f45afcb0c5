use std::ops::AddAssign;
use std::sync::Arc;

use anyhow::Result;
use chrono::TimeDelta;
use log::{debug, info};
use serde::Serialize;

use crate::config::settings::{AppConfig, ReconcileSettings};
use crate::domain::{Game, LedgerEntry, Outcome, Player};
use crate::store::{GameOrder, RecordStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub linked: usize,
    pub date_adjustments: usize,
}

impl AddAssign for ReconcileReport {
    fn add_assign(&mut self, other: Self) {
        self.linked += other.linked;
        self.date_adjustments += other.date_adjustments;
    }
}

/// Links history entries written before games carried ids back to the
/// games that produced them.
pub struct ReconciliationService {
    store: Arc<dyn RecordStore>,
    settings: ReconcileSettings,
}

impl ReconciliationService {
    pub fn new(store: Arc<dyn RecordStore>, config: AppConfig) -> Self {
        Self {
            store,
            settings: config.reconcile,
        }
    }

    pub fn with_tolerance(mut self, tolerance: TimeDelta) -> Self {
        self.settings.tolerance = tolerance;
        self
    }

    pub fn run(&self) -> Result<ReconcileReport> {
        info!("=== Starting Reconciliation (tolerance {}m) ===", self.settings.tolerance.num_minutes());

        let games = self.store.find_all_games(GameOrder::Chronological)?;
        let mut total = ReconcileReport::default();

        for mut player in self.store.find_all_players()? {
            let report = reconcile_player(&mut player, &games, &self.settings);
            if report.linked > 0 {
                self.store.save_player(&mut player)?;
                info!(
                    "  → {}: linked {}, adjusted {} dates",
                    player.name, report.linked, report.date_adjustments
                );
            }
            total += report;
        }

        info!(
            "=== Reconciliation Complete: {} linked, {} dates adjusted ===",
            total.linked, total.date_adjustments
        );
        Ok(total)
    }
}

fn within(entry: &LedgerEntry, game: &Game, tolerance: TimeDelta) -> bool {
    (game.timestamp - entry.timestamp).abs() <= tolerance
}

fn hinted(player: &str, entry: &LedgerEntry, game: &Game) -> bool {
    let (Some((result, opponent)), Some((winner, loser))) = (entry.direction(), game.decisive_pair()) else {
        return false;
    };
    match result {
        Outcome::Win => winner == player && loser == opponent,
        Outcome::Loss => winner == opponent && loser == player,
    }
}

// Closest candidate; the first one in `games` order wins ties.
fn closest<'a>(entry: &LedgerEntry, candidates: impl Iterator<Item = &'a Game>) -> Option<&'a Game> {
    let mut best: Option<(&Game, TimeDelta)> = None;
    for game in candidates {
        let distance = (game.timestamp - entry.timestamp).abs();
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((game, distance)),
        }
    }
    best.map(|(game, _)| game)
}

/// Game an unlinked entry most likely came from. `games` must be in
/// chronological order.
pub fn find_match<'a>(player: &str, entry: &LedgerEntry, games: &'a [Game], tolerance: TimeDelta) -> Option<&'a Game> {
    let nearby = || games.iter().filter(move |g| within(entry, g, tolerance));

    if entry.direction().is_some() {
        if let Some(game) = closest(entry, nearby().filter(|g| hinted(player, entry, g))) {
            return Some(game);
        }
    }
    closest(entry, nearby().filter(|g| g.involves(player)))
}

/// Links every unlinked, non-sentinel entry of `player` and pulls drifted
/// timestamps onto the matched game.
pub fn reconcile_player(player: &mut Player, games: &[Game], settings: &ReconcileSettings) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let name = player.name.clone();

    for entry in player.ledger.entries_mut() {
        if entry.is_sentinel() || entry.is_linked() {
            continue;
        }

        let Some(game) = find_match(&name, entry, games, settings.tolerance) else {
            debug!("No game for {} entry at {}", name, entry.timestamp);
            continue;
        };

        entry.game_ref = Some(game.id);
        report.linked += 1;

        if (game.timestamp - entry.timestamp).abs() > settings.drift_threshold {
            entry.timestamp = game.timestamp;
            report.date_adjustments += 1;
        }
    }

    report
}
