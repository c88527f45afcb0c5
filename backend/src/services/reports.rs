use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use crate::config::settings::AppConfig;
use crate::domain::{Game, INITIAL_RATING, Player};
use crate::errors::{RatingError, RatingResult};
use crate::ranking::{Cutoff, PlayerStats, RankEntry, compute_rankings, compute_standings, player_stats, rankings_at};
use crate::services::submission::Movement;
use crate::store::{GameOrder, RecordStore};
use crate::weekly::{WeekWindow, WeeklyDelta, weekly_delta, weekly_leaderboard};

const RECENT_GAMES_PER_PLAYER: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetail {
    pub name: String,
    pub rating: i32,
    pub games_played: u32,
    pub weekly_delta: i32,
    pub rank: usize,
    /// Newest first
    pub recent_games: Vec<Game>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub window: WeekWindow,
    pub leaderboard: Vec<WeeklyDelta>,
    pub player_of_the_week: Option<WeeklyDelta>,
}

/// A past decisive game with both sides' rating and rank around it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentResult {
    pub game: Game,
    pub winner: Movement,
    pub loser: Movement,
}

/// Read-only views over the record store
pub struct ReportService {
    store: Arc<dyn RecordStore>,
    config: AppConfig,
}

// Ratings right before and right after `game` according to the ledger.
fn ratings_around(player: &Player, game: &Game) -> (i32, i32) {
    let entries = player.ledger.entries();
    if let Some(idx) = entries.iter().position(|e| e.game_ref == Some(game.id)) {
        let before = idx
            .checked_sub(1)
            .map(|prev| entries[prev].rating)
            .unwrap_or(INITIAL_RATING);
        return (before, entries[idx].rating);
    }

    let before = player.ledger.rating_before(game.timestamp).unwrap_or(INITIAL_RATING);
    let after = player.ledger.rating_at(game.timestamp).unwrap_or(INITIAL_RATING);
    (before, after)
}

impl ReportService {
    pub fn new(store: Arc<dyn RecordStore>, config: AppConfig) -> Self {
        Self { store, config }
    }

    fn load(&self, order: GameOrder) -> RatingResult<(Vec<Player>, Vec<Game>)> {
        let players = self.store.find_all_players()?;
        let games = self.store.find_all_games(order)?;
        Ok((players, games))
    }

    pub fn players(&self) -> RatingResult<Vec<Player>> {
        Ok(self.store.find_all_players()?)
    }

    pub fn standings(&self) -> RatingResult<Vec<RankEntry>> {
        let (players, games) = self.load(GameOrder::Insertion)?;
        Ok(compute_standings(&players, &games, &self.config.rating))
    }

    pub fn stats(&self) -> RatingResult<Vec<PlayerStats>> {
        let (players, games) = self.load(GameOrder::Insertion)?;
        Ok(player_stats(&players, &games, &self.config.rating))
    }

    pub fn games(&self) -> RatingResult<Vec<Game>> {
        Ok(self.store.find_all_games(GameOrder::NewestFirst)?)
    }

    pub fn player_detail(&self, name: &str, reference: DateTime<Utc>) -> RatingResult<PlayerDetail> {
        let (players, games) = self.load(GameOrder::NewestFirst)?;
        let player = players
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| RatingError::player_not_found(name))?;

        let window = WeekWindow::containing(reference, &self.config.week.calendar());
        let rankings = compute_rankings(&players, &games, &self.config.rating);

        Ok(PlayerDetail {
            name: player.name.clone(),
            rating: player.trusted_rating(),
            games_played: player.games_played,
            weekly_delta: weekly_delta(player, &window),
            rank: rankings.get(name).copied().unwrap_or(0),
            recent_games: games
                .iter()
                .filter(|g| g.involves(name))
                .take(RECENT_GAMES_PER_PLAYER)
                .cloned()
                .collect(),
        })
    }

    pub fn weekly(&self, reference: DateTime<Utc>) -> RatingResult<WeeklyReport> {
        let (players, games) = self.load(GameOrder::Insertion)?;
        let window = WeekWindow::containing(reference, &self.config.week.calendar());
        let leaderboard = weekly_leaderboard(&players, &games, &window);

        Ok(WeeklyReport {
            window,
            player_of_the_week: leaderboard.first().cloned(),
            leaderboard,
        })
    }

    /// The `limit` newest decisive games with rating and rank movement of
    /// both sides. Games whose players are gone are left out.
    pub fn recent_results(&self, limit: usize) -> RatingResult<Vec<RecentResult>> {
        let (players, games) = self.load(GameOrder::NewestFirst)?;
        let find = |name: &str| players.iter().find(|p| p.name == name);

        let mut results = Vec::new();
        for game in games.iter().filter(|g| !g.is_multi_party()).take(limit) {
            let Some((winner_name, loser_name)) = game.decisive_pair() else {
                continue;
            };
            let (Some(winner), Some(loser)) = (find(winner_name), find(loser_name)) else {
                debug!("Leaving game {} out of recent results: player missing", game.id);
                continue;
            };

            let ranks_before = rankings_at(&players, &games, Cutoff::Before(game.timestamp), &self.config.rating);
            let ranks_after = rankings_at(&players, &games, Cutoff::AtOrBefore(game.timestamp), &self.config.rating);

            let movement = |player: &Player| {
                let (rating_before, rating_after) = ratings_around(player, game);
                Movement {
                    name: player.name.clone(),
                    rating_before,
                    rating_after,
                    rank_before: ranks_before.get(&player.name).copied().unwrap_or(0),
                    rank_after: ranks_after.get(&player.name).copied().unwrap_or(0),
                }
            };

            results.push(RecentResult {
                game: game.clone(),
                winner: movement(winner),
                loser: movement(loser),
            });
        }

        Ok(results)
    }
}
