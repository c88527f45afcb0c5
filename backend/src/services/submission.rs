use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;

use crate::config::settings::AppConfig;
use crate::domain::time::now;
use crate::domain::{Game, GameKind, GameRequest, Player, validate_player_name};
use crate::errors::{RatingError, RatingResult};
use crate::ranking::compute_rankings;
use crate::rating::apply_game;
use crate::store::{GameOrder, RecordStore};

/// Rating and rank of one participant around a submitted game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub name: String,
    pub rating_before: i32,
    pub rating_after: i32,
    pub rank_before: usize,
    pub rank_after: usize,
}

impl Movement {
    /// Positive when the player climbed.
    pub fn rank_change(&self) -> i64 {
        self.rank_before as i64 - self.rank_after as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub game: Game,
    pub movements: Vec<Movement>,
}

pub struct SubmissionService {
    store: Arc<dyn RecordStore>,
    config: AppConfig,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn RecordStore>, config: AppConfig) -> Self {
        Self { store, config }
    }

    pub fn register_player(&self, name: &str) -> RatingResult<Player> {
        let name = name.trim();
        validate_player_name(name)?;

        let player = Player::new(name);
        self.store.insert_player(&player)?;
        info!("Registered player {}", name);
        Ok(player)
    }

    /// Records a game played just now.
    pub fn submit_game(&self, request: GameRequest) -> RatingResult<SubmissionOutcome> {
        self.submit_at(request, now())
    }

    /// Records a game played at `played_at`. Decisive games move both
    /// ratings; multi-party games are stored without touching any player.
    /// Nothing is written when a participant is unknown.
    pub fn submit_at(&self, request: GameRequest, played_at: DateTime<Utc>) -> RatingResult<SubmissionOutcome> {
        request.validate()?;

        let mut participants = request
            .kind
            .participants()
            .into_iter()
            .map(|name| {
                self.store
                    .find_player(name)?
                    .ok_or_else(|| RatingError::player_not_found(name))
            })
            .collect::<RatingResult<Vec<_>>>()?;

        let mut players = self.store.find_all_players()?;
        let mut games = self.store.find_all_games(GameOrder::Insertion)?;
        let ranks_before = compute_rankings(&players, &games, &self.config.rating);
        let ratings_before: Vec<i32> = participants.iter().map(|p| p.current_rating).collect();

        let new_game = request.at(played_at);
        let decisive = matches!(new_game.kind, GameKind::Decisive { .. });
        if let (true, [winner, loser]) = (decisive, participants.as_mut_slice()) {
            let update = apply_game(winner, loser, played_at, &self.config.rating);
            debug!(
                "{} {} -> {}, {} {} -> {}",
                winner.name, update.winner.before, update.winner.after,
                loser.name, update.loser.before, update.loser.after
            );
        }

        let game = if decisive {
            self.store.record_game(new_game, &mut participants)?
        } else {
            self.store.save_game(new_game)?
        };
        info!("Recorded game {} ({})", game.id, game.kind.participants().join(" vs "));

        for updated in &participants {
            if let Some(slot) = players.iter_mut().find(|p| p.name == updated.name) {
                *slot = updated.clone();
            }
        }
        games.push(game.clone());
        let ranks_after = compute_rankings(&players, &games, &self.config.rating);

        let movements = participants
            .iter()
            .zip(ratings_before)
            .map(|(player, rating_before)| Movement {
                name: player.name.clone(),
                rating_before,
                rating_after: player.current_rating,
                rank_before: ranks_before.get(&player.name).copied().unwrap_or(0),
                rank_after: ranks_after.get(&player.name).copied().unwrap_or(0),
            })
            .collect();

        Ok(SubmissionOutcome { game, movements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::parse_iso;
    use crate::test_utils::{memory_store, store_with_players};

    #[test]
    fn test_first_game_between_newcomers() {
        let store = store_with_players(&["A", "B"]);
        let service = SubmissionService::new(store.clone(), AppConfig::default());
        let played_at = parse_iso("2024-01-01T10:00:00Z").unwrap();

        let outcome = service.submit_at(GameRequest::decisive("A", "B"), played_at).unwrap();

        let a = store.find_player("A").unwrap().unwrap();
        let b = store.find_player("B").unwrap().unwrap();
        assert_eq!((a.current_rating, a.games_played), (1016, 1));
        assert_eq!((b.current_rating, b.games_played), (984, 1));

        let entry = a.ledger.last().unwrap();
        assert_eq!(entry.rating, 1016);
        assert_eq!(entry.timestamp, played_at);
        assert_eq!(entry.game_ref, Some(outcome.game.id));

        assert_eq!(outcome.movements[0].rating_before, 1000);
        assert_eq!(outcome.movements[0].rank_after, 1);
        assert_eq!(outcome.movements[1].rank_after, 2);
    }

    #[test]
    fn test_unknown_player_leaves_store_untouched() {
        let store = store_with_players(&["A"]);
        let service = SubmissionService::new(store.clone(), AppConfig::default());

        let err = service.submit_game(GameRequest::decisive("A", "Ghost")).unwrap_err();

        assert!(matches!(err, RatingError::NotFound { kind: "player", .. }));
        assert!(store.find_all_games(GameOrder::Insertion).unwrap().is_empty());
        let a = store.find_player("A").unwrap().unwrap();
        assert_eq!((a.current_rating, a.games_played, a.ledger.len()), (1000, 0, 0));
    }

    #[test]
    fn test_invalid_request_rejected_before_lookup() {
        let service = SubmissionService::new(memory_store(), AppConfig::default());
        let err = service.submit_game(GameRequest::decisive("A", "A")).unwrap_err();
        assert!(matches!(err, RatingError::Validation(_)));
    }

    #[test]
    fn test_multi_party_game_keeps_ratings() {
        let store = store_with_players(&["A", "B", "C"]);
        let service = SubmissionService::new(store.clone(), AppConfig::default());

        let outcome = service.submit_game(GameRequest::multi_party(&["A", "B", "C"])).unwrap();

        assert!(outcome.game.is_multi_party());
        assert_eq!(outcome.movements.len(), 3);
        for name in ["A", "B", "C"] {
            let player = store.find_player(name).unwrap().unwrap();
            assert_eq!((player.current_rating, player.games_played), (1000, 0));
            assert!(player.ledger.is_empty());
        }
    }

    #[test]
    fn test_rank_movement_reported() {
        let store = store_with_players(&["A", "B", "C"]);
        let service = SubmissionService::new(store, AppConfig::default());
        let played_at = parse_iso("2024-01-01T10:00:00Z").unwrap();

        service.submit_at(GameRequest::decisive("A", "B"), played_at).unwrap();
        let outcome = service.submit_at(GameRequest::decisive("C", "A"), played_at).unwrap();

        let c = &outcome.movements[0];
        assert_eq!(c.name, "C");
        assert_eq!(c.rank_before, 2);
        assert_eq!(c.rank_after, 1);
        assert_eq!(c.rank_change(), 1);
    }

    #[test]
    fn test_duplicate_registration() {
        let service = SubmissionService::new(memory_store(), AppConfig::default());
        service.register_player("A").unwrap();

        assert!(matches!(service.register_player("A"), Err(RatingError::Validation(_))));
        assert!(matches!(service.register_player("  "), Err(RatingError::Validation(_))));
    }
}
