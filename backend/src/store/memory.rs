use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow, bail};

use super::{GameOrder, RecordStore, sort_games};
use crate::domain::{Game, GameId, NewGame, Player};
use crate::errors::RatingError;

/// Record store kept entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    players: Vec<Player>,
    games: Vec<Game>,
    last_game_id: GameId,
}

impl Inner {
    fn position(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }

    fn check_version(&self, player: &Player) -> Result<usize> {
        let idx = self
            .position(&player.name)
            .ok_or_else(|| RatingError::player_not_found(&player.name))?;
        if self.players[idx].version != player.version {
            return Err(RatingError::Conflict(player.name.clone()).into());
        }
        Ok(idx)
    }

    fn next_game(&mut self, game: NewGame) -> Game {
        self.last_game_id += 1;
        game.into_game(self.last_game_id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl RecordStore for MemoryStore {
    fn find_player(&self, name: &str) -> Result<Option<Player>> {
        let inner = self.lock()?;
        Ok(inner.players.iter().find(|p| p.name == name).cloned())
    }

    fn find_all_players(&self) -> Result<Vec<Player>> {
        Ok(self.lock()?.players.clone())
    }

    fn insert_player(&self, player: &Player) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.position(&player.name).is_some() {
            bail!(RatingError::Validation(format!("player {} already exists", player.name)));
        }
        inner.players.push(player.clone());
        Ok(())
    }

    fn save_player(&self, player: &mut Player) -> Result<()> {
        let mut inner = self.lock()?;
        let idx = inner.check_version(player)?;
        player.version += 1;
        inner.players[idx] = player.clone();
        Ok(())
    }

    fn find_all_games(&self, order: GameOrder) -> Result<Vec<Game>> {
        let mut games = self.lock()?.games.clone();
        sort_games(&mut games, order);
        Ok(games)
    }

    fn save_game(&self, game: NewGame) -> Result<Game> {
        let mut inner = self.lock()?;
        let game = inner.next_game(game);
        inner.games.push(game.clone());
        Ok(game)
    }

    fn record_game(&self, game: NewGame, players: &mut [Player]) -> Result<Game> {
        let mut inner = self.lock()?;

        // Validate everything before the first write.
        let positions = players
            .iter()
            .map(|p| inner.check_version(p))
            .collect::<Result<Vec<_>>>()?;

        let game = inner.next_game(game);
        inner.games.push(game.clone());

        for (player, idx) in players.iter_mut().zip(positions) {
            player.ledger.link_latest(game.id);
            player.version += 1;
            inner.players[idx] = player.clone();
        }

        Ok(game)
    }
}
