pub mod memory;

use anyhow::Result;

use crate::domain::{Game, NewGame, Player};

pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameOrder {
    /// Order the store received the games in
    #[default]
    Insertion,
    /// Oldest first; equal timestamps keep id order
    Chronological,
    NewestFirst,
}

/// Persistence the engines depend on. Implementations keep players in
/// registration order; ranking ties rely on it.
pub trait RecordStore: Send + Sync {
    fn find_player(&self, name: &str) -> Result<Option<Player>>;

    fn find_all_players(&self) -> Result<Vec<Player>>;

    /// Registers a new player. Fails if the name is taken.
    fn insert_player(&self, player: &Player) -> Result<()>;

    /// Overwrites a player if nobody saved it since it was loaded, then
    /// bumps `player.version`. A stale version fails with `RatingError::Conflict`.
    fn save_player(&self, player: &mut Player) -> Result<()>;

    fn find_all_games(&self, order: GameOrder) -> Result<Vec<Game>>;

    fn save_game(&self, game: NewGame) -> Result<Game>;

    /// Stores `game` and saves every player in `players` as one unit. The
    /// newest history entry of each player is linked to the new game id.
    /// Either everything is written or nothing is.
    fn record_game(&self, game: NewGame, players: &mut [Player]) -> Result<Game>;
}

pub fn sort_games(games: &mut [Game], order: GameOrder) {
    match order {
        GameOrder::Insertion => games.sort_by_key(|g| g.id),
        GameOrder::Chronological => games.sort_by_key(|g| (g.timestamp, g.id)),
        GameOrder::NewestFirst => {
            games.sort_by_key(|g| (g.timestamp, g.id));
            games.reverse();
        }
    }
}
