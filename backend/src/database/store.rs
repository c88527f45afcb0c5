use anyhow::{Context, Result};
use log::info;

use super::connection::{DbPool, create_memory_pool, create_pool, get_connection};
use super::{games, players, setup};
use crate::domain::{Game, NewGame, Player};
use crate::store::{GameOrder, RecordStore, sort_games};

/// Record store backed by SQLite
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn open(database_path: &str) -> Result<Self> {
        let pool = create_pool(database_path)?;
        let store = Self::with_pool(pool)?;
        info!("Opened database {}", database_path);
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_pool(create_memory_pool()?)
    }

    fn with_pool(pool: DbPool) -> Result<Self> {
        let conn = get_connection(&pool)?;
        setup::initialize_schema(&conn)?;
        drop(conn);
        Ok(Self { pool })
    }
}

impl RecordStore for SqliteStore {
    fn find_player(&self, name: &str) -> Result<Option<Player>> {
        let conn = get_connection(&self.pool)?;
        players::find_by_name(&conn, name)
    }

    fn find_all_players(&self) -> Result<Vec<Player>> {
        let conn = get_connection(&self.pool)?;
        players::list_all(&conn)
    }

    fn insert_player(&self, player: &Player) -> Result<()> {
        let conn = get_connection(&self.pool)?;
        players::insert_player(&conn, player)
    }

    fn save_player(&self, player: &mut Player) -> Result<()> {
        let conn = get_connection(&self.pool)?;
        players::update_player(&conn, player)?;
        player.version += 1;
        Ok(())
    }

    fn find_all_games(&self, order: GameOrder) -> Result<Vec<Game>> {
        let conn = get_connection(&self.pool)?;
        let mut all = games::list_all(&conn)?;
        sort_games(&mut all, order);
        Ok(all)
    }

    fn save_game(&self, game: NewGame) -> Result<Game> {
        let conn = get_connection(&self.pool)?;
        games::insert_game(&conn, game)
    }

    fn record_game(&self, game: NewGame, participants: &mut [Player]) -> Result<Game> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction().context("Failed to start transaction")?;

        let game = games::insert_game(&tx, game)?;

        // Callers only see the linked, bumped copies once the commit went through.
        let mut updated = participants.to_vec();
        for player in updated.iter_mut() {
            player.ledger.link_latest(game.id);
            players::update_player(&tx, player)?;
            player.version += 1;
        }

        tx.commit().context("Failed to commit game")?;
        participants.clone_from_slice(&updated);
        Ok(game)
    }
}
