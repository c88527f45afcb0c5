use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::models::PlayerRow;
use crate::domain::Player;
use crate::errors::{RatingError, storage_context};

const PLAYER_COLUMNS: &str = "name, elo_rating, games_played, elo_history, version";

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<PlayerRow> {
    Ok(PlayerRow {
        name: row.get(0)?,
        elo_rating: row.get(1)?,
        games_played: row.get(2)?,
        elo_history: row.get(3)?,
        version: row.get(4)?,
    })
}

fn history_json(player: &Player) -> Result<String> {
    serde_json::to_string(&player.ledger)
        .with_context(|| storage_context("serialize rating history", &player.name))
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Player>> {
    let sql = format!("SELECT {} FROM players WHERE name = ?1", PLAYER_COLUMNS);

    conn.query_row(&sql, params![name], parse_player_row)
        .optional()
        .context("Failed to query player by name")?
        .map(PlayerRow::into_player)
        .transpose()
}

/// All players in registration order.
pub fn list_all(conn: &Connection) -> Result<Vec<Player>> {
    let sql = format!("SELECT {} FROM players ORDER BY id", PLAYER_COLUMNS);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list players")?;

    rows.into_iter().map(PlayerRow::into_player).collect()
}

pub fn insert_player(conn: &Connection, player: &Player) -> Result<()> {
    if find_by_name(conn, &player.name)?.is_some() {
        anyhow::bail!(RatingError::Validation(format!(
            "player {} already exists",
            player.name
        )));
    }

    let sql = "INSERT INTO players (name, elo_rating, games_played, elo_history, version) VALUES (?1, ?2, ?3, ?4, ?5)";
    conn.execute(
        sql,
        params![
            player.name,
            player.current_rating,
            player.games_played,
            history_json(player)?,
            player.version as i64
        ],
    )
    .with_context(|| storage_context("insert player", &player.name))?;

    Ok(())
}

/// Writes `player` over its row if the stored version still matches the
/// one it was loaded with. The stored version is bumped by one.
pub fn update_player(conn: &Connection, player: &Player) -> Result<()> {
    let sql = "UPDATE players SET elo_rating = ?1, games_played = ?2, elo_history = ?3, version = version + 1 WHERE name = ?4 AND version = ?5";

    let changed = conn
        .execute(
            sql,
            params![
                player.current_rating,
                player.games_played,
                history_json(player)?,
                player.name,
                player.version as i64
            ],
        )
        .with_context(|| storage_context("update player", &player.name))?;

    if changed == 0 {
        if find_by_name(conn, &player.name)?.is_none() {
            anyhow::bail!(RatingError::player_not_found(&player.name));
        }
        anyhow::bail!(RatingError::Conflict(player.name.clone()));
    }

    Ok(())
}
