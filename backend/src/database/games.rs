use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use super::models::GameRow;
use crate::domain::time::format_iso;
use crate::domain::{Game, GameKind, NewGame};

const GAME_COLUMNS: &str =
    "id, winner, loser, participants, is_multiplayer, date, format_type, legs, highest_checkout";

fn parse_game_row(row: &rusqlite::Row) -> rusqlite::Result<GameRow> {
    Ok(GameRow {
        id: row.get(0)?,
        winner: row.get(1)?,
        loser: row.get(2)?,
        participants: row.get(3)?,
        is_multiplayer: row.get(4)?,
        date: row.get(5)?,
        format_type: row.get(6)?,
        legs: row.get(7)?,
        highest_checkout: row.get(8)?,
    })
}

pub fn insert_game(conn: &Connection, game: NewGame) -> Result<Game> {
    let (winner, loser, participants) = match &game.kind {
        GameKind::Decisive { winner, loser } => (Some(winner.as_str()), Some(loser.as_str()), None),
        GameKind::MultiParty { participants } => (
            None,
            None,
            Some(serde_json::to_string(participants).context("Failed to serialize participants")?),
        ),
    };

    let sql = "INSERT INTO games (winner, loser, participants, is_multiplayer, date, format_type, legs, highest_checkout) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING id";

    let id: i64 = conn
        .query_row(
            sql,
            params![
                winner,
                loser,
                participants,
                participants.is_some(),
                format_iso(&game.timestamp),
                game.format.variant.as_str(),
                game.format.legs,
                game.highest_checkout
            ],
            |row| row.get(0),
        )
        .context("Failed to insert game")?;

    Ok(game.into_game(id))
}

/// All games in insertion order.
pub fn list_all(conn: &Connection) -> Result<Vec<Game>> {
    let sql = format!("SELECT {} FROM games ORDER BY id", GAME_COLUMNS);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_game_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list games")?;

    rows.into_iter().map(GameRow::into_game).collect()
}
