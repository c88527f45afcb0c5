use anyhow::{Context, Result};

use crate::domain::time::parse_iso;
use crate::domain::{Game, GameFormat, GameKind, Ledger, Player, X01};

/// `players` row as stored, history still serialized.
#[derive(Debug, Clone)]
pub struct PlayerRow {
    pub name: String,
    pub elo_rating: i32,
    pub games_played: u32,
    pub elo_history: String,
    pub version: i64,
}

impl PlayerRow {
    pub fn into_player(self) -> Result<Player> {
        let ledger: Ledger = serde_json::from_str(&self.elo_history)
            .with_context(|| format!("Corrupt rating history for player {}", self.name))?;
        Ok(Player {
            name: self.name,
            current_rating: self.elo_rating,
            games_played: self.games_played,
            ledger,
            version: self.version as u64,
        })
    }
}

/// `games` row as stored. Exactly one of `winner`/`loser` or
/// `participants` is set, depending on `is_multiplayer`.
#[derive(Debug, Clone)]
pub struct GameRow {
    pub id: i64,
    pub winner: Option<String>,
    pub loser: Option<String>,
    pub participants: Option<String>,
    pub is_multiplayer: bool,
    pub date: String,
    pub format_type: String,
    pub legs: u32,
    pub highest_checkout: Option<u32>,
}

impl GameRow {
    pub fn into_game(self) -> Result<Game> {
        let kind = if self.is_multiplayer {
            let raw = self
                .participants
                .with_context(|| format!("Game {} has no participants", self.id))?;
            GameKind::MultiParty {
                participants: serde_json::from_str(&raw)
                    .with_context(|| format!("Corrupt participants for game {}", self.id))?,
            }
        } else {
            match (self.winner, self.loser) {
                (Some(winner), Some(loser)) => GameKind::Decisive { winner, loser },
                _ => anyhow::bail!("Game {} is missing winner or loser", self.id),
            }
        };

        Ok(Game {
            id: self.id,
            kind,
            timestamp: parse_iso(&self.date)?,
            format: GameFormat {
                variant: self.format_type.parse::<X01>()?,
                legs: self.legs,
            },
            highest_checkout: self.highest_checkout,
        })
    }
}
