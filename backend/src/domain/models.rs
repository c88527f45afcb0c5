use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use super::ledger::{INITIAL_RATING, Ledger};
use super::time::iso_millis;
use crate::errors::{RatingError, RatingResult};

pub type GameId = i64;

pub const MIN_PARTICIPANTS: usize = 2;
pub const MAX_PARTICIPANTS: usize = 4;

/// Registered player with its rating counters and history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    #[serde(rename = "eloRating")]
    pub current_rating: i32,
    pub games_played: u32,
    #[serde(rename = "eloHistory")]
    pub ledger: Ledger,
    #[serde(default)]
    pub version: u64,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            current_rating: INITIAL_RATING,
            games_played: 0,
            ledger: Ledger::new(),
            version: 0,
        }
    }

    /// Back to the state every replay starts from.
    pub fn reset(&mut self) {
        self.current_rating = INITIAL_RATING;
        self.games_played = 0;
        self.ledger = Ledger::with_sentinel();
    }

    pub fn check_consistency(&self) -> RatingResult<()> {
        match self.ledger.last() {
            Some(last) if last.rating != self.current_rating => Err(RatingError::Inconsistent {
                player: self.name.clone(),
                ledger_rating: last.rating,
                current_rating: self.current_rating,
            }),
            _ => Ok(()),
        }
    }

    /// Current rating; a disagreeing history is reported and ignored.
    pub fn trusted_rating(&self) -> i32 {
        if let Err(e) = self.check_consistency() {
            warn!("{}", e);
        }
        self.current_rating
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GameKind {
    Decisive { winner: String, loser: String },
    MultiParty { participants: Vec<String> },
}

impl GameKind {
    pub fn involves(&self, name: &str) -> bool {
        match self {
            GameKind::Decisive { winner, loser } => winner == name || loser == name,
            GameKind::MultiParty { participants } => participants.iter().any(|p| p == name),
        }
    }

    pub fn participants(&self) -> Vec<&str> {
        match self {
            GameKind::Decisive { winner, loser } => vec![winner.as_str(), loser.as_str()],
            GameKind::MultiParty { participants } => participants.iter().map(String::as_str).collect(),
        }
    }

    fn validate(&self) -> RatingResult<()> {
        match self {
            GameKind::Decisive { winner, loser } => {
                if winner.trim().is_empty() || loser.trim().is_empty() {
                    return Err(RatingError::Validation(
                        "winner and loser are required".to_string(),
                    ));
                }
                if winner == loser {
                    return Err(RatingError::Validation(format!(
                        "{} cannot play against themselves",
                        winner
                    )));
                }
            }
            GameKind::MultiParty { participants } => {
                let count = participants.len();
                if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&count) {
                    return Err(RatingError::Validation(format!(
                        "multi-party games need {}-{} participants, got {}",
                        MIN_PARTICIPANTS, MAX_PARTICIPANTS, count
                    )));
                }
                if participants.iter().any(|p| p.trim().is_empty()) {
                    return Err(RatingError::Validation("participant name is empty".to_string()));
                }
                let distinct: HashSet<&String> = participants.iter().collect();
                if distinct.len() != count {
                    return Err(RatingError::Validation("participants must be distinct".to_string()));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum X01 {
    #[default]
    #[serde(rename = "501")]
    FiveOhOne,
    #[serde(rename = "301")]
    ThreeOhOne,
}

impl X01 {
    pub fn as_str(&self) -> &str {
        match self {
            X01::FiveOhOne => "501",
            X01::ThreeOhOne => "301",
        }
    }
}

impl fmt::Display for X01 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for X01 {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "501" => Ok(X01::FiveOhOne),
            "301" => Ok(X01::ThreeOhOne),
            other => Err(RatingError::Validation(format!("unknown game type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFormat {
    #[serde(rename = "type", default)]
    pub variant: X01,
    #[serde(default = "default_legs")]
    pub legs: u32,
}

fn default_legs() -> u32 {
    3
}

impl Default for GameFormat {
    fn default() -> Self {
        Self {
            variant: X01::default(),
            legs: default_legs(),
        }
    }
}

/// A recorded game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    #[serde(flatten)]
    pub kind: GameKind,
    #[serde(rename = "date", with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub format: GameFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_checkout: Option<u32>,
}

impl Game {
    pub fn involves(&self, name: &str) -> bool {
        self.kind.involves(name)
    }

    /// `(winner, loser)` for decisive games.
    pub fn decisive_pair(&self) -> Option<(&str, &str)> {
        match &self.kind {
            GameKind::Decisive { winner, loser } => Some((winner.as_str(), loser.as_str())),
            GameKind::MultiParty { .. } => None,
        }
    }

    pub fn is_multi_party(&self) -> bool {
        matches!(self.kind, GameKind::MultiParty { .. })
    }
}

/// Outcome reported by a client, before a timestamp and id are assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRequest {
    pub kind: GameKind,
    pub format: GameFormat,
    pub highest_checkout: Option<u32>,
}

impl GameRequest {
    pub fn decisive(winner: &str, loser: &str) -> Self {
        Self::from_kind(GameKind::Decisive {
            winner: winner.to_string(),
            loser: loser.to_string(),
        })
    }

    pub fn multi_party(participants: &[&str]) -> Self {
        Self::from_kind(GameKind::MultiParty {
            participants: participants.iter().map(|p| p.to_string()).collect(),
        })
    }

    fn from_kind(kind: GameKind) -> Self {
        Self {
            kind,
            format: GameFormat::default(),
            highest_checkout: None,
        }
    }

    pub fn with_format(mut self, format: GameFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_checkout(mut self, checkout: Option<u32>) -> Self {
        self.highest_checkout = checkout;
        self
    }

    pub fn validate(&self) -> RatingResult<()> {
        self.kind.validate()?;
        if self.format.legs == 0 {
            return Err(RatingError::Validation("a game needs at least one leg".to_string()));
        }
        Ok(())
    }

    pub fn at(self, timestamp: DateTime<Utc>) -> NewGame {
        NewGame {
            kind: self.kind,
            timestamp,
            format: self.format,
            highest_checkout: self.highest_checkout,
        }
    }
}

/// A game ready to be stored; the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub kind: GameKind,
    pub timestamp: DateTime<Utc>,
    pub format: GameFormat,
    pub highest_checkout: Option<u32>,
}

impl NewGame {
    pub fn into_game(self, id: GameId) -> Game {
        Game {
            id,
            kind: self.kind,
            timestamp: self.timestamp,
            format: self.format,
            highest_checkout: self.highest_checkout,
        }
    }
}

pub fn validate_player_name(name: &str) -> RatingResult<()> {
    if name.trim().is_empty() {
        return Err(RatingError::Validation("player name is empty".to_string()));
    }
    Ok(())
}
