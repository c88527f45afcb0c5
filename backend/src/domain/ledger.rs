use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::GameId;
use super::time::{epoch, iso_millis};

/// Rating every player starts from, and the rating of the sentinel entry.
pub const INITIAL_RATING: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

/// Result/opponent annotation found on entries written before games were
/// linked by id. Either half may be missing; both are written back as read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyHint {
    pub result: Option<Outcome>,
    pub opponent: Option<String>,
}

impl LegacyHint {
    /// Direction of the game, usable only when both halves are present.
    pub fn direction(&self) -> Option<(Outcome, &str)> {
        match (self.result, self.opponent.as_deref()) {
            (Some(result), Some(opponent)) => Some((result, opponent)),
            _ => None,
        }
    }
}

/// One rating snapshot in a player's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredEntry", into = "StoredEntry")]
pub struct LedgerEntry {
    pub rating: i32,
    pub timestamp: DateTime<Utc>,
    pub game_ref: Option<GameId>,
    pub hint: Option<LegacyHint>,
}

impl LedgerEntry {
    pub fn new(rating: i32, timestamp: DateTime<Utc>) -> Self {
        Self {
            rating,
            timestamp,
            game_ref: None,
            hint: None,
        }
    }

    pub fn sentinel() -> Self {
        Self::new(INITIAL_RATING, epoch())
    }

    pub fn linked(mut self, game_id: GameId) -> Self {
        self.game_ref = Some(game_id);
        self
    }

    pub fn with_hint(mut self, result: Outcome, opponent: &str) -> Self {
        self.hint = Some(LegacyHint {
            result: Some(result),
            opponent: Some(opponent.to_string()),
        });
        self
    }

    pub fn direction(&self) -> Option<(Outcome, &str)> {
        self.hint.as_ref().and_then(LegacyHint::direction)
    }

    pub fn is_sentinel(&self) -> bool {
        self.timestamp == epoch()
    }

    pub fn is_linked(&self) -> bool {
        self.game_ref.is_some()
    }
}

// Persisted document shape: { elo, date, gameId?, result?, opponent? }
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    elo: i32,
    #[serde(with = "iso_millis")]
    date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    game_id: Option<GameId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    opponent: Option<String>,
}

impl From<StoredEntry> for LedgerEntry {
    fn from(stored: StoredEntry) -> Self {
        let hint = match (stored.result, stored.opponent) {
            (None, None) => None,
            (result, opponent) => Some(LegacyHint { result, opponent }),
        };
        Self {
            rating: stored.elo,
            timestamp: stored.date,
            game_ref: stored.game_id,
            hint,
        }
    }
}

impl From<LedgerEntry> for StoredEntry {
    fn from(entry: LedgerEntry) -> Self {
        let (result, opponent) = match entry.hint {
            Some(hint) => (hint.result, hint.opponent),
            None => (None, None),
        };
        Self {
            elo: entry.rating,
            date: entry.timestamp,
            game_id: entry.game_ref,
            result,
            opponent,
        }
    }
}

/// Append-only rating history of a single player, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger(Vec<LedgerEntry>);

impl Ledger {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// History as it looks right after a full reset.
    pub fn with_sentinel() -> Self {
        Self(vec![LedgerEntry::sentinel()])
    }

    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Self(entries)
    }

    pub fn push(&mut self, entry: LedgerEntry) {
        self.0.push(entry);
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.0
    }

    pub fn entries_mut(&mut self) -> &mut [LedgerEntry] {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&LedgerEntry> {
        self.0.last()
    }

    /// Entries produced by actual games, sentinel excluded.
    pub fn real_entries(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.0.iter().filter(|entry| !entry.is_sentinel())
    }

    /// Rating of the newest entry strictly before `instant`. When several
    /// entries share that timestamp the one appended last wins.
    pub fn rating_before(&self, instant: DateTime<Utc>) -> Option<i32> {
        self.latest_matching(|entry| entry.timestamp < instant)
    }

    /// Same as [`Ledger::rating_before`] but including entries at `instant`.
    pub fn rating_at(&self, instant: DateTime<Utc>) -> Option<i32> {
        self.latest_matching(|entry| entry.timestamp <= instant)
    }

    fn latest_matching(&self, predicate: impl Fn(&LedgerEntry) -> bool) -> Option<i32> {
        let mut best: Option<&LedgerEntry> = None;
        for entry in self.0.iter().filter(|e| predicate(e)) {
            match best {
                Some(current) if entry.timestamp < current.timestamp => {}
                _ => best = Some(entry),
            }
        }
        best.map(|entry| entry.rating)
    }

    pub fn entry_for_game(&self, game_id: GameId) -> Option<&LedgerEntry> {
        self.0.iter().find(|entry| entry.game_ref == Some(game_id))
    }

    /// Attaches `game_id` to the newest entry if it is not linked yet.
    pub fn link_latest(&mut self, game_id: GameId) {
        if let Some(entry) = self.0.last_mut() {
            if entry.game_ref.is_none() && !entry.is_sentinel() {
                entry.game_ref = Some(game_id);
            }
        }
    }
}
