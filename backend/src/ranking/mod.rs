pub mod stats;

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::settings::RatingSettings;
use crate::domain::{Game, GameKind, INITIAL_RATING, Player};

pub use stats::{HeadToHead, PlayerStats, player_stats};

/// One row of the leaderboard. Derived on every query, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub name: String,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    pub total_games: u32,
    /// Fraction of participations won, 0 when there are none
    pub win_rate: f64,
    pub qualified: bool,
    pub rank: usize,
}

/// Point in time a historical leaderboard is taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cutoff {
    /// Everything that happened strictly before the instant
    Before(DateTime<Utc>),
    /// Everything up to and including the instant
    AtOrBefore(DateTime<Utc>),
}

impl Cutoff {
    fn admits(&self, instant: DateTime<Utc>) -> bool {
        match *self {
            Cutoff::Before(limit) => instant < limit,
            Cutoff::AtOrBefore(limit) => instant <= limit,
        }
    }

    fn rating_of(&self, player: &Player) -> i32 {
        let rating = match *self {
            Cutoff::Before(limit) => player.ledger.rating_before(limit),
            Cutoff::AtOrBefore(limit) => player.ledger.rating_at(limit),
        };
        rating.unwrap_or(INITIAL_RATING)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Tally {
    pub wins: u32,
    pub losses: u32,
}

impl Tally {
    pub fn total(&self) -> u32 {
        self.wins + self.losses
    }
}

/// Wins and losses per player name. Multi-party participation is a loss
/// when `count_multi_party` is set and is ignored otherwise.
pub(crate) fn tally<'a>(
    games: impl IntoIterator<Item = &'a Game>,
    settings: &RatingSettings,
) -> HashMap<&'a str, Tally> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();

    for game in games {
        match &game.kind {
            GameKind::Decisive { winner, loser } => {
                tallies.entry(winner.as_str()).or_default().wins += 1;
                tallies.entry(loser.as_str()).or_default().losses += 1;
            }
            GameKind::MultiParty { participants } if settings.count_multi_party => {
                for name in participants {
                    tallies.entry(name.as_str()).or_default().losses += 1;
                }
            }
            GameKind::MultiParty { .. } => {}
        }
    }

    tallies
}

fn tier_order(a: &RankEntry, b: &RankEntry) -> Ordering {
    b.qualified
        .cmp(&a.qualified)
        .then_with(|| b.rating.cmp(&a.rating))
        .then_with(|| b.wins.cmp(&a.wins))
        .then_with(|| a.total_games.cmp(&b.total_games))
        .then_with(|| b.win_rate.total_cmp(&a.win_rate))
}

fn rank(
    players: &[Player],
    tallies: &HashMap<&str, Tally>,
    rating_of: impl Fn(&Player) -> i32,
    settings: &RatingSettings,
) -> Vec<RankEntry> {
    let mut entries: Vec<RankEntry> = players
        .iter()
        .map(|player| {
            let tally = tallies.get(player.name.as_str()).copied().unwrap_or_default();
            let total = tally.total();
            RankEntry {
                name: player.name.clone(),
                rating: rating_of(player),
                wins: tally.wins,
                losses: tally.losses,
                total_games: total,
                win_rate: if total > 0 {
                    f64::from(tally.wins) / f64::from(total)
                } else {
                    0.0
                },
                qualified: total >= settings.qualification_games,
                rank: 0,
            }
        })
        .collect();

    // Stable: full ties keep the order players were given in.
    entries.sort_by(tier_order);

    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rank = idx + 1;
    }
    entries
}

/// Current leaderboard, best first.
pub fn compute_standings(players: &[Player], games: &[Game], settings: &RatingSettings) -> Vec<RankEntry> {
    let tallies = tally(games, settings);
    rank(players, &tallies, Player::trusted_rating, settings)
}

/// Player name to rank, 1 being the best.
pub fn compute_rankings(players: &[Player], games: &[Game], settings: &RatingSettings) -> HashMap<String, usize> {
    compute_standings(players, games, settings)
        .into_iter()
        .map(|entry| (entry.name, entry.rank))
        .collect()
}

/// Leaderboard as it stood at `cutoff`: ratings come from each ledger
/// (1000 without an earlier entry) and only games inside the cutoff count.
pub fn standings_at(
    players: &[Player],
    games: &[Game],
    cutoff: Cutoff,
    settings: &RatingSettings,
) -> Vec<RankEntry> {
    let tallies = tally(games.iter().filter(|g| cutoff.admits(g.timestamp)), settings);
    rank(players, &tallies, |p| cutoff.rating_of(p), settings)
}

pub fn rankings_at(
    players: &[Player],
    games: &[Game],
    cutoff: Cutoff,
    settings: &RatingSettings,
) -> HashMap<String, usize> {
    standings_at(players, games, cutoff, settings)
        .into_iter()
        .map(|entry| (entry.name, entry.rank))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::parse_iso;
    use crate::domain::{GameRequest, LedgerEntry};

    fn player(name: &str, rating: i32) -> Player {
        let mut p = Player::new(name);
        p.current_rating = rating;
        p
    }

    fn decisive(id: i64, winner: &str, loser: &str, date: &str) -> Game {
        GameRequest::decisive(winner, loser)
            .at(parse_iso(date).unwrap())
            .into_game(id)
    }

    fn wins(winner: &str, loser: &str, count: usize) -> Vec<Game> {
        (0..count)
            .map(|i| decisive(i as i64 + 1, winner, loser, "2024-01-01T10:00:00Z"))
            .collect()
    }

    #[test]
    fn test_qualified_players_always_rank_above_unqualified() {
        // A has 10 participations at a low rating, C only 2 at a high one.
        let players = vec![player("C", 1400), player("A", 900), player("B", 950)];
        let mut games = wins("B", "A", 10);
        games.extend(wins("C", "B", 2));

        let standings = compute_standings(&players, &games, &RatingSettings::default());
        let names: Vec<_> = standings.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["B", "A", "C"]);
        assert!(standings[0].qualified && standings[1].qualified);
        assert!(!standings[2].qualified);
        assert_eq!(standings[2].rank, 3);
    }

    #[test]
    fn test_tiebreakers_follow_wins_then_fewer_games() {
        let players = vec![player("A", 1000), player("B", 1000), player("C", 1000), player("D", 1000)];
        let mut games = wins("B", "D", 2);
        games.extend(wins("C", "D", 2));
        games.extend(wins("D", "C", 1));

        let rankings = compute_rankings(&players, &games, &RatingSettings::default());

        // B and C both won twice; B played fewer games.
        assert_eq!(rankings["B"], 1);
        assert_eq!(rankings["C"], 2);
        assert_eq!(rankings["D"], 3);
        assert_eq!(rankings["A"], 4);
    }

    #[test]
    fn test_full_ties_keep_input_order() {
        let players = vec![player("Z", 1000), player("Y", 1000), player("X", 1000)];
        let rankings = compute_rankings(&players, &[], &RatingSettings::default());

        assert_eq!(rankings["Z"], 1);
        assert_eq!(rankings["Y"], 2);
        assert_eq!(rankings["X"], 3);
    }

    #[test]
    fn test_multi_party_counts_as_participation_only() {
        let players = vec![player("A", 1000), player("B", 1000), player("C", 1000)];
        let games = vec![
            GameRequest::multi_party(&["A", "B", "C"])
                .at(parse_iso("2024-01-01T10:00:00Z").unwrap())
                .into_game(1),
        ];

        let counted = compute_standings(&players, &games, &RatingSettings::default());
        assert!(counted.iter().all(|e| e.wins == 0 && e.losses == 1 && e.total_games == 1));
        assert!(counted.iter().all(|e| e.win_rate == 0.0));

        let settings = RatingSettings {
            count_multi_party: false,
            ..RatingSettings::default()
        };
        let ignored = compute_standings(&players, &games, &settings);
        assert!(ignored.iter().all(|e| e.total_games == 0));
    }

    #[test]
    fn test_win_rate_is_fraction_of_participations() {
        let players = vec![player("A", 1000), player("B", 1000)];
        let games = vec![
            decisive(1, "A", "B", "2024-01-01T10:00:00Z"),
            GameRequest::multi_party(&["A", "B"])
                .at(parse_iso("2024-01-01T11:00:00Z").unwrap())
                .into_game(2),
        ];

        let standings = compute_standings(&players, &games, &RatingSettings::default());

        assert_eq!(standings[0].name, "A");
        assert_eq!(standings[0].total_games, 2);
        assert!((standings[0].win_rate - 0.5).abs() < 1e-12);
        assert_eq!(standings[1].losses, 2);
        assert_eq!(standings[1].win_rate, 0.0);
    }

    #[test]
    fn test_historical_standings_use_ledger_lookback() {
        let t1 = parse_iso("2024-01-01T10:00:00Z").unwrap();
        let mut a = player("A", 984);
        a.ledger.push(LedgerEntry::new(1016, parse_iso("2023-12-31T10:00:00Z").unwrap()));
        a.ledger.push(LedgerEntry::new(984, t1));
        let mut b = player("B", 1016);
        b.ledger.push(LedgerEntry::new(1016, t1));

        let games = vec![decisive(1, "B", "A", "2024-01-01T10:00:00Z")];
        let settings = RatingSettings::default();

        let before = standings_at(&[a.clone(), b.clone()], &games, Cutoff::Before(t1), &settings);
        assert_eq!(before[0].name, "A");
        assert_eq!(before[0].rating, 1016);
        assert_eq!(before[1].rating, 1000);
        assert_eq!(before[1].total_games, 0);

        let after = rankings_at(&[a, b], &games, Cutoff::AtOrBefore(t1), &settings);
        assert_eq!(after["B"], 1);
        assert_eq!(after["A"], 2);
    }
}
