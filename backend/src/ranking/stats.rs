use std::collections::BTreeMap;

use serde::Serialize;

use super::{compute_rankings, tally};
use crate::config::settings::RatingSettings;
use crate::domain::{Game, Player};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHead {
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
}

/// Per-player record; win rates are percentages with one decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub name: String,
    pub rating: i32,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub rank: usize,
    /// Decisive games only, keyed by opponent
    pub head_to_head: BTreeMap<String, HeadToHead>,
}

fn percentage(wins: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(wins) * 1000.0 / f64::from(total)).round() / 10.0
}

fn head_to_head(name: &str, players: &[Player], games: &[Game]) -> BTreeMap<String, HeadToHead> {
    let mut records = BTreeMap::new();

    for opponent in players.iter().filter(|p| p.name != name) {
        let (mut wins, mut losses) = (0, 0);
        for (winner, loser) in games.iter().filter_map(Game::decisive_pair) {
            if winner == name && loser == opponent.name {
                wins += 1;
            } else if winner == opponent.name && loser == name {
                losses += 1;
            }
        }
        if wins + losses > 0 {
            records.insert(
                opponent.name.clone(),
                HeadToHead {
                    wins,
                    losses,
                    win_rate: percentage(wins, wins + losses),
                },
            );
        }
    }

    records
}

/// Statistics for every player, sorted by wins (desc), games played (asc)
/// and win rate (desc).
pub fn player_stats(players: &[Player], games: &[Game], settings: &RatingSettings) -> Vec<PlayerStats> {
    let tallies = tally(games, settings);
    let rankings = compute_rankings(players, games, settings);

    let mut stats: Vec<PlayerStats> = players
        .iter()
        .map(|player| {
            let record = tallies.get(player.name.as_str()).copied().unwrap_or_default();
            PlayerStats {
                name: player.name.clone(),
                rating: player.current_rating,
                games: record.total(),
                wins: record.wins,
                losses: record.losses,
                win_rate: percentage(record.wins, record.total()),
                rank: rankings.get(&player.name).copied().unwrap_or(0),
                head_to_head: head_to_head(&player.name, players, games),
            }
        })
        .collect();

    stats.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| a.games.cmp(&b.games))
            .then_with(|| b.win_rate.total_cmp(&a.win_rate))
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GameRequest;
    use crate::domain::time::parse_iso;

    fn game(id: i64, request: GameRequest) -> Game {
        request.at(parse_iso("2024-01-01T10:00:00Z").unwrap()).into_game(id)
    }

    #[test]
    fn test_percentage_has_one_decimal() {
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 5), 100.0);
    }

    #[test]
    fn test_head_to_head_ignores_multi_party() {
        let players = vec![Player::new("A"), Player::new("B"), Player::new("C")];
        let games = vec![
            game(1, GameRequest::decisive("A", "B")),
            game(2, GameRequest::decisive("A", "B")),
            game(3, GameRequest::decisive("B", "A")),
            game(4, GameRequest::multi_party(&["A", "B", "C"])),
        ];

        let stats = player_stats(&players, &games, &RatingSettings::default());
        let a = stats.iter().find(|s| s.name == "A").unwrap();

        assert_eq!(a.games, 4);
        assert_eq!(a.wins, 2);
        assert_eq!(a.losses, 2);
        assert_eq!(a.win_rate, 50.0);
        assert_eq!(a.head_to_head.len(), 1);
        assert_eq!(
            a.head_to_head["B"],
            HeadToHead {
                wins: 2,
                losses: 1,
                win_rate: 66.7
            }
        );
        assert!(!a.head_to_head.contains_key("C"));
    }

    #[test]
    fn test_sorted_by_wins_then_fewer_games() {
        let players = vec![Player::new("A"), Player::new("B"), Player::new("C")];
        let games = vec![
            game(1, GameRequest::decisive("B", "C")),
            game(2, GameRequest::decisive("A", "C")),
            game(3, GameRequest::decisive("C", "A")),
        ];

        let stats = player_stats(&players, &games, &RatingSettings::default());
        let names: Vec<_> = stats.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["B", "A", "C"]);
        assert!(stats.iter().all(|s| s.rank > 0));
    }
}
