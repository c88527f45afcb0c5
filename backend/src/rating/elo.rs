use chrono::{DateTime, Utc};

use super::types::{EloUpdate, ExperienceTier, RatingChange, RatingValue};
use crate::config::settings::RatingSettings;
use crate::domain::{LedgerEntry, Player};

/// Probability of `rating` beating `opponent_rating`.
pub fn expected_score(rating: RatingValue, opponent_rating: RatingValue) -> f64 {
    1.0 / (1.0 + 10f64.powf(f64::from(opponent_rating - rating) / 400.0))
}

pub fn experience_tier(games_played: u32, settings: &RatingSettings) -> ExperienceTier {
    if games_played < settings.novice_games {
        ExperienceTier::Novice
    } else if games_played < settings.intermediate_games {
        ExperienceTier::Intermediate
    } else {
        ExperienceTier::Expert
    }
}

pub fn k_factor(games_played: u32, settings: &RatingSettings) -> f64 {
    match experience_tier(games_played, settings) {
        ExperienceTier::Novice => settings.novice_k,
        ExperienceTier::Intermediate => settings.intermediate_k,
        ExperienceTier::Expert => settings.expert_k,
    }
}

// Halves round up, including negative ones (-15.5 -> -15).
fn round_half_up(value: f64) -> RatingValue {
    (value + 0.5).floor() as RatingValue
}

fn rate(rating: RatingValue, opponent: RatingValue, games_played: u32, actual: f64, settings: &RatingSettings) -> RatingChange {
    let k = k_factor(games_played, settings);
    let expected = expected_score(rating, opponent);
    RatingChange {
        before: rating,
        after: round_half_up(f64::from(rating) + k * (actual - expected)),
        k_factor: k as u32,
    }
}

/// New ratings for a decided game, without touching either player.
pub fn compute_update(winner: &Player, loser: &Player, settings: &RatingSettings) -> EloUpdate {
    EloUpdate {
        winner: rate(winner.current_rating, loser.current_rating, winner.games_played, 1.0, settings),
        loser: rate(loser.current_rating, winner.current_rating, loser.games_played, 0.0, settings),
    }
}

/// Applies a decided game to both players: new ratings, one more game
/// each and one history entry each, dated `played_at`.
pub fn apply_game(
    winner: &mut Player,
    loser: &mut Player,
    played_at: DateTime<Utc>,
    settings: &RatingSettings,
) -> EloUpdate {
    let update = compute_update(winner, loser, settings);

    winner.current_rating = update.winner.after;
    loser.current_rating = update.loser.after;

    winner.games_played += 1;
    loser.games_played += 1;

    winner.ledger.push(LedgerEntry::new(update.winner.after, played_at));
    loser.ledger.push(LedgerEntry::new(update.loser.after, played_at));

    update
}
