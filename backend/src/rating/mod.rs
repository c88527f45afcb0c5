pub mod elo;
pub mod types;

pub use elo::{apply_game, compute_update, expected_score, k_factor};
pub use types::{EloUpdate, ExperienceTier, RatingChange, RatingValue};
