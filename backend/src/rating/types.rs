use serde::Serialize;

pub type RatingValue = i32;

/// Rating movement of one player caused by one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub before: RatingValue,
    pub after: RatingValue,
    pub k_factor: u32,
}

impl RatingChange {
    pub fn delta(&self) -> RatingValue {
        self.after - self.before
    }
}

/// Result of applying one decided game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EloUpdate {
    pub winner: RatingChange,
    pub loser: RatingChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceTier {
    Novice,
    Intermediate,
    Expert,
}

impl ExperienceTier {
    pub fn as_str(&self) -> &str {
        match self {
            ExperienceTier::Novice => "novice",
            ExperienceTier::Intermediate => "intermediate",
            ExperienceTier::Expert => "expert",
        }
    }
}
