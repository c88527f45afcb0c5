use chrono::{FixedOffset, Offset, TimeDelta, Utc};

#[derive(Debug, Clone)]
pub struct RatingSettings {
    /// Players below this many games use `novice_k`
    pub novice_games: u32,
    /// Players below this many games (and not novices) use `intermediate_k`
    pub intermediate_games: u32,
    pub novice_k: f64,
    pub intermediate_k: f64,
    pub expert_k: f64,
    /// Games needed to be ranked in the upper tier
    pub qualification_games: u32,
    /// Whether multi-party participation counts towards ranking totals
    pub count_multi_party: bool,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            novice_games: 30,
            intermediate_games: 100,
            novice_k: 32.0,
            intermediate_k: 24.0,
            expert_k: 16.0,
            qualification_games: 10,
            count_multi_party: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeekSettings {
    /// Offset of the civil calendar weeks are cut in, east of UTC
    pub utc_offset_secs: i32,
}

impl Default for WeekSettings {
    fn default() -> Self {
        Self {
            utc_offset_secs: 3600, // CET
        }
    }
}

impl WeekSettings {
    pub fn calendar(&self) -> FixedOffset {
        // Out-of-range offsets fall back to UTC
        FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    /// Maximum distance between a history entry and the game it is linked to
    pub tolerance: TimeDelta,
    /// Linked entries further away than this get the game's timestamp
    pub drift_threshold: TimeDelta,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            tolerance: TimeDelta::hours(3),
            drift_threshold: TimeDelta::minutes(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub week: WeekSettings,
    pub reconcile: ReconcileSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            rating: RatingSettings::default(),
            week: WeekSettings::default(),
            reconcile: ReconcileSettings::default(),
        }
    }
}

pub fn database_path() -> String {
    std::env::var("DATABASE_PATH").unwrap_or_else(|_| "dart_stats.db".to_string())
}
