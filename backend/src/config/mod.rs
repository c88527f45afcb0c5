pub mod settings;

pub use settings::{AppConfig, RatingSettings, ReconcileSettings, WeekSettings};
