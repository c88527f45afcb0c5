use thiserror::Error;

/// Errors surfaced by the rating engines to their callers
#[derive(Debug, Error)]
pub enum RatingError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("rating history of {player} ends at {ledger_rating} but current rating is {current_rating}")]
    Inconsistent {
        player: String,
        ledger_rating: i32,
        current_rating: i32,
    },

    #[error("player {0} was modified concurrently, reload and retry")]
    Conflict(String),

    #[error(transparent)]
    Storage(anyhow::Error),
}

pub type RatingResult<T> = Result<T, RatingError>;

impl RatingError {
    pub fn player_not_found(name: &str) -> Self {
        RatingError::NotFound {
            kind: "player",
            key: name.to_string(),
        }
    }
}

// Stores report conflicts through anyhow; unwrap them back into the typed variant.
impl From<anyhow::Error> for RatingError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<RatingError>() {
            Ok(typed) => typed,
            Err(other) => RatingError::Storage(other),
        }
    }
}

impl From<rusqlite::Error> for RatingError {
    fn from(err: rusqlite::Error) -> Self {
        RatingError::Storage(err.into())
    }
}

/// Add context to storage errors
pub fn storage_context(operation: &str, key: &str) -> String {
    format!("Failed to {} for key: {}", operation, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_conflict_survives_anyhow_round_trip() {
        let wrapped: anyhow::Error = RatingError::Conflict("A".to_string()).into();
        assert!(matches!(RatingError::from(wrapped), RatingError::Conflict(name) if name == "A"));
    }

    #[test]
    fn test_other_errors_become_storage() {
        let failure: anyhow::Result<()> = Err(anyhow::anyhow!("disk full"));
        let err = RatingError::from(failure.context(storage_context("save player", "A")).unwrap_err());
        assert!(matches!(err, RatingError::Storage(_)));
        assert_eq!(err.to_string(), "Failed to save player for key: A");
    }
}
