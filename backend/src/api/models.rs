use serde::{Deserialize, Serialize};

use crate::domain::{GameFormat, GameRequest};
use crate::errors::{RatingError, RatingResult};

#[derive(Deserialize)]
pub struct NewPlayerRequest {
    pub name: String,
}

/// Body of `POST /api/games`. Either `winner` and `loser`, or
/// `isMultiplayer` with `players`.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewGameRequest {
    pub winner: Option<String>,
    pub loser: Option<String>,
    #[serde(default)]
    pub is_multiplayer: bool,
    #[serde(default)]
    pub players: Vec<String>,
    pub format: Option<GameFormat>,
    pub highest_checkout: Option<u32>,
}

impl NewGameRequest {
    pub fn into_request(self) -> RatingResult<GameRequest> {
        let request = if self.is_multiplayer {
            let names: Vec<&str> = self.players.iter().map(String::as_str).collect();
            GameRequest::multi_party(&names)
        } else {
            match (self.winner.as_deref(), self.loser.as_deref()) {
                (Some(winner), Some(loser)) => GameRequest::decisive(winner, loser),
                _ => {
                    return Err(RatingError::Validation(
                        "winner and loser are required".to_string(),
                    ));
                }
            }
        };

        Ok(request
            .with_format(self.format.unwrap_or_default())
            .with_checkout(self.highest_checkout))
    }
}

#[derive(Deserialize)]
pub struct RecentParams {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct ReconcileParams {
    pub tolerance_hours: Option<i64>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse<T> {
    pub message: String,
    pub report: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameKind, X01};

    #[test]
    fn test_decisive_body() {
        let body: NewGameRequest = serde_json::from_str(
            r#"{"winner":"A","loser":"B","format":{"type":"301","legs":5},"highestCheckout":100}"#,
        )
        .unwrap();
        let request = body.into_request().unwrap();

        assert!(matches!(request.kind, GameKind::Decisive { .. }));
        assert_eq!(request.format.variant, X01::ThreeOhOne);
        assert_eq!(request.format.legs, 5);
        assert_eq!(request.highest_checkout, Some(100));
    }

    #[test]
    fn test_multiplayer_body() {
        let body: NewGameRequest =
            serde_json::from_str(r#"{"isMultiplayer":true,"players":["A","B","C"]}"#).unwrap();
        let request = body.into_request().unwrap();

        assert_eq!(request.kind.participants(), vec!["A", "B", "C"]);
        assert_eq!(request.format, GameFormat::default());
    }

    #[test]
    fn test_missing_loser_is_invalid() {
        let body: NewGameRequest = serde_json::from_str(r#"{"winner":"A"}"#).unwrap();
        assert!(matches!(body.into_request(), Err(RatingError::Validation(_))));
    }
}
