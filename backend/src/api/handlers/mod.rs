use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::api::models::ErrorResponse;
use crate::config::settings::AppConfig;
use crate::errors::RatingError;
use crate::store::RecordStore;

pub mod admin;
pub mod games;
pub mod players;

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: AppConfig,
}

/// Maps engine errors onto HTTP statuses
#[derive(Debug)]
pub struct ApiError(RatingError);

impl From<RatingError> for ApiError {
    fn from(err: RatingError) -> Self {
        ApiError(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RatingError::NotFound { .. } => StatusCode::NOT_FOUND,
            RatingError::Validation(_) => StatusCode::BAD_REQUEST,
            RatingError::Conflict(_) => StatusCode::CONFLICT,
            RatingError::Inconsistent { .. } | RatingError::Storage(_) => {
                log::error!("Request failed: {:?}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
