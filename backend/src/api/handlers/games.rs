use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::info;
use std::sync::Arc;

use super::{ApiResult, AppState};
use crate::api::models::{NewGameRequest, RecentParams};
use crate::domain::time::now;
use crate::services::reports::ReportService;
use crate::services::submission::SubmissionService;

const DEFAULT_RECENT_LIMIT: usize = 3;

pub async fn get_games(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let service = ReportService::new(state.store.clone(), state.config.clone());
    Ok(Json(service.games()?))
}

pub async fn create_game(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewGameRequest>,
) -> ApiResult<impl IntoResponse> {
    let request = body.into_request()?;
    let service = SubmissionService::new(state.store.clone(), state.config.clone());
    let outcome = service.submit_game(request)?;

    for movement in &outcome.movements {
        info!(
            "{}: rank {} -> {} ({:+})",
            movement.name, movement.rank_before, movement.rank_after, movement.rank_change()
        );
    }
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn get_recent_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecentParams>,
) -> ApiResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, 100);
    let service = ReportService::new(state.store.clone(), state.config.clone());
    Ok(Json(service.recent_results(limit)?))
}

pub async fn get_week(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let service = ReportService::new(state.store.clone(), state.config.clone());
    Ok(Json(service.weekly(now())?))
}
