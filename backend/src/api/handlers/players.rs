use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{ApiResult, AppState};
use crate::api::models::NewPlayerRequest;
use crate::domain::time::now;
use crate::services::reports::ReportService;
use crate::services::submission::SubmissionService;

fn reports(state: &AppState) -> ReportService {
    ReportService::new(state.store.clone(), state.config.clone())
}

pub async fn get_players(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(reports(&state).players()?))
}

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewPlayerRequest>,
) -> ApiResult<impl IntoResponse> {
    let service = SubmissionService::new(state.store.clone(), state.config.clone());
    let player = service.register_player(&body.name)?;
    Ok((StatusCode::CREATED, Json(player)))
}

pub async fn get_player_detail(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(reports(&state).player_detail(&name, now())?))
}

pub async fn get_rankings(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(reports(&state).standings()?))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(reports(&state).stats()?))
}
