use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use chrono::TimeDelta;
use std::sync::Arc;

use super::{ApiResult, AppState};
use crate::api::models::{MessageResponse, ReconcileParams};
use crate::services::reconciliation::ReconciliationService;
use crate::services::replay::ReplayService;

const MAX_TOLERANCE_HOURS: i64 = 24 * 7;

pub async fn recalculate_elo(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    log::info!("Admin triggered rating recalculation");
    let report = ReplayService::new(state.store.clone(), state.config.clone()).run()?;

    Ok(Json(MessageResponse {
        message: "Ratings recalculated".to_string(),
        report,
    }))
}

pub async fn reconcile(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReconcileParams>,
) -> ApiResult<impl IntoResponse> {
    log::info!("Admin triggered history reconciliation");
    let mut service = ReconciliationService::new(state.store.clone(), state.config.clone());
    if let Some(hours) = params.tolerance_hours {
        service = service.with_tolerance(TimeDelta::hours(hours.clamp(0, MAX_TOLERANCE_HOURS)));
    }
    let report = service.run()?;

    Ok(Json(MessageResponse {
        message: "History reconciled".to_string(),
        report,
    }))
}
