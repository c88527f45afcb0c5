use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{
    admin::{reconcile, recalculate_elo},
    games::{create_game, get_games, get_recent_games, get_week},
    players::{create_player, get_player_detail, get_players, get_rankings, get_stats},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/players", get(get_players).post(create_player))
        .route("/api/player/:name", get(get_player_detail))
        .route("/api/rankings", get(get_rankings))
        .route("/api/stats", get(get_stats))
        .route("/api/games", get(get_games).post(create_game))
        .route("/api/games/recent", get(get_recent_games))
        .route("/api/week", get(get_week))
        .route("/api/recalculate-elo", post(recalculate_elo))
        .route("/api/admin/reconcile", post(reconcile))
        .with_state(state)
}
