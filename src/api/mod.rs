use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::{Arc, RwLock};

pub mod handlers;
pub mod requests;
pub mod responses;

pub fn router(state: Arc<RwLock<AppState>>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::get_health))
        .route("/api/predictions/assess", post(handlers::post_assessment))
        .route("/api/predictions/latest", get(handlers::get_latest))
        .route("/api/weather/live", get(handlers::get_live_weather))
        .route("/api/weather/weekly", get(handlers::get_weekly_weather))
        .with_state(state)
}
