use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/tabs/:group", get(handlers::select_tab))
        .route("/api/series", get(handlers::get_series))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
