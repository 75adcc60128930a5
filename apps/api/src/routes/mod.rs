pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::application::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/applications/run", post(handlers::handle_run))
        .route(
            "/api/v1/applications/files/:name",
            get(handlers::handle_download),
        )
        .with_state(state)
}
