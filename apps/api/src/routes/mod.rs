pub mod health;
pub mod reports;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Report API
        .route("/api/results/:id/pdf", get(reports::handle_download_pdf))
        .route("/api/results/:id/share", post(reports::handle_share))
        .with_state(state)
}
