pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::enhancement::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Enhancement API
        .route("/api/v1/enhance", post(handlers::handle_enhance))
        .route("/api/v1/quota", get(handlers::handle_quota_state))
        .with_state(state)
}
