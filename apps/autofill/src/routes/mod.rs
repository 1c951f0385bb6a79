pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::autofill::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/autofill/deploy", post(handlers::handle_deploy))
        .route("/api/v1/autofill/platform", post(handlers::handle_platform))
        .fallback(not_found)
        .with_state(state)
}
