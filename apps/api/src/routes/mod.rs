pub mod health;

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::errors::AppError;
use crate::state::AppState;
use crate::study_guide::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/generate-study-guide",
            post(handlers::handle_generate_study_guide),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// Renders a handler panic through the same JSON error contract as `AppError`.
fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let description = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    AppError::Internal(anyhow::anyhow!(description)).into_response()
}
