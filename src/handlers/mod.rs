pub mod health;
pub mod reload;
pub mod search;

pub use health::{health_handler, ready_handler};
pub use reload::reload_handler;
pub use search::search_handler;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Service routes without the metrics endpoint or middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", post(search_handler))
        .route("/reload", post(reload_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}
