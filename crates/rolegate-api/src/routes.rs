//! Route definitions
//!
//! The code endpoint matches what the frontend bundle calls; everything
//! else falls through to the static files.

use axum::{routing::get, Router};

use crate::handlers::{code, health};
use crate::server::AppState;

/// Create the API router
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Code issue/lookup
        .route("/api/code", get(code))
}
