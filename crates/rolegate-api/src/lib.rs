//! rolegate-api: HTTP code backend for rolegate
//!
//! Serves the verification code endpoint and the static frontend bundle.
//! Built with axum for async HTTP handling.

pub mod handlers;
pub mod routes;
pub mod server;

pub use server::{router, start_server, AppState};
