//! HTTP handlers for the code backend

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use rolegate_core::CodeResponse;

use crate::server::AppState;

/// Query parameters of the code endpoint
#[derive(Debug, Deserialize)]
pub struct CodeParams {
    /// Session id; absent and empty are treated the same
    #[serde(default)]
    pub id: String,
}

/// Generic API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Code endpoint - return the current code for a session
///
/// Looking a session up is what mints its code: the first request for an id
/// creates the entry, and later requests inside the TTL see the same code.
pub async fn code(
    State(state): State<AppState>,
    Query(params): Query<CodeParams>,
) -> Result<Json<CodeResponse>, (StatusCode, Json<ErrorResponse>)> {
    if params.id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Missing id".to_string(),
            }),
        ));
    }

    let code = state.store.get_or_create(&params.id);
    debug!("Issued code for session {}", params.id);

    Ok(Json(CodeResponse { code }))
}
