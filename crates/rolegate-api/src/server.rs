//! HTTP server for the code backend
//!
//! Starts and manages the axum-based server. The frontend bundle is served
//! from the same port the code endpoint lives on, so verification links can
//! point at a single origin.

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::info;

use rolegate_core::CodeStore;

use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CodeStore>,
}

/// Build the full application router
pub fn router(dist_dir: &str, store: Arc<CodeStore>) -> Router {
    let state = AppState { store };

    Router::new()
        .merge(routes())
        .fallback_service(ServeDir::new(dist_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the code backend server
pub async fn start_server(port: u16, dist_dir: &str, store: Arc<CodeStore>) -> anyhow::Result<()> {
    let app = router(dist_dir, store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Code backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_router() -> Router {
        router("dist", Arc::new(CodeStore::new()))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap();
        (status, value)
    }

    #[tokio::test]
    async fn test_code_requires_id() {
        let (status, body) = get_json(test_router(), "/api/code").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing id");
    }

    #[tokio::test]
    async fn test_code_rejects_empty_id() {
        let (status, body) = get_json(test_router(), "/api/code?id=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing id");
    }

    #[tokio::test]
    async fn test_code_is_stable_within_ttl() {
        let store = Arc::new(CodeStore::new());

        let (status, first) =
            get_json(router("dist", Arc::clone(&store)), "/api/code?id=a1B2c3D4").await;
        assert_eq!(status, StatusCode::OK);

        let code = first["code"].as_str().unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let (_, second) =
            get_json(router("dist", Arc::clone(&store)), "/api/code?id=a1B2c3D4").await;
        assert_eq!(second["code"].as_str().unwrap(), code);
    }

    #[tokio::test]
    async fn test_sessions_get_distinct_codes() {
        let store = Arc::new(CodeStore::new());

        get_json(router("dist", Arc::clone(&store)), "/api/code?id=one").await;
        get_json(router("dist", Arc::clone(&store)), "/api/code?id=two").await;

        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
