//! API Routes
//!
//! Configures the Axum router with all banner endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, stats_handler, user_banner_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /user_banner` - Banner content for a tag and feature (token required)
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/user_banner", get(user_banner_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::service::InMemoryBannerSource;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    async fn status_of(uri: &str, token: Option<&str>) -> StatusCode {
        let source = Arc::new(InMemoryBannerSource::new());
        let app = create_router(AppState::from_config(&Config::default(), source).unwrap());

        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header("token", token);
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_and_stats_are_public() {
        assert_eq!(status_of("/health", None).await, StatusCode::OK);
        assert_eq!(status_of("/stats", None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_user_banner_requires_token() {
        let uri = "/user_banner?tag_id=1&feature_id=1";
        assert_eq!(status_of(uri, None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(uri, Some("user_token")).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        assert_eq!(status_of("/banner", Some("admin_token")).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_user_banner_rejects_post() {
        let source = Arc::new(InMemoryBannerSource::new());
        let app = create_router(AppState::from_config(&Config::default(), source).unwrap());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/user_banner?tag_id=1&feature_id=1")
                    .header("token", "admin_token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
