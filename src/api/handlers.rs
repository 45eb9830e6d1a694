//! API Handlers
//!
//! HTTP request handlers for each banner endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Json,
};
use tracing::{debug, error};

use crate::cache::{CacheBuilder, Content};
use crate::config::Config;
use crate::error::{ConfigError, Result, ServiceError};
use crate::models::{HealthResponse, StatsResponse, UserBannerQuery};
use crate::service::{BannerService, BannerSource, Role};

/// Header carrying the caller's token.
pub const TOKEN_HEADER: &str = "token";

/// Application state shared across all handlers.
///
/// The cache inside the service is already synchronized, so the state is
/// just a cheap `Arc` clone.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BannerService>,
}

impl AppState {
    /// Creates a new AppState around the given service.
    pub fn new(service: BannerService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates a new AppState from configuration, without an eviction sink.
    pub fn from_config(
        config: &Config,
        source: Arc<dyn BannerSource>,
    ) -> std::result::Result<Self, ConfigError> {
        let cache = CacheBuilder::from_config(config).build()?;
        Ok(Self::new(BannerService::new(
            Arc::new(cache),
            source,
            config.cache_ttl(),
        )))
    }
}

/// Resolves the caller's role from the token header.
pub fn authenticate(headers: &HeaderMap) -> Result<Role> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(Role::from_token)
        .ok_or(ServiceError::Unauthorized)
}

/// Handler for GET /user_banner
///
/// Returns the banner content for `tag_id` and `feature_id`, served from the
/// cache unless `use_last_revision` is set.
pub async fn user_banner_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: std::result::Result<Query<UserBannerQuery>, QueryRejection>,
) -> Result<Json<Content>> {
    let role = authenticate(&headers)?;
    let Query(query) = query.map_err(|err| ServiceError::InvalidRequest(err.body_text()))?;
    let params = query.parse()?;

    let content = state
        .service
        .get_for_user(
            params.tag_id,
            params.feature_id,
            role,
            params.use_last_revision,
        )
        .await
        .map_err(|err| {
            match &err {
                ServiceError::NotFound => debug!(
                    tag_id = params.tag_id,
                    feature_id = params.feature_id,
                    "no banner found"
                ),
                other => error!(error = %other, "failed to get banner content"),
            }
            err
        })?;

    Ok(Json(content))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from_cache(state.service.cache()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Banner, InMemoryBannerSource};
    use axum::http::HeaderValue;
    use serde_json::json;

    fn test_state() -> AppState {
        let content = match json!({"title": "some_title"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let source = InMemoryBannerSource::with_banners(vec![Banner {
            id: 1,
            tag_ids: vec![4],
            feature_id: 123,
            content,
            is_active: true,
        }]);
        AppState::from_config(&Config::default(), Arc::new(source)).unwrap()
    }

    fn headers(token: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static(token));
        headers
    }

    fn query(tag: &str, feature: &str) -> UserBannerQuery {
        UserBannerQuery {
            tag_id: Some(tag.to_string()),
            feature_id: Some(feature.to_string()),
            use_last_revision: None,
        }
    }

    #[test]
    fn test_authenticate() {
        assert_eq!(authenticate(&headers("admin_token")).unwrap(), Role::Admin);
        assert_eq!(authenticate(&headers("user_token")).unwrap(), Role::User);
        assert!(matches!(
            authenticate(&headers("bogus")),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            authenticate(&HeaderMap::new()),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_user_banner_handler() {
        let state = test_state();

        let result = user_banner_handler(
            State(state.clone()),
            headers("user_token"),
            Ok(Query(query("4", "123"))),
        )
        .await;
        let Json(content) = result.unwrap();
        assert_eq!(content["title"], "some_title");
        assert_eq!(state.service.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_user_banner_handler_not_found() {
        let result = user_banner_handler(
            State(test_state()),
            headers("user_token"),
            Ok(Query(query("5", "123"))),
        )
        .await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_user_banner_handler_bad_query() {
        let result = user_banner_handler(
            State(test_state()),
            headers("admin_token"),
            Ok(Query(query("four", "123"))),
        )
        .await;
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let response = stats_handler(State(test_state())).await;
        assert_eq!(response.stats.hits, 0);
        assert_eq!(response.stats.misses, 0);
        assert_eq!(response.capacity, 1000);
        assert_eq!(response.eviction_batch_size, 20);
        assert_eq!(response.backpressure, None);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
