//! Banner Service Module
//!
//! Read-through lookup: cache first, backing store on miss or expiry, then
//! repopulate the cache with a fixed TTL.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CompositeKeyCache, Content};
use crate::error::{CacheError, Result};
use crate::service::BannerSource;

// == Role ==
/// Caller role derived from the request token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub const ADMIN_TOKEN: &'static str = "admin_token";
    pub const USER_TOKEN: &'static str = "user_token";

    /// Maps a request token to a role; unknown tokens are rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            Self::ADMIN_TOKEN => Some(Role::Admin),
            Self::USER_TOKEN => Some(Role::User),
            _ => None,
        }
    }
}

// == Banner Service ==
/// Serves banner content through the LFU cache.
pub struct BannerService {
    cache: Arc<CompositeKeyCache>,
    source: Arc<dyn BannerSource>,
    cache_ttl: Duration,
}

impl BannerService {
    pub fn new(
        cache: Arc<CompositeKeyCache>,
        source: Arc<dyn BannerSource>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            source,
            cache_ttl,
        }
    }

    pub fn cache(&self) -> &Arc<CompositeKeyCache> {
        &self.cache
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    // == Get For User ==
    /// Returns the banner content for `(tag_id, feature_id)`.
    ///
    /// Unless `use_last_revision` is set, a cached value is returned as is.
    /// Otherwise, and on miss or expiry, the source is queried (admins also
    /// see inactive banners) and the result is cached for `cache_ttl`.
    pub async fn get_for_user(
        &self,
        tag_id: i32,
        feature_id: i32,
        role: Role,
        use_last_revision: bool,
    ) -> Result<Content> {
        if !use_last_revision {
            match self.cache.get(tag_id, feature_id) {
                Ok(content) => return Ok(content),
                Err(CacheError::Expired(key)) => debug!(%key, "cached banner is stale"),
                Err(err) => debug!(error = %err, "banner not cached"),
            }
        }

        let content = self
            .source
            .fetch(tag_id, feature_id, role != Role::Admin)
            .await?;
        self.cache
            .set(tag_id, feature_id, content.clone(), self.cache_ttl);
        Ok(content)
    }
}
