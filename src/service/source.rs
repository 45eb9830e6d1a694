//! Banner Source Module
//!
//! The backing store consulted on cache misses, plus an in-memory implementation.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::cache::Content;
use crate::error::SourceError;

// == Banner ==
/// A banner as held by the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: i32,
    pub tag_ids: Vec<i32>,
    pub feature_id: i32,
    pub content: Content,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Banner {
    /// Whether this banner is addressed by `(tag_id, feature_id)`.
    pub fn matches(&self, tag_id: i32, feature_id: i32) -> bool {
        self.feature_id == feature_id && self.tag_ids.contains(&tag_id)
    }
}

// == Banner Source ==
/// Read-through collaborator of the banner service.
#[async_trait]
pub trait BannerSource: Send + Sync {
    /// Content of the banner for `(tag_id, feature_id)`.
    ///
    /// With `active_only`, inactive banners are treated as absent.
    async fn fetch(
        &self,
        tag_id: i32,
        feature_id: i32,
        active_only: bool,
    ) -> Result<Content, SourceError>;
}

// == In-Memory Source ==
/// Banner store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryBannerSource {
    banners: RwLock<Vec<Banner>>,
}

impl InMemoryBannerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_banners(banners: Vec<Banner>) -> Self {
        Self {
            banners: RwLock::new(banners),
        }
    }

    /// Loads a JSON array of banners from `path`.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path)
            .await
            .map_err(|err| SourceError::Backend(format!("{}: {}", path.display(), err)))?;
        let banners: Vec<Banner> = serde_json::from_slice(&raw)
            .map_err(|err| SourceError::Backend(format!("{}: {}", path.display(), err)))?;
        Ok(Self::with_banners(banners))
    }

    /// Inserts `banner`, replacing any banner with the same id.
    pub async fn upsert(&self, banner: Banner) {
        let mut banners = self.banners.write().await;
        match banners.iter_mut().find(|existing| existing.id == banner.id) {
            Some(existing) => *existing = banner,
            None => banners.push(banner),
        }
    }

    pub async fn len(&self) -> usize {
        self.banners.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.banners.read().await.is_empty()
    }
}

#[async_trait]
impl BannerSource for InMemoryBannerSource {
    async fn fetch(
        &self,
        tag_id: i32,
        feature_id: i32,
        active_only: bool,
    ) -> Result<Content, SourceError> {
        self.banners
            .read()
            .await
            .iter()
            .find(|banner| banner.matches(tag_id, feature_id) && (!active_only || banner.is_active))
            .map(|banner| banner.content.clone())
            .ok_or(SourceError::NotFound)
    }
}
