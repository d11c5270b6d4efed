//! Content cache
//!
//! Holds the full, unfiltered list for each resource type so the dashboard
//! can filter by page without hitting the backend on every view.
//! - Each resource is fetched at most once until refreshed or invalidated
//! - Concurrent loads of the same resource share one in-flight request
//! - A failed fetch leaves the previous entry (or its absence) untouched
//!
//! The cache is an explicit object owned by the composition root and handed
//! to consumers, never a process-wide global.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sitedeck::cache::ContentCache;
//! use sitedeck::models::{Card, ResourceKind};
//!
//! let cache = ContentCache::new(backend, &config.cache, &config.backend.media_origin);
//! let cards: Vec<Card> = cache.filter_by_page(ResourceKind::Cards, 7).await?;
//! ```

use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{ClientError, ContentBackend};
use crate::config::CacheConfig;
use crate::models::{resolve_image_url, PageOwned, PageRef, ResourceKind};

/// A cached list for one resource
#[derive(Clone)]
struct CacheEntry {
    items: Arc<Vec<Value>>,
}

/// Per-resource cache of list responses
pub struct ContentCache {
    backend: Arc<dyn ContentBackend>,
    entries: Cache<ResourceKind, CacheEntry>,
    media_origin: String,
}

impl std::fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCache")
            .field("entry_count", &self.entries.entry_count())
            .field("media_origin", &self.media_origin)
            .finish()
    }
}

impl ContentCache {
    /// Create a cache in front of `backend`.
    ///
    /// A zero `ttl_seconds` keeps entries until they are refreshed or
    /// invalidated.
    pub fn new(
        backend: Arc<dyn ContentBackend>,
        config: &CacheConfig,
        media_origin: impl Into<String>,
    ) -> Self {
        let mut builder = Cache::builder();
        if config.ttl_seconds > 0 {
            builder = builder.time_to_live(Duration::from_secs(config.ttl_seconds));
        }

        Self {
            backend,
            entries: builder.build(),
            media_origin: media_origin.into(),
        }
    }

    /// Full list for a resource, fetching only when nothing is cached.
    pub async fn load_all(&self, kind: ResourceKind) -> Result<Arc<Vec<Value>>, ClientError> {
        self.entries
            .try_get_with(kind, self.fetch(kind))
            .await
            .map(|entry| entry.items)
            .map_err(|e: Arc<ClientError>| (*e).clone())
    }

    /// Re-fetch a resource unconditionally and replace its entry.
    pub async fn refresh(&self, kind: ResourceKind) -> Result<Arc<Vec<Value>>, ClientError> {
        let entry = self.fetch(kind).await?;
        self.entries.insert(kind, entry.clone()).await;
        Ok(entry.items)
    }

    /// Drop the entry for a resource so the next load re-fetches it.
    pub async fn invalidate(&self, kind: ResourceKind) {
        self.entries.invalidate(&kind).await;
        tracing::debug!(%kind, "Cache entry invalidated");
    }

    /// Whether a list is currently cached.
    ///
    /// `false` means "unknown", not "empty".
    pub fn is_loaded(&self, kind: ResourceKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Full list for a resource decoded into records
    pub async fn load_typed<T: DeserializeOwned>(&self, kind: ResourceKind) -> Result<Vec<T>, ClientError> {
        let items = self.load_all(kind).await?;
        decode_items(&items)
    }

    /// Records whose owning-page field coerces to the same id as `page`
    pub async fn filter_by_page<T>(
        &self,
        kind: ResourceKind,
        page: impl Into<PageRef>,
    ) -> Result<Vec<T>, ClientError>
    where
        T: DeserializeOwned + PageOwned,
    {
        let page = page.into();
        let items: Vec<T> = self.load_typed(kind).await?;
        Ok(items
            .into_iter()
            .filter(|item| item.owning_page().is_some_and(|own| own.same_page(&page)))
            .collect())
    }

    async fn fetch(&self, kind: ResourceKind) -> Result<CacheEntry, ClientError> {
        let mut items = self.backend.list(kind).await.map_err(|e| {
            tracing::warn!(%kind, error = %e, "Failed to fetch list");
            e
        })?;

        if kind.has_images() {
            for item in &mut items {
                self.resolve_image(item);
            }
        }

        tracing::info!(%kind, count = items.len(), "Fetched list");
        tracing::debug!(%kind, items = ?items, "Fetched list contents");

        Ok(CacheEntry {
            items: Arc::new(items),
        })
    }

    fn resolve_image(&self, item: &mut Value) {
        let Some(image) = item.get_mut("image") else {
            return;
        };
        match image.as_str() {
            Some("") => *image = Value::Null,
            Some(path) => *image = Value::String(resolve_image_url(&self.media_origin, path)),
            None => {}
        }
    }
}

pub(crate) fn decode_items<T: DeserializeOwned>(items: &[Value]) -> Result<Vec<T>, ClientError> {
    items
        .iter()
        .map(|item| serde_json::from_value(item.clone()).map_err(ClientError::from))
        .collect()
}
