//! Short-lived cache in front of an option source.

use std::time::Duration;

use agrilend_browser::FilterOption;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::Result;
use crate::source::OptionSource;

/// How long fetched option lists stay fresh.
pub const DEFAULT_OPTION_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CachedOptions {
    options: Vec<FilterOption>,
    expires_at: DateTime<Utc>,
}

impl CachedOptions {
    fn new(options: Vec<FilterOption>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());
        CachedOptions {
            options,
            expires_at: Utc::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Wraps an [`OptionSource`] so each filter's options are fetched at most
/// once per TTL. Failed fetches are not cached.
#[derive(Debug)]
pub struct CachedOptionSource<S> {
    inner: S,
    ttl: Duration,
    store: DashMap<String, CachedOptions>,
}

impl<S: OptionSource> CachedOptionSource<S> {
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_OPTION_TTL)
    }

    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        CachedOptionSource {
            inner,
            ttl,
            store: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `filter_id`, dropping it if expired.
    fn lookup(&self, filter_id: &str) -> Option<Vec<FilterOption>> {
        let entry = self.store.get(filter_id)?;
        if entry.is_expired() {
            drop(entry);
            self.store.remove(filter_id);
            None
        } else {
            Some(entry.options.clone())
        }
    }

    pub fn invalidate(&self, filter_id: &str) {
        self.store.remove(filter_id);
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    /// Removes expired entries; returns how many.
    pub fn gc(&self) -> usize {
        let mut removed = 0;
        self.store.retain(|_, cached| {
            if cached.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Entries held, expired ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl<S: OptionSource> OptionSource for CachedOptionSource<S> {
    async fn fetch_options(&self, filter_id: &str) -> Result<Vec<FilterOption>> {
        if let Some(options) = self.lookup(filter_id) {
            log::trace!("option cache hit for '{filter_id}'");
            return Ok(options);
        }
        let options = self.inner.fetch_options(filter_id).await?;
        let cached = CachedOptions::new(options.clone(), self.ttl);
        self.store.insert(filter_id.to_string(), cached);
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl OptionSource for Counting {
        async fn fetch_options(&self, filter_id: &str) -> Result<Vec<FilterOption>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClientError::http(500));
            }
            Ok(vec![FilterOption::new(filter_id, filter_id)])
        }
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_cache() {
        let cache = CachedOptionSource::new(Counting::default());
        cache.fetch_options("status").await.unwrap();
        cache.fetch_options("status").await.unwrap();
        cache.fetch_options("ecosystem").await.unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let cache = CachedOptionSource::with_ttl(Counting::default(), Duration::ZERO);
        cache.fetch_options("status").await.unwrap();
        assert_eq!(cache.gc(), 1);
        cache.fetch_options("status").await.unwrap();
        cache.fetch_options("status").await.unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache = CachedOptionSource::new(Counting::default());
        cache.fetch_options("status").await.unwrap();
        cache.invalidate("status");
        assert!(cache.is_empty());
        cache.fetch_options("status").await.unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = CachedOptionSource::new(Counting {
            fail: true,
            ..Default::default()
        });
        assert!(cache.fetch_options("status").await.is_err());
        assert!(cache.is_empty());
    }
}
