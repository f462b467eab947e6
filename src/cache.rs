//! Read-through TTL cache for collection snapshots.
//!
//! A cache miss (or stale entry) makes the caller fetch from the backing
//! store and repopulate before returning. Entries expire purely by age;
//! there is no size bound because each cache holds exactly one snapshot.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct TtlCache<T> {
    inner: Arc<RwLock<Option<(DateTime<Utc>, T)>>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    /// Return the cached value if it is younger than the TTL.
    pub async fn get(&self) -> Option<T> {
        let guard = self.inner.read().await;
        if let Some((ts, value)) = &*guard {
            if (Utc::now() - *ts).num_seconds() < self.ttl.as_secs() as i64 {
                return Some(value.clone());
            }
        }
        None
    }

    pub async fn put(&self, value: T) {
        let mut guard = self.inner.write().await;
        *guard = Some((Utc::now(), value));
    }

    /// Drop the snapshot so the next read goes to the store.
    pub async fn invalidate(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }
}
