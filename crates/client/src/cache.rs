//! In-memory TTL cache for slow-changing reference data.
//!
//! Entries are stored with an absolute expiry and are only visible while the
//! current instant is strictly before it. Expired entries are removed lazily,
//! by the read that finds them expired; there is no background sweeper and
//! no size bound.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use sentry_client::TtlCache;
//!
//! let cache: TtlCache<Vec<String>> = TtlCache::new();
//! cache.set("projects", vec!["web".to_string()], Duration::from_secs(300));
//!
//! assert_eq!(cache.get("projects"), Some(vec!["web".to_string()]));
//! assert_eq!(cache.get("teams"), None);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A cached value with its expiry.
///
/// `expires_at` is `None` when `now + ttl` does not fit in an [`Instant`];
/// such an entry never expires.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

/// A concurrency-safe key/value store with per-entry expiration.
///
/// One mutex guards each entry's value and expiry together, so readers never
/// observe a value paired with another write's expiry. The lock is only held
/// for the map access itself.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = Instant::now().checked_add(ttl);
        self.lock().insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Returns a copy of the live value stored under `key`.
    ///
    /// An entry whose expiry has been reached is removed and `None` is
    /// returned.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Returns the number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave an entry half-written.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
