//! Process-local TTL cache for search results.
//!
//! Values are stored as `serde_json::Value` so one cache serves every
//! response shape. Expiry is lazy: an expired entry dies on the read that
//! finds it, and `invalidate_pattern` lets the sync path drop a whole day of
//! keys (`routes:*:20260101`) after new data lands.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;

const DEFAULT_TTL: Duration = Duration::from_secs(3600);

struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = entries.get(key) {
                if entry.expires_at > Instant::now() {
                    if let Ok(value) = serde_json::from_value(entry.value.clone()) {
                        self.hits.fetch_add(1, Ordering::Relaxed);
                        return Some(value);
                    }
                }
            }
        }
        // Miss or expired: evict under the write lock.
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries
            .get(key)
            .is_some_and(|e| e.expires_at <= Instant::now())
        {
            entries.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl.unwrap_or(DEFAULT_TTL),
            },
        );
    }

    pub fn delete(&self, key: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key).is_some()
    }

    /// Remove every key matching a glob-ish pattern where `*` is a wildcard.
    /// Returns the number of keys removed.
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        let escaped = regex::escape(pattern).replace("\\*", ".*");
        let Ok(re) = regex::Regex::new(&format!("^{escaped}$")) else {
            return 0;
        };
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|key, _| !re.is_match(key));
        before - entries.len()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        CacheStats {
            entries: entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_roundtrip() {
        let cache = MemoryCache::new();
        cache.set("k", &vec![1, 2, 3], None);
        assert_eq!(cache.get::<Vec<i32>>("k"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get::<Vec<i32>>("missing"), None);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache.set("k", &"v", Some(Duration::ZERO));
        assert_eq!(cache.get::<String>("k"), None);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_invalidate_pattern_is_anchored() {
        let cache = MemoryCache::new();
        cache.set("routes:byCode:101:20260101", &1, None);
        cache.set("routes:byName:부산:20260101", &2, None);
        cache.set("routes:byCode:101:20260102", &3, None);
        cache.set("stats:20260101", &4, None);

        let removed = cache.invalidate_pattern("routes:*:20260101");
        assert_eq!(removed, 2);
        assert_eq!(cache.get::<i32>("routes:byCode:101:20260102"), Some(3));
        assert_eq!(cache.get::<i32>("stats:20260101"), Some(4));
    }

    #[test]
    fn test_stats_count_hits_and_misses() {
        let cache = MemoryCache::new();
        cache.set("k", &1, None);
        cache.get::<i32>("k");
        cache.get::<i32>("k");
        cache.get::<i32>("gone");
        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }
}
