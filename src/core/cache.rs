use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Default lifetime of a cached payload (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    stored_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() > self.ttl
    }
}

/// TTL-based in-memory cache shared between clones
#[derive(Debug)]
pub struct TtlCache<K, V> {
    storage: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    default_ttl: Duration,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            default_ttl: self.default_ttl,
        }
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Live value for `key`; expired entries are dropped on access
    pub fn get(&self, key: &K) -> Option<V> {
        let mut storage = self.storage.write().ok()?;

        match storage.get(key) {
            Some(entry) if entry.is_expired() => {
                storage.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        if let Ok(mut storage) = self.storage.write() {
            storage.insert(key, CacheEntry::new(value, ttl));
        }
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.storage
            .write()
            .ok()?
            .remove(key)
            .map(|entry| entry.value)
    }

    /// Drop every entry whose key matches; returns how many were dropped
    pub fn remove_where(&self, predicate: impl Fn(&K) -> bool) -> usize {
        match self.storage.write() {
            Ok(mut storage) => {
                let before = storage.len();
                storage.retain(|key, _| !predicate(key));
                before - storage.len()
            }
            Err(_) => 0,
        }
    }

    pub fn clear(&self) {
        if let Ok(mut storage) = self.storage.write() {
            storage.clear();
        }
    }

    pub fn cleanup_expired(&self) {
        if let Ok(mut storage) = self.storage.write() {
            storage.retain(|_, entry| !entry.is_expired());
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        match self.storage.read() {
            Ok(storage) => storage.get(key).is_some_and(|entry| !entry.is_expired()),
            Err(_) => false,
        }
    }

    pub fn stats(&self) -> CacheStats {
        match self.storage.read() {
            Ok(storage) => {
                let total_entries = storage.len();
                let expired_entries = storage.values().filter(|entry| entry.is_expired()).count();
                CacheStats {
                    total_entries,
                    active_entries: total_entries - expired_entries,
                    expired_entries,
                }
            }
            Err(_) => CacheStats::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
}
