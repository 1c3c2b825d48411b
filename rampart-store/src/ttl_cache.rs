//! TTL cache for threat-intel and analysis results

use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct Entry<V> {
    stored_at: Instant,
    ttl: Duration,
    value: V,
}

/// Concurrent cache where every entry expires after its TTL.
///
/// Entries default to the cache-wide TTL; feed snapshots use
/// [`TtlCache::insert_with_ttl`] for their longer provider-specific windows.
/// Expired entries are dropped lazily on read.
pub struct TtlCache<K, V> {
    default_ttl: Duration,
    map: DashMap<K, Entry<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            map: DashMap::new(),
        }
    }

    /// Fresh value for the key, if any. Expired entries are removed.
    pub fn get(&self, key: &K) -> Option<V> {
        let expired = match self.map.get(key) {
            Some(entry) => {
                if entry.stored_at.elapsed() < entry.ttl {
                    return Some(entry.value.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.map.remove(key);
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.map.insert(
            key,
            Entry {
                stored_at: Instant::now(),
                ttl,
                value,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&self) {
        self.map.clear();
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("default_ttl", &self.default_ttl)
            .field("len", &self.map.len())
            .finish()
    }
}
