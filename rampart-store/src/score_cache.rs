//! Bounded ML score cache with flush-on-overflow

use std::collections::HashMap;
use std::sync::Mutex;

/// Cap on cached fingerprints before the cache is flushed.
pub const SCORE_CACHE_CAP: usize = 1000;

/// Fingerprint -> last computed ML score.
///
/// Invalidation is flush-on-overflow only: when a new fingerprint arrives
/// at capacity, the whole map is cleared under the lock before the insert.
/// There is no TTL.
pub struct ScoreCache {
    cap: usize,
    map: Mutex<HashMap<String, f64>>,
}

impl ScoreCache {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            map: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, fingerprint: &str) -> Option<f64> {
        self.map
            .lock()
            .ok()
            .and_then(|m| m.get(fingerprint).copied())
    }

    pub fn insert(&self, fingerprint: String, score: f64) {
        if let Ok(mut map) = self.map.lock() {
            if map.len() >= self.cap && !map.contains_key(&fingerprint) {
                map.clear();
            }
            map.insert(fingerprint, score);
        }
    }

    pub fn len(&self) -> usize {
        self.map.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new(SCORE_CACHE_CAP)
    }
}

impl std::fmt::Debug for ScoreCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreCache")
            .field("cap", &self.cap)
            .field("len", &self.len())
            .finish()
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// The cache never exceeds its cap, whatever the insert sequence.
        #[test]
        fn prop_len_never_exceeds_cap(
            cap in 1usize..50,
            keys in proptest::collection::vec("[a-z]{1,6}", 0..200),
        ) {
            let cache = ScoreCache::new(cap);
            for (i, key) in keys.into_iter().enumerate() {
                cache.insert(key, i as f64);
                prop_assert!(cache.len() <= cap);
            }
        }
    }
}
