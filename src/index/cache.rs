//! Memoized cell ids for repeated positions.
//!
//! Anchored vessels report the same coordinates over and over, so the leaf
//! cell id is cached under a key built from the exact bit patterns of the
//! coordinates. The cache is bounded: once `capacity` entries are held, the
//! next miss resets it before inserting.

use rustc_hash::FxHashMap;
use tracklog_types::point::LatLng;

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub len: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub resets: u64,
}

#[derive(Debug)]
pub struct CellCache {
    entries: FxHashMap<String, u64>,
    capacity: usize,
    hits: u64,
    misses: u64,
    resets: u64,
}

impl CellCache {
    /// A capacity of 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            capacity,
            hits: 0,
            misses: 0,
            resets: 0,
        }
    }

    /// Stable key for a position: `{lat_bits_hex}:{lon_bits_hex}`.
    pub fn key(pos: &LatLng) -> String {
        format!("{:016x}:{:016x}", pos.lat.to_bits(), pos.lon.to_bits())
    }

    pub fn get(&self, pos: &LatLng) -> Option<u64> {
        self.entries.get(&Self::key(pos)).copied()
    }

    pub fn get_or_insert_with<F>(&mut self, pos: &LatLng, compute: F) -> u64
    where
        F: FnOnce() -> u64,
    {
        if self.capacity == 0 {
            self.misses += 1;
            return compute();
        }

        let key = Self::key(pos);
        if let Some(&id) = self.entries.get(&key) {
            self.hits += 1;
            return id;
        }

        self.misses += 1;
        if self.entries.len() >= self.capacity {
            log::debug!("Cell cache full ({} entries), resetting", self.entries.len());
            self.entries.clear();
            self.resets += 1;
        }

        let id = compute();
        self.entries.insert(key, id);
        id
    }

    /// Drop every entry. Counters are kept.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.resets += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            len: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            resets: self.resets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_bit_exact() {
        let a = CellCache::key(&LatLng::new(60.0, 21.0));
        let b = CellCache::key(&LatLng::new(60.0, 21.000_000_000_001));
        assert_ne!(a, b);
        assert_eq!(a.len(), 33);
    }

    #[test]
    fn test_hit_and_miss() {
        let mut cache = CellCache::new(4);
        let pos = LatLng::new(1.0, 2.0);

        assert_eq!(cache.get_or_insert_with(&pos, || 11), 11);
        assert_eq!(cache.get_or_insert_with(&pos, || unreachable!()), 11);
        assert_eq!(cache.get(&pos), Some(11));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.len, 1);
    }

    #[test]
    fn test_full_cache_resets() {
        let mut cache = CellCache::new(2);
        cache.get_or_insert_with(&LatLng::new(0.0, 0.0), || 1);
        cache.get_or_insert_with(&LatLng::new(0.0, 1.0), || 2);
        assert_eq!(cache.len(), 2);

        cache.get_or_insert_with(&LatLng::new(0.0, 2.0), || 3);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().resets, 1);
        assert_eq!(cache.get(&LatLng::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_zero_capacity_disables() {
        let mut cache = CellCache::new(0);
        let pos = LatLng::new(5.0, 5.0);
        cache.get_or_insert_with(&pos, || 9);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_reset() {
        let mut cache = CellCache::new(8);
        cache.get_or_insert_with(&LatLng::new(3.0, 3.0), || 3);
        cache.reset();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().resets, 1);
    }
}
