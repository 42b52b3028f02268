//! Thread-safe memoization for expensive predicates
use crate::result::{Error, ErrorKind, Result};
use lru::LruCache;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of entries kept by [`ShardedLru::new`]
pub const DEFAULT_CAPACITY: usize = 100_000;
/// Default number of independently locked shards
pub const DEFAULT_SHARDS: usize = 16;

/// A bounded LRU cache split into independently locked shards.
///
/// Each key lives in exactly one shard, chosen by hash. The shard
/// capacities add up to the requested capacity, and each shard evicts its
/// own least recently used entry once full, so eviction order is LRU per
/// shard.
///
/// # Example
///
/// ```rust
/// # use ntsim::cache::ShardedLru;
/// let cache: ShardedLru<u32, bool> = ShardedLru::new(8).unwrap();
///
/// assert_eq!(cache.get_or_insert_with(4, |&x| x % 2 == 0), true);
/// assert_eq!(cache.get(&4), Some(true));
/// assert_eq!(cache.hits(), 1);
/// ```
pub struct ShardedLru<K, V> {
    shards: Vec<Mutex<LruCache<K, V>>>,
    hasher: RandomState,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> ShardedLru<K, V> {
    /// Create a cache holding `capacity` entries over the default number of
    /// shards
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_shards(capacity, DEFAULT_SHARDS.min(capacity.max(1)))
    }

    /// Create a cache holding `capacity` entries over `n_shards`. The first
    /// `capacity % n_shards` shards take one entry more than the rest.
    pub fn with_shards(capacity: usize, n_shards: usize) -> Result<Self> {
        if n_shards == 0 || capacity < n_shards {
            return Err(Error::new(
                ErrorKind::InvalidParameter,
                "cache capacity must be at least the shard count, which must be positive",
            ));
        }
        let (per_shard, extra) = (capacity / n_shards, capacity % n_shards);

        let shards = (0..n_shards)
            .filter_map(|ix| NonZeroUsize::new(per_shard + usize::from(ix < extra)))
            .map(|cap| Mutex::new(LruCache::new(cap)))
            .collect();

        Ok(ShardedLru {
            shards,
            hasher: RandomState::new(),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    fn shard(&self, key: &K) -> MutexGuard<'_, LruCache<K, V>> {
        let ix = (self.hasher.hash_one(key) % self.shards.len() as u64) as usize;
        // A panic while holding the lock cannot leave an entry half written,
        // so a poisoned shard is still usable.
        self.shards[ix].lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key`, marking it as most recently used
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.shard(key).get(key).cloned();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// Insert or replace `key`
    pub fn put(&self, key: K, value: V) {
        self.shard(&key).put(key, value);
    }

    /// Return the cached value of `key`, computing and storing it with `f`
    /// on a miss. `f` runs without holding any lock, so two threads missing
    /// on the same key may both compute it.
    pub fn get_or_insert_with<F>(&self, key: K, f: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = f(&key);
        self.put(key, value.clone());
        value
    }

    /// Number of entries currently stored
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries, the sum of the shard capacities
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn n_shards(&self) -> usize {
        self.shards.len()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl<K, V> std::fmt::Debug for ShardedLru<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedLru")
            .field("capacity", &self.capacity)
            .field("n_shards", &self.shards.len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}
