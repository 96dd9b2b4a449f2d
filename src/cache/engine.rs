//! Cache Engine Module
//!
//! Read-through LRU cache with lazy TTL expiry, combining a key index with the
//! eviction list.
//!
//! The engine holds no lock. Every call must be serialized by the caller; in
//! the server that is the single cache worker thread.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::backend::{BackendError, BackingStore};
use crate::cache::{CacheStats, EvictionList, Node, NodeId};
use crate::error::ProxyError;

// == LRU Cache ==
/// Fixed-capacity, time-bounded LRU cache in front of a backing store.
#[derive(Debug)]
pub struct LruCache<S> {
    /// Key to node handle
    index: HashMap<String, NodeId>,
    /// Recency order and node storage
    list: EvictionList,
    stats: CacheStats,
    max_keys: usize,
    ttl: Duration,
    store: S,
}

impl<S: BackingStore> LruCache<S> {
    // == Constructor ==
    /// Creates a cache holding at most `max_keys` entries, each fresh for `ttl`.
    ///
    /// Fails with `ProxyError::InvalidCapacity` when `max_keys` is zero.
    pub fn new(max_keys: usize, ttl: Duration, store: S) -> Result<Self, ProxyError> {
        if max_keys == 0 {
            return Err(ProxyError::InvalidCapacity(max_keys));
        }

        Ok(Self {
            index: HashMap::with_capacity(max_keys),
            list: EvictionList::with_capacity(max_keys),
            stats: CacheStats::new(max_keys),
            max_keys,
            ttl,
            store,
        })
    }

    // == Get ==
    /// Looks up `key`, falling back to the backing store on a miss.
    ///
    /// Returns `Ok(None)` when the store has no value for the key and
    /// `Err` when the store could not be asked. Store failures are passed
    /// through untouched; nothing is retried here.
    pub fn get(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        match self.index.get(key).copied() {
            Some(id) => self.get_indexed(key, id),
            None => self.get_unindexed(key),
        }
    }

    fn get_indexed(&mut self, key: &str, id: NodeId) -> Result<Option<String>, BackendError> {
        let now = Instant::now();
        let fresh = self.list.node(id).is_some_and(|node| node.is_fresh(now));

        if fresh {
            if self.list.head() != Some(id) {
                self.list.remove(id);
                self.list.add_to_head(id);
            }
            self.stats.record_hit();
            return Ok(self.list.node(id).map(|node| node.value.clone()));
        }

        // Stale: drop it from both structures before asking the store.
        self.list.remove(id);
        self.index.remove(key);
        self.stats.record_expiry_eviction();
        self.stats.record_miss();
        debug!("Expired '{}', refetching from store", key);

        let value = match self.store.get(key) {
            Ok(Some(value)) => value,
            other => {
                self.list.release(id);
                return other;
            }
        };

        if let Some(node) = self.list.node_mut(id) {
            node.refresh(value.clone(), self.ttl);
        }
        self.index.insert(key.to_string(), id);
        self.list.add_to_head(id);

        Ok(Some(value))
    }

    fn get_unindexed(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        // A key the store does not have is not cached and not counted.
        let Some(value) = self.store.get(key)? else {
            return Ok(None);
        };

        self.stats.record_miss();
        if self.index.len() >= self.max_keys {
            self.evict_tail();
        }

        let id = self
            .list
            .alloc(Node::new(key.to_string(), value.clone(), self.ttl));
        self.list.add_to_head(id);
        self.index.insert(key.to_string(), id);

        Ok(Some(value))
    }

    // == Evict Tail ==
    /// Drops the least recently used entry.
    fn evict_tail(&mut self) {
        let Some(tail) = self.list.tail() else {
            return;
        };

        self.list.remove(tail);
        if let Some(node) = self.list.release(tail) {
            self.index.remove(&node.key);
            debug!("Evicted '{}' at capacity {}", node.key, self.max_keys);
        }
        self.stats.record_capacity_eviction();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_keys
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The backing store this cache reads through to.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Cached keys from most to least recently used.
    #[cfg(test)]
    pub(crate) fn recency(&self) -> Vec<String> {
        self.list
            .ids()
            .into_iter()
            .filter_map(|id| self.list.node(id).map(|node| node.key.clone()))
            .collect()
    }

    /// Panics unless the index and the list hold exactly the same nodes.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        self.list.check_invariants();
        assert!(self.index.len() <= self.max_keys, "cache over capacity");

        let linked: std::collections::HashSet<NodeId> = self.list.ids().into_iter().collect();
        assert_eq!(linked.len(), self.index.len(), "index and list sizes differ");

        for (key, id) in &self.index {
            assert!(linked.contains(id), "indexed node '{}' is not linked", key);
            let node = self.list.node(*id).expect("indexed slot is empty");
            assert_eq!(&node.key, key, "node key does not match its index key");
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockStore;
    use std::thread::sleep;

    const LONG_TTL: Duration = Duration::from_secs(300);

    fn keys(range: std::ops::Range<u32>) -> Vec<String> {
        range.map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = LruCache::new(0, LONG_TTL, MockStore::default());
        assert!(matches!(result, Err(ProxyError::InvalidCapacity(0))));
    }

    #[test]
    fn test_cold_cache_compulsory_misses() {
        let query = keys(0..10);
        let mut cache = LruCache::new(10, LONG_TTL, MockStore::echo(query.clone())).unwrap();

        for key in &query {
            assert_eq!(cache.get(key).unwrap().as_deref(), Some(key.as_str()));
        }

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 10);
        assert_eq!(cache.store().fetched, query);
        cache.check_invariants();
    }

    #[test]
    fn test_capacity_one_evicts_on_every_insert() {
        let query = keys(0..10);
        let mut cache = LruCache::new(1, LONG_TTL, MockStore::echo(query.clone())).unwrap();

        for key in &query {
            assert_eq!(cache.get(key).unwrap().as_deref(), Some(key.as_str()));
        }
        assert_eq!(cache.stats().capacity_evictions, 9);

        for key in &query {
            assert_eq!(cache.get(key).unwrap().as_deref(), Some(key.as_str()));
            cache.check_invariants();
        }

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 20);
        // Every one of the second pass's ten inserts displaced the prior entry.
        assert_eq!(stats.capacity_evictions, 19);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(cache.store().fetched.len(), 20);
        assert_eq!(cache.store().fetched[10..], query[..]);
    }

    #[test]
    fn test_second_pass_hits_when_working_set_fits() {
        let query = keys(0..10);
        let mut cache = LruCache::new(10, LONG_TTL, MockStore::echo(query.clone())).unwrap();

        for _ in 0..2 {
            for key in &query {
                assert_eq!(cache.get(key).unwrap().as_deref(), Some(key.as_str()));
            }
        }

        let stats = cache.stats();
        assert_eq!(stats.hits, 10);
        assert_eq!(stats.misses, 10);
        assert_eq!(stats.capacity_evictions, 0);
        assert_eq!(cache.store().fetched, query);
    }

    #[test]
    fn test_absent_key_is_not_cached_or_counted() {
        let mut cache = LruCache::new(4, LONG_TTL, MockStore::default()).unwrap();

        assert_eq!(cache.get("ghost").unwrap(), None);
        assert_eq!(cache.get("ghost").unwrap(), None);

        let stats = cache.stats();
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.hits, 0);
        assert!(cache.is_empty());
        assert_eq!(cache.store().fetched, vec!["ghost", "ghost"]);
    }

    #[test]
    fn test_hit_moves_key_to_head() {
        let mut cache = LruCache::new(3, LONG_TTL, MockStore::echo(["a", "b", "c", "d"])).unwrap();
        for key in ["a", "b", "c"] {
            cache.get(key).unwrap();
        }
        assert_eq!(cache.recency(), vec!["c", "b", "a"]);

        cache.get("a").unwrap();
        assert_eq!(cache.recency(), vec!["a", "c", "b"]);

        // "b" is now least recently used
        cache.get("d").unwrap();
        assert_eq!(cache.recency(), vec!["d", "a", "c"]);
        assert_eq!(cache.stats().capacity_evictions, 1);
        cache.check_invariants();
    }

    #[test]
    fn test_hit_on_head_keeps_order() {
        let mut cache = LruCache::new(3, LONG_TTL, MockStore::echo(["a", "b"])).unwrap();
        cache.get("a").unwrap();
        cache.get("b").unwrap();

        cache.get("b").unwrap();

        assert_eq!(cache.recency(), vec!["b", "a"]);
        assert_eq!(cache.stats().hits, 1);
        cache.check_invariants();
    }

    #[test]
    fn test_expired_entry_is_refetched() {
        let ttl = Duration::from_millis(20);
        let mut cache = LruCache::new(4, ttl, MockStore::with_entries([("k", "v1")])).unwrap();

        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v1"));
        cache.store_mut().data.insert("k".to_string(), "v2".to_string());

        sleep(Duration::from_millis(40));

        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v2"));

        let stats = cache.stats();
        assert_eq!(stats.expiry_evictions, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.store().fetched, vec!["k", "k"]);

        // The refreshed entry is fresh again
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(cache.stats().hits, 1);
        cache.check_invariants();
    }

    #[test]
    fn test_expired_entry_gone_from_store_is_dropped() {
        let ttl = Duration::from_millis(20);
        let mut cache = LruCache::new(4, ttl, MockStore::with_entries([("k", "v")])).unwrap();
        cache.get("k").unwrap();
        cache.store_mut().data.clear();

        sleep(Duration::from_millis(40));

        assert_eq!(cache.get("k").unwrap(), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expiry_evictions, 1);
        cache.check_invariants();

        // Still not cached: the next lookup goes to the store again
        assert_eq!(cache.get("k").unwrap(), None);
        assert_eq!(cache.store().fetched.len(), 3);
        assert_eq!(cache.stats().expiry_evictions, 1);
    }

    #[test]
    fn test_refreshed_entry_becomes_head() {
        let ttl = Duration::from_millis(30);
        let mut cache = LruCache::new(3, ttl, MockStore::echo(["a", "b", "c", "d"])).unwrap();

        cache.get("a").unwrap();
        sleep(Duration::from_millis(50));
        cache.get("b").unwrap();
        cache.get("c").unwrap();
        assert_eq!(cache.recency(), vec!["c", "b", "a"]);

        // "a" has expired; the refetch puts it at the head
        cache.get("a").unwrap();
        assert_eq!(cache.recency(), vec!["a", "c", "b"]);
        assert_eq!(cache.stats().expiry_evictions, 1);

        cache.get("d").unwrap();
        assert_eq!(cache.recency(), vec!["d", "a", "c"]);
        cache.check_invariants();
    }

    #[test]
    fn test_backend_failure_is_distinct_from_absent() {
        let mut store = MockStore::echo(["up"]);
        store.failing.insert("down".to_string());
        let mut cache = LruCache::new(4, LONG_TTL, store).unwrap();

        let absent = cache.get("missing");
        let failed = cache.get("down");

        assert_eq!(absent, Ok(None));
        assert!(matches!(failed, Err(BackendError::Unavailable(_))));
        assert_ne!(absent, failed);

        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 0);
        cache.check_invariants();
    }

    #[test]
    fn test_backend_failure_on_refresh_drops_entry() {
        let ttl = Duration::from_millis(20);
        let mut cache = LruCache::new(4, ttl, MockStore::echo(["k", "other"])).unwrap();
        cache.get("k").unwrap();
        cache.get("other").unwrap();
        cache.store_mut().failing.insert("k".to_string());

        sleep(Duration::from_millis(40));

        assert!(cache.get("k").is_err());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.recency(), vec!["other"]);
        assert_eq!(cache.stats().expiry_evictions, 1);
        cache.check_invariants();

        // Recovered store: the key is fetched and cached again
        cache.store_mut().failing.clear();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("k"));
        assert_eq!(cache.len(), 2);
        cache.check_invariants();
    }
}
