//! Cache Node Module
//!
//! Defines the per-key node stored in the eviction list arena.

use std::time::{Duration, Instant};

// == Node Id ==
/// Handle to a node slot in the eviction list arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the arena slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

// == Node ==
/// One cached key with its value, expiry and list links.
#[derive(Debug, Clone)]
pub struct Node {
    /// The cached key
    pub key: String,
    /// The value as retrieved from the backing store
    pub value: String,
    /// Monotonic instant after which the value is stale
    pub expiry: Instant,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

impl Node {
    // == Constructor ==
    /// Creates an unlinked node that stays fresh for `ttl` from now.
    pub fn new(key: String, value: String, ttl: Duration) -> Self {
        Self {
            key,
            value,
            expiry: Instant::now() + ttl,
            prev: None,
            next: None,
        }
    }

    // == Is Fresh ==
    /// An entry is fresh strictly before its expiry instant.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expiry
    }

    // == Refresh ==
    /// Replaces the value and restarts the TTL.
    pub fn refresh(&mut self, value: String, ttl: Duration) {
        self.value = value;
        self.expiry = Instant::now() + ttl;
    }

    /// Previous (more recently used) node.
    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    /// Next (less recently used) node.
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub(crate) fn is_unlinked(&self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }
}
