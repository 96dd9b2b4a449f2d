//! Backing Store Module
//!
//! The slow remote key-value store the cache reads through to on a miss.

mod redis_store;

#[cfg(test)]
pub(crate) mod mock;

pub use redis_store::RedisStore;

use serde::Serialize;
use thiserror::Error;

// == Backend Error ==
/// Failure of a backing-store fetch, distinct from a key being absent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The store could not be reached (refused, dropped, timed out)
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the exchange failed
    #[error("store protocol error: {0}")]
    Protocol(String),
}

// == Store Stats ==
/// Lookup counters kept by a backing store client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Fetches that returned a value
    pub hits: u64,
    /// Fetches that found no value
    pub misses: u64,
    /// Fetches that failed
    pub errors: u64,
}

// == Backing Store ==
/// Blocking get-by-key access to the backing store.
///
/// `Ok(None)` means the key does not exist. Transport and protocol failures
/// must come back as `Err`, never as `Ok(None)`.
pub trait BackingStore: Send {
    /// Fetches the value stored under `key`.
    fn get(&mut self, key: &str) -> Result<Option<String>, BackendError>;

    /// Returns the client's lookup counters.
    fn stats(&self) -> StoreStats {
        StoreStats::default()
    }
}

impl<S: BackingStore + ?Sized> BackingStore for Box<S> {
    fn get(&mut self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get(key)
    }

    fn stats(&self) -> StoreStats {
        (**self).stats()
    }
}
