//! Proxy Cache - a read-through caching layer in front of Redis
//!
//! Serves key lookups over HTTP from a fixed-capacity LRU cache with lazy TTL
//! expiry, falling back to the backing store on a miss.

pub mod admission;
pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod worker;

pub use admission::RateLimiter;
pub use api::AppState;
pub use backend::{BackendError, BackingStore, RedisStore, StoreStats};
pub use cache::LruCache;
pub use config::Config;
pub use error::ProxyError;
pub use worker::{CacheWorker, WorkerHandle};
