//! Cache Worker Module
//!
//! Serializes all cache engine calls onto one dedicated thread.
//!
//! # Jobs
//! - Lookup: read-through get for one key
//! - Stats: counter snapshot
//! - Shutdown: stop after draining the queue

mod cache_worker;

pub use cache_worker::{CacheWorker, WorkerHandle, WorkerStats};
