//! Response DTOs for the proxy API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::backend::StoreStats;
use crate::cache::CacheStats;

/// Response body for the lookup operation (GET /lookup)
///
/// Found and not-found lookups share this shape; `value` is null when the
/// key does not exist.
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    /// The requested key
    pub key: String,
    /// The value, if the key exists
    pub value: Option<String>,
    /// HTTP status of the response
    pub status: u16,
}

impl LookupResponse {
    pub fn found(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            status: 200,
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            status: 404,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub capacity_evictions: u64,
    pub expiry_evictions: u64,
    /// Current number of cached keys
    pub total_entries: usize,
    /// Maximum number of cached keys
    pub capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Backing store counters
    pub store: StoreStats,
    /// Lookups waiting for the cache worker
    pub queue_depth: usize,
}

impl StatsResponse {
    /// Creates a new StatsResponse from worker statistics
    pub fn new(cache: &CacheStats, store: StoreStats, queue_depth: usize) -> Self {
        Self {
            hits: cache.hits,
            misses: cache.misses,
            capacity_evictions: cache.capacity_evictions,
            expiry_evictions: cache.expiry_evictions,
            total_entries: cache.total_entries,
            capacity: cache.capacity,
            hit_rate: cache.hit_rate(),
            store,
            queue_depth,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
    /// HTTP status of the response
    pub status: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, status: u16) -> Self {
        Self {
            error: error.into(),
            status,
        }
    }
}
