//! API Handlers
//!
//! HTTP request handlers for each proxy endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, warn};

use crate::admission::RateLimiter;
use crate::error::{ProxyError, Result};
use crate::models::{HealthResponse, LookupQuery, LookupResponse, StatsResponse};
use crate::worker::WorkerHandle;

/// Application state shared across all handlers.
///
/// Handlers never hold the cache itself, only the queue to its worker.
#[derive(Clone)]
pub struct AppState {
    /// Sender side of the cache worker queue
    pub worker: WorkerHandle,
    /// Admission control applied before enqueueing
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(worker: WorkerHandle, limiter: RateLimiter) -> Self {
        Self {
            worker,
            limiter: Arc::new(limiter),
        }
    }
}

/// Handler for GET /lookup?key=...
///
/// Rejects malformed and throttled requests without touching the worker,
/// then reads the key through the cache.
pub async fn lookup_handler(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<(StatusCode, Json<LookupResponse>)> {
    let key = query.validate().map_err(ProxyError::InvalidRequest)?;

    if state.limiter.is_throttling() {
        warn!("Throttling lookup for '{}'", key);
        return Err(ProxyError::Throttled);
    }

    match state.worker.lookup(key).await? {
        Some(value) => Ok((StatusCode::OK, Json(LookupResponse::found(key, value)))),
        None => {
            debug!("Key '{}' not found", key);
            Ok((StatusCode::NOT_FOUND, Json(LookupResponse::not_found(key))))
        }
    }
}

/// Handler for GET /stats
///
/// Returns cache, backing store and queue statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let queue_depth = state.worker.queue_depth();
    let stats = state.worker.stats().await?;

    Ok(Json(StatsResponse::new(
        &stats.cache,
        stats.store,
        queue_depth,
    )))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
