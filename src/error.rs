//! Error types for the caching proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::backend::BackendError;
use crate::models::ErrorResponse;

// == Proxy Error Enum ==
/// Unified error type for the caching proxy.
///
/// A key that is absent from both the cache and the backing store is not an
/// error; it is reported as `Ok(None)` by the engine and mapped to 404 by the
/// lookup handler.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Missing or malformed request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Admission control rejected the request
    #[error("Too many requests, try again later")]
    Throttled,

    /// The backing store could not answer the lookup
    #[error("Backing store failure: {0}")]
    Backend(#[from] BackendError),

    /// The worker queue is at capacity
    #[error("Cache worker queue is full ({0} pending)")]
    QueueFull(usize),

    /// The cache worker has stopped
    #[error("Cache worker is unavailable")]
    WorkerUnavailable,

    /// Cache constructed with no room for a single entry
    #[error("Cache capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProxyError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Throttled => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Backend(_) => StatusCode::BAD_GATEWAY,
            ProxyError::QueueFull(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::WorkerUnavailable
            | ProxyError::InvalidCapacity(_)
            | ProxyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::new(self.to_string(), status.as_u16()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_failure_is_not_not_found() {
        let err = ProxyError::from(BackendError::Unavailable("connection refused".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_ne!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_throttled_maps_to_503() {
        assert_eq!(
            ProxyError::Throttled.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_invalid_request_maps_to_400() {
        let err = ProxyError::InvalidRequest("missing key".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("missing key"));
    }
}
