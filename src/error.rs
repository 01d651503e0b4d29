//! Error types for the catalog cache service
//!
//! Provides unified error handling using thiserror. The cache and query layers
//! convert every anticipated failure into data (`Option`, empty `Vec`, or a
//! `ListResult` carrying a message); these types exist for logging, for the
//! upstream client's contract, and for the HTTP edge.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Upstream Error Enum ==
/// Failures raised by the upstream catalog client.
///
/// A non-success status for a specific lookup is not an error: the client
/// reports it as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Network-level failure reaching the catalog API
    #[error("Catalog API unavailable: {0}")]
    Unavailable(String),

    /// Request exceeded the configured deadline
    #[error("Catalog API timed out: {0}")]
    Timeout(String),

    /// Payload did not match the expected shape
    #[error("Malformed catalog response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// Message safe to show to an end user.
    ///
    /// Malformed payloads are reported without any upstream detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            UpstreamError::Unavailable(_) => {
                "The catalog service is unreachable right now. Please try again shortly."
            }
            UpstreamError::Timeout(_) => {
                "The catalog service took too long to respond. Please try again."
            }
            UpstreamError::Malformed(_) => "The catalog returned unexpected data.",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err.to_string())
        } else if err.is_decode() {
            UpstreamError::Malformed(err.to_string())
        } else {
            UpstreamError::Unavailable(err.to_string())
        }
    }
}

// == Catalog Error Enum ==
/// Unified error type for the HTTP edge of the service.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Network-level failure reaching the catalog API
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream request exceeded its deadline
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// Requested entity does not exist upstream
    #[error("Not found: {0}")]
    UpstreamNotFound(String),

    /// Upstream payload failed to parse
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Unexpected failure inside the get-or-populate sequence
    #[error("Cache layer fault: {0}")]
    CacheLayerFault(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<UpstreamError> for CatalogError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Unavailable(msg) => CatalogError::UpstreamUnavailable(msg),
            UpstreamError::Timeout(msg) => CatalogError::UpstreamTimeout(msg),
            UpstreamError::Malformed(msg) => CatalogError::MalformedResponse(msg),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CatalogError::UpstreamUnavailable(_) => (
                StatusCode::BAD_GATEWAY,
                "Catalog service unavailable, try again later".to_string(),
            ),
            CatalogError::UpstreamTimeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                "Catalog service timed out, try again later".to_string(),
            ),
            CatalogError::UpstreamNotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CatalogError::MalformedResponse(_) => (
                StatusCode::BAD_GATEWAY,
                "Catalog returned unexpected data".to_string(),
            ),
            CatalogError::CacheLayerFault(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            ),
            CatalogError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP edge.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type returned by the upstream client.
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;
