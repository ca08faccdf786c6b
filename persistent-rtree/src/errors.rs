//! Error types for R-Tree construction and entry validation.

use thiserror::Error;

/// Errors that can occur when building an index or its entries.
///
/// Every variant is raised before any structural change begins, so a failed
/// call never leaves a half-built tree behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpatialError {
    /// An entry was constructed without a usable geometry.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Tree configuration parameters are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for spatial operations
pub type SpatialResult<T> = Result<T, SpatialError>;
