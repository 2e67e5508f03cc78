//! Decode, build, and export errors.

use thiserror::Error;

/// Result type used throughout the crate.
pub type MeshResult<T> = Result<T, MeshError>;

/// All the ways a decode, build, or export can fail.
///
/// Readers recover from some of these locally: a missing CRS is treated as
/// "not reversed", malformed polyline node-counts fall back to a single run,
/// and the grid/triangulated readers yield the patches completed before a
/// failure. The rest surface to the caller.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A CRS, dataset, or referenced object could not be resolved.
    #[error("not found: {0}")]
    NotFound(String),

    /// An array or representation kind this crate does not recognize.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Inconsistent index or length data in the source arrays.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MeshError {
    /// Create a `Malformed` error with the given message.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Create a `NotFound` error with the given message.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}
