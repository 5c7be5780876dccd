//! Error types for the entitlement engine.

use storetier_verify::VerificationError;
use thiserror::Error;

/// Result type for platform calls.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors reported by the commerce platform boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// Network or transport error.
    #[error("network error: {0}")]
    Network(String),

    /// The platform refused or could not serve the request.
    #[error("platform unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the configured timeout.
    #[error("operation timed out")]
    Timeout,
}

/// Errors that can occur in engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A catalog, entitlement or status fetch failed. Prior state is kept.
    #[error("{operation} failed: {source}")]
    PlatformFetch {
        operation: &'static str,
        #[source]
        source: PlatformError,
    },

    /// The purchase failed for a reason other than cancellation or pending approval.
    #[error("purchase failed: {0}")]
    Purchase(String),

    /// A record failed verification.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// No display metadata exists for the product.
    #[error("no display metadata for product: {0}")]
    UnmappedProduct(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn fetch(operation: &'static str, source: PlatformError) -> Self {
        Self::PlatformFetch { operation, source }
    }
}
