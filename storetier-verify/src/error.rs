//! Error types for record verification.

use thiserror::Error;

/// Raised by the verification gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The record failed the platform's signature check.
    #[error("record failed verification")]
    FailedVerification,
}

/// Why an envelope could not be opened.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Not two base64url parts separated by a dot.
    #[error("invalid envelope format: {0}")]
    InvalidFormat(String),

    /// Ed25519 signature verification failed.
    #[error("envelope signature invalid")]
    InvalidSignature,

    /// Verifying key bytes are not a valid Ed25519 point.
    #[error("invalid verifying key: {0}")]
    InvalidKey(String),

    /// Signature was valid but the payload JSON does not match the record type.
    #[error("invalid envelope payload: {0}")]
    InvalidPayload(String),

    /// Serialization error while sealing.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for the verification gate.
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Result type for envelope operations.
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;
