//! The verification envelope wrapped around every platform record.

use serde::{Deserialize, Serialize};

/// Outcome of the platform's signature check on a record.
///
/// Either the payload passed verification, or it did not and no payload is
/// exposed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationResult<T> {
    /// The signature checked out; the payload can be trusted.
    Verified(T),
    /// The record failed verification.
    Unverified,
}

impl<T> VerificationResult<T> {
    /// Returns true if the record passed verification.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }

    /// Maps the verified payload, preserving `Unverified`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> VerificationResult<U> {
        match self {
            Self::Verified(payload) => VerificationResult::Verified(f(payload)),
            Self::Unverified => VerificationResult::Unverified,
        }
    }

    /// Borrows the verified payload, if any.
    #[must_use]
    pub fn as_verified(&self) -> Option<&T> {
        match self {
            Self::Verified(payload) => Some(payload),
            Self::Unverified => None,
        }
    }
}
