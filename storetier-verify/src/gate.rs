use crate::error::{VerificationError, VerifyResult};
use storetier_types::VerificationResult;

/// Unwraps a verified payload or rejects the record.
///
/// The platform's signature check is the trust boundary, so a verified
/// payload passes through untouched. A rejection is final for that record;
/// callers skip it and move on.
pub fn verify<T>(result: VerificationResult<T>) -> VerifyResult<T> {
    match result {
        VerificationResult::Verified(payload) => Ok(payload),
        VerificationResult::Unverified => Err(VerificationError::FailedVerification),
    }
}
