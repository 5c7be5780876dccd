//! Verification of signed platform records.
//!
//! This crate handles:
//! - The verification gate: turning a `VerificationResult` into a trusted
//!   payload or a `FailedVerification` error
//! - Signed envelopes: opening compact Ed25519-signed records into a
//!   `VerificationResult`, and sealing payloads for fixtures and tests
//!
//! # Envelope Format
//!
//! Envelopes are formatted as: `base64url(payload).base64url(signature)`
//! The payload is the JSON encoding of the record; the signature covers the
//! base64url-encoded payload string, not the decoded JSON.
//!
//! Opening never fails: an envelope that is malformed, badly signed or
//! undecodable is classified `Unverified`, the same way the platform reports it.

mod envelope;
mod error;
mod gate;

pub use envelope::{open, seal, try_open, EnvelopeKey};
pub use error::{EnvelopeError, EnvelopeResult, VerificationError, VerifyResult};
pub use gate::verify;
