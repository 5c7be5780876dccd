//! Signed record envelopes.
//!
//! Envelopes use the format: `base64url(payload).base64url(signature)`
//!
//! The payload is the record serialized as JSON. The signature covers
//! `payload_b64.as_bytes()` (the encoded payload string), so a verifier never
//! has to re-serialize anything before checking it.

use crate::error::{EnvelopeError, EnvelopeResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use storetier_types::VerificationResult;
use tracing::debug;

/// Ed25519 public key that envelopes are checked against.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvelopeKey(VerifyingKey);

impl EnvelopeKey {
    /// Builds a key from raw 32-byte Ed25519 public key material.
    pub fn from_bytes(bytes: &[u8; 32]) -> EnvelopeResult<Self> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|e| EnvelopeError::InvalidKey(e.to_string()))
    }

    /// Parses a base64url (unpadded) encoded public key.
    pub fn parse(encoded: &str) -> EnvelopeResult<Self> {
        let raw = URL_SAFE_NO_PAD
            .decode(encoded.trim())
            .map_err(|e| EnvelopeError::InvalidKey(format!("invalid key base64: {e}")))?;
        let bytes: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| {
                EnvelopeError::InvalidKey(format!("expected 32 bytes, got {}", raw.len()))
            })?;
        Self::from_bytes(&bytes)
    }

    /// Returns the key that verifies envelopes sealed by `signing_key`.
    #[must_use]
    pub fn for_signing_key(signing_key: &SigningKey) -> Self {
        Self(signing_key.verifying_key())
    }

    /// Returns the base64url encoding accepted by [`EnvelopeKey::parse`].
    #[must_use]
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0.to_bytes())
    }
}

impl fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnvelopeKey").field(&self.to_base64()).finish()
    }
}

/// Opens an envelope, reporting why it was rejected.
pub fn try_open<T: DeserializeOwned>(compact: &str, key: &EnvelopeKey) -> EnvelopeResult<T> {
    let compact = compact.trim();

    let (payload_b64, signature_b64) = match compact.split('.').collect::<Vec<_>>().as_slice() {
        [payload, signature] => (*payload, *signature),
        _ => {
            return Err(EnvelopeError::InvalidFormat(
                "envelope must have exactly two parts separated by a dot".to_string(),
            ));
        }
    };

    let sig_bytes = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|e| EnvelopeError::InvalidFormat(format!("invalid signature base64: {e}")))?;

    let signature = Signature::from_slice(&sig_bytes)
        .map_err(|_| EnvelopeError::InvalidFormat("invalid signature length".to_string()))?;

    key.0
        .verify(payload_b64.as_bytes(), &signature)
        .map_err(|_| EnvelopeError::InvalidSignature)?;

    let payload_json = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|e| EnvelopeError::InvalidFormat(format!("invalid payload base64: {e}")))?;

    serde_json::from_slice(&payload_json)
        .map_err(|e| EnvelopeError::InvalidPayload(format!("invalid payload JSON: {e}")))
}

/// Opens an envelope into the platform's verification result.
///
/// Any failure is classified as `Unverified`; the reason is only logged.
pub fn open<T: DeserializeOwned>(compact: &str, key: &EnvelopeKey) -> VerificationResult<T> {
    match try_open(compact, key) {
        Ok(payload) => VerificationResult::Verified(payload),
        Err(e) => {
            debug!("Envelope rejected: {}", e);
            VerificationResult::Unverified
        }
    }
}

/// Serializes and signs a payload into a compact envelope.
pub fn seal<T: Serialize>(signing_key: &SigningKey, payload: &T) -> EnvelopeResult<String> {
    let payload_json = serde_json::to_vec(payload)?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json);
    let signature = signing_key.sign(payload_b64.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());
    Ok(format!("{payload_b64}.{sig_b64}"))
}
