//! Shared test helpers for verification tests.

#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeZone, Utc};
use ed25519_dalek::{Signer, SigningKey};
use storetier_types::TransactionRecord;
use storetier_verify::EnvelopeKey;

/// Returns a deterministic Ed25519 key pair from a fixed seed.
pub fn test_keypair() -> (SigningKey, EnvelopeKey) {
    let seed: [u8; 32] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ];
    let signing_key = SigningKey::from_bytes(&seed);
    let key = EnvelopeKey::for_signing_key(&signing_key);
    (signing_key, key)
}

/// Returns a second, unrelated key pair.
pub fn other_keypair() -> (SigningKey, EnvelopeKey) {
    let signing_key = SigningKey::from_bytes(&[7u8; 32]);
    let key = EnvelopeKey::for_signing_key(&signing_key);
    (signing_key, key)
}

/// Signs raw payload text without going through serde.
pub fn sign_raw(signing_key: &SigningKey, payload: &str) -> String {
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload.as_bytes());
    let signature = signing_key.sign(payload_b64.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());
    format!("{payload_b64}.{sig_b64}")
}

/// A subscription transaction for `product_id`.
pub fn transaction(id: u64, product_id: &str) -> TransactionRecord {
    let date = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    TransactionRecord::subscription(id, product_id, date)
}
