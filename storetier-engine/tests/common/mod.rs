//! Shared fixtures for engine tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use ed25519_dalek::SigningKey;
use std::sync::Arc;
use storetier_engine::{EngineConfig, EntitlementEngine, InMemoryPlatform};
use storetier_types::{Price, Product, ProductType, TransactionRecord, VerificationResult};
use storetier_verify::EnvelopeKey;

/// The Idea subscription, price 1.
pub fn idea() -> Product {
    Product::subscription("idea", "Idea", Price::from_minor_units(100))
        .with_description("Sketch out ideas")
        .with_subscription_group("pro")
}

/// The Visual subscription, price 2.
pub fn visual() -> Product {
    Product::subscription("visual", "Visual", Price::from_minor_units(200))
        .with_description("Bring ideas to life")
        .with_subscription_group("pro")
}

/// A consumable that must never enter the subscription catalog.
pub fn gems() -> Product {
    Product::subscription("gems", "Gems", Price::from_minor_units(50))
        .with_product_type(ProductType::Consumable)
}

/// A subscription transaction for `product_id`.
pub fn tx(id: u64, product_id: &str) -> TransactionRecord {
    let date = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    TransactionRecord::subscription(id, product_id, date)
}

pub fn verified(transaction: TransactionRecord) -> VerificationResult<TransactionRecord> {
    VerificationResult::Verified(transaction)
}

pub fn unverified() -> VerificationResult<TransactionRecord> {
    VerificationResult::Unverified
}

/// A platform selling Idea and Visual (plus a consumable).
pub fn platform() -> Arc<InMemoryPlatform> {
    let platform = InMemoryPlatform::new();
    platform.set_catalog(vec![visual(), gems(), idea()]);
    Arc::new(platform)
}

pub fn engine(platform: &Arc<InMemoryPlatform>) -> Arc<EntitlementEngine<InMemoryPlatform>> {
    Arc::new(EntitlementEngine::new(platform.clone(), EngineConfig::default()))
}

pub fn engine_with_config(
    platform: &Arc<InMemoryPlatform>,
    config: EngineConfig,
) -> Arc<EntitlementEngine<InMemoryPlatform>> {
    Arc::new(EntitlementEngine::new(platform.clone(), config))
}

/// Returns a deterministic Ed25519 key pair from a fixed seed.
pub fn test_keypair() -> (SigningKey, EnvelopeKey) {
    let signing_key = SigningKey::from_bytes(&[42u8; 32]);
    let key = EnvelopeKey::for_signing_key(&signing_key);
    (signing_key, key)
}

pub fn ids(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}
