//! Commerce platform abstraction.
//!
//! The engine never talks to a vendor SDK directly. Everything it consumes
//! from the platform (catalog, signed record streams, subscription statuses,
//! purchases and acknowledgements) goes through [`CommercePlatform`].

use crate::error::PlatformResult;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::BTreeSet;
use storetier_types::{
    Product, PurchaseOutcome, StatusRecord, TransactionRecord, VerificationResult,
};

/// A stream of signed transaction records.
pub type RecordStream = BoxStream<'static, VerificationResult<TransactionRecord>>;

/// A commerce platform that sells subscriptions and reports entitlements.
#[async_trait]
pub trait CommercePlatform: Send + Sync {
    /// Fetches catalog products for the given identifiers.
    async fn fetch_catalog(&self, product_ids: &BTreeSet<String>) -> PlatformResult<Vec<Product>>;

    /// Subscribes to live transaction updates.
    ///
    /// The stream is long-lived; it ends only when the platform shuts down.
    fn transaction_updates(&self) -> RecordStream;

    /// Returns a snapshot stream of every entitlement the user currently holds.
    /// Can be queried again at any time for a fresh snapshot.
    async fn current_entitlements(&self) -> PlatformResult<RecordStream>;

    /// Returns the statuses of the subscription group `group_of` belongs to.
    async fn subscription_statuses(&self, group_of: &Product) -> PlatformResult<Vec<StatusRecord>>;

    /// Starts a purchase of `product`.
    async fn purchase(&self, product: &Product) -> PlatformResult<PurchaseOutcome>;

    /// Marks a transaction as processed. Must be called once per transaction.
    async fn acknowledge(&self, transaction: &TransactionRecord) -> PlatformResult<()>;

    /// Asks the platform to resynchronize purchases (restore purchases).
    async fn sync(&self) -> PlatformResult<()>;
}
