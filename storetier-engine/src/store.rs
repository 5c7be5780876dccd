//! Entitlement state: catalog, purchased products and group renewal state.
//!
//! State is published as immutable [`EntitlementSnapshot`]s through a watch
//! channel. Writers take the writer lock, build a complete new snapshot and
//! swap it in; readers only ever see whole snapshots.

use futures::{Stream, StreamExt};
use std::sync::Arc;
use storetier_types::{
    Product, RenewalState, SubscriptionTier, TransactionRecord, VerificationResult,
};
use storetier_verify::verify;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// An immutable view of the entitlement state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitlementSnapshot {
    /// Bumped on every publish.
    pub version: u64,
    /// Auto-renewable catalog products, ascending by price.
    pub catalog: Vec<Product>,
    /// Catalog products the user currently holds, in entitlement stream order.
    pub purchased: Vec<Product>,
    /// Renewal state of the last resolved current subscription.
    pub group_renewal_state: Option<RenewalState>,
}

impl EntitlementSnapshot {
    /// Looks up a catalog product by identifier.
    #[must_use]
    pub fn catalog_product(&self, product_id: &str) -> Option<&Product> {
        self.catalog.iter().find(|p| p.id == product_id)
    }

    /// Returns true if the product is in the purchased set.
    #[must_use]
    pub fn is_purchased(&self, product_id: &str) -> bool {
        self.purchased.iter().any(|p| p.id == product_id)
    }

    /// Highest tier among purchased products.
    #[must_use]
    pub fn highest_purchased_tier(&self) -> SubscriptionTier {
        self.purchased
            .iter()
            .map(Product::tier)
            .max()
            .unwrap_or_default()
    }
}

/// Keeps auto-renewable subscriptions only, stable-sorted ascending by price.
#[must_use]
pub fn catalog_subscriptions(products: Vec<Product>) -> Vec<Product> {
    let mut subscriptions: Vec<Product> = products
        .into_iter()
        .filter(Product::is_auto_renewable)
        .collect();
    subscriptions.sort_by_key(|p| p.price);
    subscriptions
}

/// Process-wide entitlement state.
pub struct EntitlementStore {
    /// Latest snapshot; receivers are notified on every publish.
    current: watch::Sender<Arc<EntitlementSnapshot>>,
    /// Single-writer discipline for read-modify-publish sequences.
    writer: Mutex<()>,
}

impl Default for EntitlementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntitlementStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (current, _) = watch::channel(Arc::new(EntitlementSnapshot::default()));
        Self {
            current,
            writer: Mutex::new(()),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<EntitlementSnapshot> {
        self.current.borrow().clone()
    }

    /// Subscribes to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<EntitlementSnapshot>> {
        self.current.subscribe()
    }

    /// Replaces the catalog wholesale. Returns the stored catalog.
    pub async fn load_catalog(&self, products: Vec<Product>) -> Vec<Product> {
        let _guard = self.writer.lock().await;
        let catalog = catalog_subscriptions(products);
        info!("Loaded catalog with {} subscriptions", catalog.len());
        self.publish(|next| next.catalog = catalog.clone());
        catalog
    }

    /// Rebuilds the purchased set from a full current-entitlements stream.
    ///
    /// Every call discards the previous set. Records that fail verification
    /// are skipped; the rest of the stream is still consumed. Products held
    /// more than once (e.g. through family sharing) appear once per record.
    ///
    /// The new set is only published once the stream is exhausted, so
    /// dropping this future part-way leaves the previous set in place.
    pub async fn recompute_purchased<S>(&self, entitlements: S) -> Vec<Product>
    where
        S: Stream<Item = VerificationResult<TransactionRecord>> + Send,
    {
        let _guard = self.writer.lock().await;
        let catalog = self.snapshot().catalog.clone();

        let mut entitlements = std::pin::pin!(entitlements);
        let mut purchased = Vec::new();
        let mut rejected = 0usize;

        while let Some(result) = entitlements.next().await {
            let transaction = match verify(result) {
                Ok(transaction) => transaction,
                Err(e) => {
                    rejected += 1;
                    warn!("Skipping entitlement: {}", e);
                    continue;
                }
            };

            if !transaction.is_auto_renewable() {
                continue;
            }

            match catalog.iter().find(|p| p.id == transaction.product_id) {
                Some(product) => purchased.push(product.clone()),
                None => debug!(
                    "Entitlement {} for unknown product {}",
                    transaction.id, transaction.product_id
                ),
            }
        }

        info!(
            "Recomputed purchased set: {} products ({} records rejected)",
            purchased.len(),
            rejected
        );
        self.publish(|next| next.purchased = purchased.clone());
        purchased
    }

    /// Records the renewal state of the resolved current subscription.
    pub async fn set_group_renewal_state(&self, state: Option<RenewalState>) {
        let _guard = self.writer.lock().await;
        self.publish(|next| next.group_renewal_state = state);
    }

    /// Publishes a modified copy of the current snapshot. Callers hold the writer lock.
    fn publish(&self, update: impl FnOnce(&mut EntitlementSnapshot)) {
        let mut next = EntitlementSnapshot::clone(&self.snapshot());
        update(&mut next);
        next.version += 1;
        self.current.send_replace(Arc::new(next));
    }
}
