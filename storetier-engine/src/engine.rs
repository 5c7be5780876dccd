//! Entitlement engine: the facade callers and the update listener go through.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, PlatformError, PlatformResult};
use crate::glyphs::GlyphMap;
use crate::platform::CommercePlatform;
use crate::resolver::resolve;
use crate::store::{EntitlementSnapshot, EntitlementStore};
use std::future::Future;
use std::sync::Arc;
use storetier_types::{
    Product, PurchaseOutcome, RenewalState, ResolvedEntitlement, SubscriptionTier,
    TransactionRecord, VerificationResult,
};
use storetier_verify::verify;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Owns the entitlement store and mediates every platform call.
pub struct EntitlementEngine<P> {
    platform: Arc<P>,
    store: EntitlementStore,
    config: EngineConfig,
    glyphs: GlyphMap,
}

impl<P: CommercePlatform> EntitlementEngine<P> {
    /// Creates an engine. Glyphs are loaded from `config.glyph_map_path` if set.
    pub fn new(platform: Arc<P>, config: EngineConfig) -> Self {
        let glyphs = config
            .glyph_map_path
            .as_deref()
            .map(GlyphMap::load)
            .unwrap_or_default();
        Self {
            platform,
            store: EntitlementStore::new(),
            config,
            glyphs,
        }
    }

    /// Replaces the glyph map.
    #[must_use]
    pub fn with_glyphs(mut self, glyphs: GlyphMap) -> Self {
        self.glyphs = glyphs;
        self
    }

    /// Returns the platform.
    pub fn platform(&self) -> &Arc<P> {
        &self.platform
    }

    /// Returns the entitlement store.
    pub fn store(&self) -> &EntitlementStore {
        &self.store
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs a platform call under the fetch timeout.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> EngineResult<T>
    where
        F: Future<Output = PlatformResult<T>>,
    {
        match tokio::time::timeout(self.config.fetch_timeout(), call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(EngineError::fetch(operation, e)),
            Err(_) => Err(EngineError::fetch(operation, PlatformError::Timeout)),
        }
    }

    // ── Updates ──────────────────────────────────────────────────

    /// Fetches the catalog and replaces the stored one.
    ///
    /// On failure the previous catalog is kept.
    pub async fn refresh_catalog(&self) -> EngineResult<Vec<Product>> {
        let products = self
            .bounded("catalog fetch", self.platform.fetch_catalog(&self.config.product_ids))
            .await
            .inspect_err(|e| warn!("Keeping previous catalog: {}", e))?;
        Ok(self.store.load_catalog(products).await)
    }

    /// Rebuilds the purchased set from the platform's current entitlements.
    ///
    /// The fetch and the full stream scan share one timeout. On failure or
    /// timeout the previous purchased set is kept.
    pub async fn update_customer_product_status(&self) -> EngineResult<Vec<Product>> {
        let recompute = async {
            let entitlements = self.platform.current_entitlements().await?;
            Ok::<_, PlatformError>(self.store.recompute_purchased(entitlements).await)
        };
        self.bounded("entitlement fetch", recompute)
            .await
            .inspect_err(|e| warn!("Keeping previous purchased set: {}", e))
    }

    /// Handles one record from the live update stream.
    ///
    /// Unverified records are dropped without a recompute or acknowledgement.
    /// Verified ones trigger a full recompute and are then acknowledged. If
    /// the recompute fails the transaction is left unacknowledged so the
    /// platform delivers it again.
    pub async fn on_transaction_update(
        &self,
        record: VerificationResult<TransactionRecord>,
    ) -> EngineResult<TransactionRecord> {
        let transaction =
            verify(record).inspect_err(|e| warn!("Dropping transaction update: {}", e))?;
        debug!("Transaction update {} for {}", transaction.id, transaction.product_id);

        self.update_customer_product_status().await?;
        self.finish(&transaction).await;
        Ok(transaction)
    }

    /// Acknowledges a transaction. Failures are logged only.
    async fn finish(&self, transaction: &TransactionRecord) {
        match self
            .bounded("acknowledge", self.platform.acknowledge(transaction))
            .await
        {
            Ok(()) => debug!("Acknowledged transaction {}", transaction.id),
            Err(e) => warn!("Failed to acknowledge transaction {}: {}", transaction.id, e),
        }
    }

    /// Purchases a product.
    ///
    /// Returns the verified transaction on success and `None` when the user
    /// cancelled or the purchase awaits approval. Purchases are interactive,
    /// so no timeout applies.
    pub async fn purchase(&self, product: &Product) -> EngineResult<Option<TransactionRecord>> {
        let outcome = self
            .platform
            .purchase(product)
            .await
            .map_err(|e| EngineError::Purchase(e.to_string()))?;

        match outcome {
            PurchaseOutcome::Success(result) => {
                let transaction = verify(result)?;
                info!("Purchased {} (transaction {})", product.id, transaction.id);
                if let Err(e) = self.update_customer_product_status().await {
                    warn!("Purchase recorded but entitlements not refreshed: {}", e);
                }
                self.finish(&transaction).await;
                Ok(Some(transaction))
            }
            PurchaseOutcome::UserCancelled => {
                debug!("Purchase of {} cancelled by user", product.id);
                Ok(None)
            }
            PurchaseOutcome::Pending => {
                info!("Purchase of {} pending approval", product.id);
                Ok(None)
            }
            PurchaseOutcome::OtherFailure(reason) => Err(EngineError::Purchase(reason)),
        }
    }

    /// Asks the platform to resync purchases, then rebuilds the purchased set.
    pub async fn restore_purchases(&self) -> EngineResult<Vec<Product>> {
        self.bounded("restore", self.platform.sync()).await?;
        self.update_customer_product_status().await
    }

    // ── Resolution ───────────────────────────────────────────────

    /// Resolves the current subscription for the catalog's subscription group.
    ///
    /// The cheapest catalog subscription stands in for the group. Returns
    /// `None` without calling the platform when the catalog is empty.
    pub async fn resolve_current_tier(&self) -> EngineResult<Option<ResolvedEntitlement>> {
        let snapshot = self.store.snapshot();
        let Some(candidate) = snapshot.catalog.first() else {
            return Ok(None);
        };
        self.resolve_for(candidate).await
    }

    /// Resolves the current subscription for the group `candidate` belongs to
    /// and records its renewal state in the store.
    pub async fn resolve_for(
        &self,
        candidate: &Product,
    ) -> EngineResult<Option<ResolvedEntitlement>> {
        let statuses = self
            .bounded("status fetch", self.platform.subscription_statuses(candidate))
            .await
            .inspect_err(|e| warn!("Could not update subscription status: {}", e))?;

        let known = self.store.snapshot();
        let resolved = resolve(&statuses, &known.catalog);
        match &resolved {
            Some(r) => info!("Current subscription: {} ({:?})", r.product.id, r.status.state),
            None => info!("No current subscription"),
        }

        self.store
            .set_group_renewal_state(resolved.as_ref().map(|r| r.status.state))
            .await;
        Ok(resolved)
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Returns the purchased products.
    pub fn current_purchased_products(&self) -> Vec<Product> {
        self.store.snapshot().purchased.clone()
    }

    /// Returns the renewal state of the last resolved subscription.
    pub fn group_renewal_state(&self) -> Option<RenewalState> {
        self.store.snapshot().group_renewal_state
    }

    /// Returns true if the product is in the purchased set.
    pub fn is_purchased(&self, product_id: &str) -> bool {
        self.store.snapshot().is_purchased(product_id)
    }

    /// Returns the tier of a product identifier.
    pub fn tier_of(&self, product_id: &str) -> SubscriptionTier {
        SubscriptionTier::for_product_id(product_id)
    }

    /// Returns the display glyph for a product, if mapped.
    pub fn emoji_for(&self, product_id: &str) -> Option<&str> {
        self.glyphs.get(product_id)
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<EntitlementSnapshot> {
        self.store.snapshot()
    }

    /// Subscribes to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<EntitlementSnapshot>> {
        self.store.subscribe()
    }
}
