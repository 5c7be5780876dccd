//! In-memory commerce platform.
//!
//! Serves a fixed catalog, entitlement snapshot and status list, and feeds
//! live updates pushed by the caller. Used by tests and by the CLI, which
//! builds it from a JSON [`PlatformFixture`].

use crate::error::{EngineError, EngineResult, PlatformError, PlatformResult};
use crate::platform::{CommercePlatform, RecordStream};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use storetier_types::{
    Product, PurchaseOutcome, RenewalInfo, RenewalState, StatusRecord, TransactionId,
    TransactionRecord, VerificationResult,
};
use storetier_verify::{open, EnvelopeKey};
use tokio::sync::mpsc;
use tracing::debug;

/// Platform calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `fetch_catalog`.
    FetchCatalog,
    /// `current_entitlements`.
    CurrentEntitlements,
    /// `subscription_statuses`.
    SubscriptionStatuses,
    /// `purchase`.
    Purchase,
    /// `acknowledge`.
    Acknowledge,
    /// `sync` (restore purchases).
    Sync,
}

#[derive(Default)]
struct State {
    catalog: Vec<Product>,
    entitlements: Vec<VerificationResult<TransactionRecord>>,
    statuses: Vec<StatusRecord>,
    purchase_outcomes: HashMap<String, PurchaseOutcome>,
    acknowledged: Vec<TransactionId>,
    failing: HashSet<Operation>,
    latency: Option<Duration>,
    sync_count: usize,
    pending_updates: Vec<VerificationResult<TransactionRecord>>,
    subscribers: Vec<mpsc::UnboundedSender<VerificationResult<TransactionRecord>>>,
}

/// A commerce platform backed by in-process state.
#[derive(Default)]
pub struct InMemoryPlatform {
    state: Mutex<State>,
}

impl InMemoryPlatform {
    /// Creates an empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replaces the catalog.
    pub fn set_catalog(&self, products: Vec<Product>) {
        self.state().catalog = products;
    }

    /// Replaces the current-entitlements snapshot.
    pub fn set_entitlements(&self, records: Vec<VerificationResult<TransactionRecord>>) {
        self.state().entitlements = records;
    }

    /// Replaces the subscription group statuses.
    pub fn set_statuses(&self, statuses: Vec<StatusRecord>) {
        self.state().statuses = statuses;
    }

    /// Sets what purchasing `product_id` returns. Unset products report
    /// `OtherFailure`.
    pub fn set_purchase_outcome(&self, product_id: impl Into<String>, outcome: PurchaseOutcome) {
        self.state().purchase_outcomes.insert(product_id.into(), outcome);
    }

    /// Makes `operation` fail with `PlatformError::Unavailable` until cleared.
    pub fn fail(&self, operation: Operation) {
        self.state().failing.insert(operation);
    }

    /// Lets `operation` succeed again.
    pub fn recover(&self, operation: Operation) {
        self.state().failing.remove(&operation);
    }

    /// Delays every async call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state().latency = latency;
    }

    /// Delivers a live update to every subscriber, or holds it until the
    /// first subscription if nobody is listening yet.
    pub fn push_update(&self, record: VerificationResult<TransactionRecord>) {
        let mut state = self.state();
        state.subscribers.retain(|tx| !tx.is_closed());
        if state.subscribers.is_empty() {
            state.pending_updates.push(record);
            return;
        }
        for tx in &state.subscribers {
            // A receiver dropped since the retain above; it is pruned next push.
            let _ = tx.send(record.clone());
        }
    }

    /// Ends every live update stream.
    pub fn close_updates(&self) {
        self.state().subscribers.clear();
    }

    /// Transactions acknowledged so far, in order.
    #[must_use]
    pub fn acknowledged(&self) -> Vec<TransactionId> {
        self.state().acknowledged.clone()
    }

    /// Number of `sync` calls served.
    #[must_use]
    pub fn sync_count(&self) -> usize {
        self.state().sync_count
    }

    async fn enter(&self, operation: Operation) -> PlatformResult<()> {
        let latency = self.state().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.state().failing.contains(&operation) {
            return Err(PlatformError::Unavailable(format!("{operation:?} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl CommercePlatform for InMemoryPlatform {
    async fn fetch_catalog(&self, product_ids: &BTreeSet<String>) -> PlatformResult<Vec<Product>> {
        self.enter(Operation::FetchCatalog).await?;
        Ok(self
            .state()
            .catalog
            .iter()
            .filter(|p| product_ids.contains(&p.id))
            .cloned()
            .collect())
    }

    fn transaction_updates(&self) -> RecordStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state();
        for record in state.pending_updates.drain(..) {
            let _ = tx.send(record);
        }
        state.subscribers.push(tx);
        stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|record| (record, rx))
        })
        .boxed()
    }

    async fn current_entitlements(&self) -> PlatformResult<RecordStream> {
        self.enter(Operation::CurrentEntitlements).await?;
        let records = self.state().entitlements.clone();
        Ok(stream::iter(records).boxed())
    }

    async fn subscription_statuses(&self, group_of: &Product) -> PlatformResult<Vec<StatusRecord>> {
        self.enter(Operation::SubscriptionStatuses).await?;
        debug!("Serving statuses for group of {}", group_of.id);
        Ok(self.state().statuses.clone())
    }

    async fn purchase(&self, product: &Product) -> PlatformResult<PurchaseOutcome> {
        self.enter(Operation::Purchase).await?;
        let mut state = self.state();
        let outcome = state
            .purchase_outcomes
            .get(&product.id)
            .cloned()
            .unwrap_or_else(|| {
                PurchaseOutcome::OtherFailure(format!("{} is not purchasable", product.id))
            });

        if let PurchaseOutcome::Success(VerificationResult::Verified(transaction)) = &outcome {
            state
                .entitlements
                .push(VerificationResult::Verified(transaction.clone()));
        }
        Ok(outcome)
    }

    async fn acknowledge(&self, transaction: &TransactionRecord) -> PlatformResult<()> {
        self.enter(Operation::Acknowledge).await?;
        self.state().acknowledged.push(transaction.id);
        Ok(())
    }

    async fn sync(&self) -> PlatformResult<()> {
        self.enter(Operation::Sync).await?;
        self.state().sync_count += 1;
        Ok(())
    }
}

/// A record in a fixture: either a plain verification result or a signed
/// envelope opened with the fixture's public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixtureRecord<T> {
    /// `{"verified": {...}}` or `"unverified"`.
    Plain(VerificationResult<T>),
    /// Compact signed envelope.
    Signed(String),
}

impl<T: DeserializeOwned> FixtureRecord<T> {
    fn into_result(self, key: Option<&EnvelopeKey>) -> EngineResult<VerificationResult<T>> {
        match self {
            Self::Plain(result) => Ok(result),
            Self::Signed(compact) => {
                let key = key.ok_or_else(|| {
                    EngineError::Config("signed record in fixture without publicKey".to_string())
                })?;
                Ok(open(&compact, key))
            }
        }
    }
}

/// A subscription status in a fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureStatus {
    /// Renewal state reported for the group.
    pub state: RenewalState,
    /// Renewal info, plain or signed.
    pub renewal_info: FixtureRecord<RenewalInfo>,
}

/// JSON description of an [`InMemoryPlatform`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformFixture {
    /// Base64url Ed25519 key for signed records.
    pub public_key: Option<String>,
    /// Products served by `fetch_catalog`, before filtering by requested id.
    pub catalog: Vec<Product>,
    /// The current-entitlements snapshot.
    pub entitlements: Vec<FixtureRecord<TransactionRecord>>,
    /// Statuses served for every subscription group.
    pub statuses: Vec<FixtureStatus>,
    /// Delivered to the first update subscriber.
    pub updates: Vec<FixtureRecord<TransactionRecord>>,
}

impl PlatformFixture {
    /// Parses a fixture from JSON.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the platform, opening signed records along the way.
    pub fn into_platform(self) -> EngineResult<InMemoryPlatform> {
        let key = self
            .public_key
            .as_deref()
            .map(EnvelopeKey::parse)
            .transpose()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let key = key.as_ref();

        let entitlements = self
            .entitlements
            .into_iter()
            .map(|r| r.into_result(key))
            .collect::<EngineResult<Vec<_>>>()?;
        let statuses = self
            .statuses
            .into_iter()
            .map(|s| {
                Ok(StatusRecord {
                    state: s.state,
                    renewal_info: s.renewal_info.into_result(key)?,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;
        let updates = self
            .updates
            .into_iter()
            .map(|r| r.into_result(key))
            .collect::<EngineResult<Vec<_>>>()?;

        let platform = InMemoryPlatform::new();
        platform.set_catalog(self.catalog);
        platform.set_entitlements(entitlements);
        platform.set_statuses(statuses);
        for update in updates {
            platform.push_update(update);
        }
        Ok(platform)
    }
}
