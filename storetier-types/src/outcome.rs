//! Results handed back to callers: purchase outcomes and resolved entitlements.

use crate::product::Product;
use crate::record::{StatusRecord, TransactionRecord};
use crate::tier::SubscriptionTier;
use crate::verification::VerificationResult;
use serde::{Deserialize, Serialize};

/// Outcome of a purchase attempt on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PurchaseOutcome {
    /// The purchase completed; the transaction still needs verification.
    Success(VerificationResult<TransactionRecord>),
    /// The user dismissed the purchase sheet.
    UserCancelled,
    /// The purchase awaits approval (e.g. Ask to Buy).
    Pending,
    /// The platform rejected the purchase.
    OtherFailure(String),
}

/// The single current subscription selected from a group's statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntitlement {
    /// The winning catalog product.
    pub product: Product,
    /// The status record that produced the win.
    pub status: StatusRecord,
}

impl ResolvedEntitlement {
    /// Returns the tier of the winning product.
    #[must_use]
    pub fn tier(&self) -> SubscriptionTier {
        self.product.tier()
    }
}
