//! Transaction and renewal records delivered by the commerce platform.

use crate::product::ProductType;
use crate::verification::VerificationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform-assigned transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Wraps a raw platform identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A purchase or renewal transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// This transaction's identifier.
    pub id: TransactionId,
    /// Identifier of the first purchase in the renewal chain.
    pub original_id: TransactionId,
    /// The product this transaction grants.
    pub product_id: String,
    /// Kind of product purchased.
    pub product_type: ProductType,
    /// When the platform charged the user.
    pub purchase_date: DateTime<Utc>,
    /// Set when the platform refunded or revoked the transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_date: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    /// Creates a first-purchase record for an auto-renewable subscription.
    pub fn subscription(
        id: u64,
        product_id: impl Into<String>,
        purchase_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(id),
            original_id: TransactionId::new(id),
            product_id: product_id.into(),
            product_type: ProductType::AutoRenewable,
            purchase_date,
            revocation_date: None,
        }
    }

    /// Sets the product type.
    #[must_use]
    pub fn with_product_type(mut self, product_type: ProductType) -> Self {
        self.product_type = product_type;
        self
    }

    /// Returns true for auto-renewable subscription transactions.
    #[must_use]
    pub fn is_auto_renewable(&self) -> bool {
        self.product_type == ProductType::AutoRenewable
    }
}

/// Platform-reported state of an auto-renewing subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenewalState {
    /// Active and renewing.
    Subscribed,
    /// Lapsed.
    Expired,
    /// Renewal charge failed; the platform is retrying.
    InBillingRetry,
    /// Renewal charge failed; service continues during the grace window.
    InGracePeriod,
    /// Refunded or revoked (e.g. removed from family sharing).
    Revoked,
}

impl RenewalState {
    /// Returns true for states that can never count as a current subscription.
    #[must_use]
    pub fn is_excluded(&self) -> bool {
        matches!(self, Self::Expired | Self::Revoked)
    }
}

/// Signed renewal information for one subscription in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalInfo {
    /// The product the subscription currently grants.
    pub current_product_id: String,
    /// Whether the subscription is set to renew.
    #[serde(default = "default_will_auto_renew")]
    pub will_auto_renew: bool,
}

fn default_will_auto_renew() -> bool {
    true
}

impl RenewalInfo {
    /// Creates renewal info for a product that will auto-renew.
    pub fn new(current_product_id: impl Into<String>) -> Self {
        Self {
            current_product_id: current_product_id.into(),
            will_auto_renew: true,
        }
    }
}

/// One entry of a subscription group's status list.
///
/// A group can report several statuses at once, e.g. the user's own
/// subscription plus one shared through family sharing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    /// Renewal state of this entitlement.
    pub state: RenewalState,
    /// Signed renewal information.
    pub renewal_info: VerificationResult<RenewalInfo>,
}

impl StatusRecord {
    /// Creates a status with verified renewal info pointing at `product_id`.
    pub fn verified(state: RenewalState, product_id: impl Into<String>) -> Self {
        Self {
            state,
            renewal_info: VerificationResult::Verified(RenewalInfo::new(product_id)),
        }
    }

    /// Creates a status whose renewal info failed verification.
    #[must_use]
    pub fn unverified(state: RenewalState) -> Self {
        Self {
            state,
            renewal_info: VerificationResult::Unverified,
        }
    }
}
