//! Core type definitions for storetier.
//!
//! This crate defines the data model shared by the verification gate and the
//! entitlement engine:
//! - Catalog products, prices and product types
//! - Subscription tiers derived from product identifiers
//! - Signed transaction and renewal records as delivered by the commerce platform
//! - The verification envelope that wraps every platform record
//!
//! Nothing here performs I/O or holds state.

mod outcome;
mod product;
mod record;
mod tier;
mod verification;

pub use outcome::{PurchaseOutcome, ResolvedEntitlement};
pub use product::{Price, Product, ProductType};
pub use record::{RenewalInfo, RenewalState, StatusRecord, TransactionId, TransactionRecord};
pub use tier::{SubscriptionTier, IDEA_PRODUCT_ID, VISUAL_PRODUCT_ID};
pub use verification::VerificationResult;

/// Errors that can occur when parsing types from platform input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid price: {0}")]
    InvalidPrice(String),
}
