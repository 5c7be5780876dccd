//! Subscription tiers, ordered by level of service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Product identifier of the Idea subscription.
pub const IDEA_PRODUCT_ID: &str = "idea";

/// Product identifier of the Visual subscription.
pub const VISUAL_PRODUCT_ID: &str = "visual";

/// Subscription tiers in ascending order of service.
///
/// The derived `Ord` follows declaration order, so `None < Idea < Visual`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    /// No entitlement.
    #[default]
    None = 0,
    /// Idea tier.
    Idea = 1,
    /// Visual tier.
    Visual = 2,
}

impl SubscriptionTier {
    /// Maps a product identifier to its tier. Unknown identifiers map to `None`.
    #[must_use]
    pub fn for_product_id(product_id: &str) -> Self {
        match product_id {
            IDEA_PRODUCT_ID => Self::Idea,
            VISUAL_PRODUCT_ID => Self::Visual,
            _ => Self::None,
        }
    }

    /// Returns the numeric level of service.
    #[must_use]
    pub fn level(&self) -> u8 {
        *self as u8
    }

    /// Returns true if this tier grants any service at all.
    #[must_use]
    pub fn is_entitled(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns the display name for this tier.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Idea => "Idea",
            Self::Visual => "Visual",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
