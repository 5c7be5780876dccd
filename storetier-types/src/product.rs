//! Catalog products as supplied by the commerce platform.

use crate::tier::SubscriptionTier;
use crate::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A price in minor currency units (cents).
///
/// Prices only need to be ordered for catalog sorting, so the currency itself
/// is not tracked. Serialized as minor units; deserialized from either minor
/// units (`299`) or a display string (`"2.99"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Creates a price from minor units.
    #[must_use]
    pub const fn from_minor_units(units: u64) -> Self {
        Self(units)
    }

    /// Returns the price in minor units.
    #[must_use]
    pub const fn minor_units(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Minor(u64),
            Display(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Minor(units) => Ok(Self(units)),
            Raw::Display(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl FromStr for Price {
    type Err = Error;

    /// Parses a decimal display price such as `"2.99"` or `"3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || Error::InvalidPrice(s.to_string());

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole.is_empty() || frac.len() > 2 {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let cents: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(cents))
            .map(Self)
            .ok_or_else(invalid)
    }
}

/// The kind of product, as classified by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductType {
    /// Auto-renewable subscription.
    AutoRenewable,
    /// Non-renewing subscription.
    NonRenewable,
    /// Consumable one-off purchase.
    Consumable,
    /// Non-consumable one-off purchase.
    NonConsumable,
}

/// A purchasable product from the platform catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier, unique within the catalog.
    pub id: String,
    /// Localized display name.
    pub display_name: String,
    /// Localized description.
    #[serde(default)]
    pub description: String,
    /// Price in minor units.
    pub price: Price,
    /// Product kind.
    pub product_type: ProductType,
    /// Subscription group the product belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_group: Option<String>,
}

impl Product {
    /// Creates an auto-renewable subscription product.
    pub fn subscription(
        id: impl Into<String>,
        display_name: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: String::new(),
            price,
            product_type: ProductType::AutoRenewable,
            subscription_group: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the product type.
    #[must_use]
    pub fn with_product_type(mut self, product_type: ProductType) -> Self {
        self.product_type = product_type;
        self
    }

    /// Sets the subscription group.
    #[must_use]
    pub fn with_subscription_group(mut self, group: impl Into<String>) -> Self {
        self.subscription_group = Some(group.into());
        self
    }

    /// Returns true for auto-renewable subscriptions.
    #[must_use]
    pub fn is_auto_renewable(&self) -> bool {
        self.product_type == ProductType::AutoRenewable
    }

    /// Returns the service tier this product grants.
    #[must_use]
    pub fn tier(&self) -> SubscriptionTier {
        SubscriptionTier::for_product_id(&self.id)
    }
}
