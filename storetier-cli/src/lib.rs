//! Loading and reporting helpers for the `storetier` binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use storetier_engine::{
    CommercePlatform, EngineConfig, EntitlementEngine, InMemoryPlatform, PlatformFixture,
};
use storetier_types::{RenewalState, SubscriptionTier};
use tracing::{info, warn};

/// Loads engine configuration, falling back to defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            info!("Loading config from {:?}", path);
            EngineConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Reads a JSON platform fixture and builds the in-memory platform from it.
pub fn load_fixture(path: &Path) -> Result<InMemoryPlatform> {
    info!("Loading platform fixture from {:?}", path);
    let raw = std::fs::read_to_string(path).context("Failed to read fixture file")?;
    PlatformFixture::from_json_str(&raw)
        .and_then(PlatformFixture::into_platform)
        .context("Failed to build platform from fixture")
}

/// The winning subscription as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSubscription {
    pub product_id: String,
    pub display_name: String,
    pub glyph: Option<String>,
    pub state: RenewalState,
}

/// One catalog line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogLine {
    pub product_id: String,
    pub display_name: String,
    pub price: String,
    pub tier: SubscriptionTier,
    pub purchased: bool,
}

/// Entitlement summary after a full refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub tier: SubscriptionTier,
    pub current: Option<CurrentSubscription>,
    pub purchased: Vec<String>,
    pub catalog: Vec<CatalogLine>,
}

impl Report {
    /// Refreshes catalog, purchased set and current subscription, then
    /// summarizes the engine state. Refresh failures are logged and the
    /// report reflects whatever state survived.
    pub async fn collect<P: CommercePlatform>(engine: &EntitlementEngine<P>) -> Self {
        if let Err(e) = engine.refresh_catalog().await {
            warn!("Catalog refresh failed: {}", e);
        }
        if let Err(e) = engine.update_customer_product_status().await {
            warn!("Entitlement refresh failed: {}", e);
        }
        let resolved = match engine.resolve_current_tier().await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Subscription status refresh failed: {}", e);
                None
            }
        };

        let snapshot = engine.snapshot();
        let current = resolved.map(|r| CurrentSubscription {
            glyph: engine.emoji_for(&r.product.id).map(String::from),
            product_id: r.product.id,
            display_name: r.product.display_name,
            state: r.status.state,
        });
        let tier = current
            .as_ref()
            .map(|c| engine.tier_of(&c.product_id))
            .unwrap_or_default();

        Self {
            tier,
            current,
            purchased: snapshot.purchased.iter().map(|p| p.id.clone()).collect(),
            catalog: snapshot
                .catalog
                .iter()
                .map(|p| CatalogLine {
                    product_id: p.id.clone(),
                    display_name: p.display_name.clone(),
                    price: p.price.to_string(),
                    tier: p.tier(),
                    purchased: snapshot.is_purchased(&p.id),
                })
                .collect(),
        }
    }

    /// Renders the report as plain text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Tier: {}", self.tier);
        match &self.current {
            Some(current) => {
                let glyph = current.glyph.as_deref().map(|g| format!("{g} ")).unwrap_or_default();
                let _ = writeln!(
                    out,
                    "My Subscription: {glyph}{} ({:?})",
                    current.display_name, current.state
                );
            }
            None => {
                let _ = writeln!(out, "My Subscription: none");
            }
        }
        let _ = writeln!(out, "Catalog:");
        for line in &self.catalog {
            let marker = if line.purchased { "*" } else { " " };
            let _ = writeln!(
                out,
                " {marker} {:<12} {:>8}  {}",
                line.display_name, line.price, line.tier
            );
        }
        out
    }
}
