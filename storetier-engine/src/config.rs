//! Engine configuration.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storetier_types::{IDEA_PRODUCT_ID, VISUAL_PRODUCT_ID};

/// Default bound on every platform call (ms).
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// Configuration for the entitlement engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Product identifiers requested from the catalog.
    pub product_ids: BTreeSet<String>,
    /// Timeout for platform fetches (ms).
    pub fetch_timeout_ms: u64,
    /// JSON file mapping product identifiers to display glyphs.
    pub glyph_map_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            product_ids: [IDEA_PRODUCT_ID, VISUAL_PRODUCT_ID]
                .into_iter()
                .map(String::from)
                .collect(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            glyph_map_path: None,
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config file. Missing keys fall back to defaults.
    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> EngineResult<()> {
        if self.fetch_timeout_ms == 0 {
            return Err(EngineError::Config("fetchTimeoutMs must be positive".to_string()));
        }
        if self.product_ids.is_empty() {
            return Err(EngineError::Config("productIds must not be empty".to_string()));
        }
        Ok(())
    }

    /// Returns the fetch timeout as a `Duration`.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
