//! Display glyphs for catalog products.
//!
//! Loaded once at startup from a JSON object such as
//! `{"idea": "💡", "visual": "🎨"}`. A missing or unreadable file gives an
//! empty map; lookups for unmapped products return `None`.

use crate::error::{EngineError, EngineResult};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Product identifier to display glyph mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphMap {
    glyphs: HashMap<String, String>,
}

impl GlyphMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object of string to string.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let glyphs: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { glyphs })
    }

    /// Loads the map from `path`, falling back to an empty map.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No glyph map at {}", path.display());
                return Self::new();
            }
            Err(e) => {
                warn!("Failed to read glyph map {}: {}", path.display(), e);
                return Self::new();
            }
        };

        match Self::from_json_str(&raw) {
            Ok(map) => {
                debug!("Loaded {} glyphs from {}", map.len(), path.display());
                map
            }
            Err(e) => {
                warn!("Ignoring malformed glyph map {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Returns the glyph for a product, if mapped.
    #[must_use]
    pub fn get(&self, product_id: &str) -> Option<&str> {
        self.glyphs.get(product_id).map(String::as_str)
    }

    /// Returns the glyph for a product or an `UnmappedProduct` error.
    pub fn require(&self, product_id: &str) -> EngineResult<&str> {
        self.get(product_id)
            .ok_or_else(|| EngineError::UnmappedProduct(product_id.to_string()))
    }

    /// Number of mapped products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns true if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GlyphMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            glyphs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
