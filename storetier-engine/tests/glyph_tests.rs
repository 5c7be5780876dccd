use std::io::Write;
use storetier_engine::{EngineConfig, EngineError, EntitlementEngine, GlyphMap, InMemoryPlatform};

#[test]
fn missing_file_gives_empty_map() {
    let dir = tempfile::tempdir().unwrap();
    let map = GlyphMap::load(&dir.path().join("Projects.json"));
    assert!(map.is_empty());
}

#[test]
fn malformed_file_gives_empty_map() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[1, 2, 3]").unwrap();
    let map = GlyphMap::load(file.path());
    assert!(map.is_empty());
}

#[test]
fn valid_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"idea": "💡", "visual": "🎨"}}"#).unwrap();
    let map = GlyphMap::load(file.path());
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("visual"), Some("🎨"));
}

#[test]
fn unmapped_lookup_is_absent() {
    let map: GlyphMap = [("idea", "💡")].into_iter().collect();
    assert_eq!(map.get("visual"), None);
}

#[test]
fn require_reports_unmapped_product() {
    let map = GlyphMap::new();
    let err = map.require("visual").unwrap_err();
    assert!(matches!(&err, EngineError::UnmappedProduct(id) if id == "visual"));
    assert!(format!("{err}").contains("visual"));
}

#[test]
fn engine_loads_glyphs_from_config_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"idea": "💡"}}"#).unwrap();
    let config = EngineConfig {
        glyph_map_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let engine = EntitlementEngine::new(std::sync::Arc::new(InMemoryPlatform::new()), config);
    assert_eq!(engine.emoji_for("idea"), Some("💡"));
    assert_eq!(engine.emoji_for("visual"), None);
}

#[test]
fn engine_with_missing_glyph_file_still_starts() {
    let config = EngineConfig {
        glyph_map_path: Some("/nonexistent/glyphs.json".into()),
        ..Default::default()
    };
    let engine = EntitlementEngine::new(std::sync::Arc::new(InMemoryPlatform::new()), config);
    assert_eq!(engine.emoji_for("idea"), None);
}
