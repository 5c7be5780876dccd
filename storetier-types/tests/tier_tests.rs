use proptest::prelude::*;
use storetier_types::{Price, Product, SubscriptionTier, IDEA_PRODUCT_ID, VISUAL_PRODUCT_ID};

// ── Ordering ─────────────────────────────────────────────────────

#[test]
fn tiers_ascend_by_level_of_service() {
    assert!(SubscriptionTier::None < SubscriptionTier::Idea);
    assert!(SubscriptionTier::Idea < SubscriptionTier::Visual);
    assert!(SubscriptionTier::None < SubscriptionTier::Visual);
}

#[test]
fn levels_match_declaration() {
    assert_eq!(SubscriptionTier::None.level(), 0);
    assert_eq!(SubscriptionTier::Idea.level(), 1);
    assert_eq!(SubscriptionTier::Visual.level(), 2);
}

#[test]
fn max_picks_highest_tier() {
    let tiers = [SubscriptionTier::Idea, SubscriptionTier::None, SubscriptionTier::Visual];
    assert_eq!(tiers.iter().max(), Some(&SubscriptionTier::Visual));
}

// ── Mapping ──────────────────────────────────────────────────────

#[test]
fn known_ids_map_to_tiers() {
    assert_eq!(SubscriptionTier::for_product_id(IDEA_PRODUCT_ID), SubscriptionTier::Idea);
    assert_eq!(SubscriptionTier::for_product_id(VISUAL_PRODUCT_ID), SubscriptionTier::Visual);
}

#[test]
fn lookup_is_case_sensitive() {
    assert_eq!(SubscriptionTier::for_product_id("Visual"), SubscriptionTier::None);
}

#[test]
fn product_tier_follows_id() {
    let product = Product::subscription("visual", "Visual", Price::from_minor_units(499));
    assert_eq!(product.tier(), SubscriptionTier::Visual);
}

#[test]
fn none_is_not_entitled() {
    assert!(!SubscriptionTier::None.is_entitled());
    assert!(SubscriptionTier::Idea.is_entitled());
    assert!(SubscriptionTier::Visual.is_entitled());
}

#[test]
fn default_is_none() {
    assert_eq!(SubscriptionTier::default(), SubscriptionTier::None);
}

#[test]
fn display_names() {
    assert_eq!(SubscriptionTier::Idea.to_string(), "Idea");
    assert_eq!(SubscriptionTier::None.to_string(), "None");
}

#[test]
fn tier_serde() {
    let json = serde_json::to_string(&SubscriptionTier::Visual).unwrap();
    assert_eq!(json, r#""visual""#);
    let parsed: SubscriptionTier = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, SubscriptionTier::Visual);
}

proptest! {
    #[test]
    fn unknown_ids_map_to_none(id in "[a-z._]{0,24}") {
        prop_assume!(id != IDEA_PRODUCT_ID && id != VISUAL_PRODUCT_ID);
        prop_assert_eq!(SubscriptionTier::for_product_id(&id), SubscriptionTier::None);
    }
}
