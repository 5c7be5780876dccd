mod common;

use common::{test_keypair, tx};
use futures::StreamExt;
use storetier_engine::{
    CommercePlatform, EngineError, FixtureRecord, FixtureStatus, PlatformFixture,
};
use storetier_types::{RenewalInfo, RenewalState, VerificationResult};
use storetier_verify::seal;

const PLAIN_FIXTURE: &str = r#"{
    "catalog": [
        {"id": "visual", "displayName": "Visual", "price": 200, "productType": "autoRenewable"},
        {"id": "idea", "displayName": "Idea", "price": 100, "productType": "autoRenewable"}
    ],
    "entitlements": [
        {"verified": {"id": 1, "originalId": 1, "productId": "idea",
                      "productType": "autoRenewable", "purchaseDate": "2024-06-01T08:00:00Z"}},
        "unverified"
    ],
    "statuses": [
        {"state": "subscribed", "renewalInfo": {"verified": {"currentProductId": "idea"}}}
    ]
}"#;

#[tokio::test]
async fn plain_fixture_builds_platform() {
    let fixture = PlatformFixture::from_json_str(PLAIN_FIXTURE).unwrap();
    assert_eq!(fixture.catalog.len(), 2);
    let platform = fixture.into_platform().unwrap();

    let entitlements: Vec<_> = platform.current_entitlements().await.unwrap().collect().await;
    assert_eq!(entitlements.len(), 2);
    assert!(entitlements[0].is_verified());
    assert_eq!(entitlements[1], VerificationResult::Unverified);
}

#[tokio::test]
async fn signed_records_are_opened_with_fixture_key() {
    let (sk, key) = test_keypair();
    let other_sk = ed25519_dalek::SigningKey::from_bytes(&[9u8; 32]);

    let fixture = PlatformFixture {
        public_key: Some(key.to_base64()),
        entitlements: vec![
            FixtureRecord::Signed(seal(&sk, &tx(1, "visual")).unwrap()),
            FixtureRecord::Signed(seal(&other_sk, &tx(2, "idea")).unwrap()),
        ],
        statuses: vec![FixtureStatus {
            state: RenewalState::InGracePeriod,
            renewal_info: FixtureRecord::Signed(seal(&sk, &RenewalInfo::new("visual")).unwrap()),
        }],
        ..Default::default()
    };
    let json = serde_json::to_string(&fixture).unwrap();
    let platform = PlatformFixture::from_json_str(&json).unwrap().into_platform().unwrap();

    let entitlements: Vec<_> = platform.current_entitlements().await.unwrap().collect().await;
    assert_eq!(entitlements[0], VerificationResult::Verified(tx(1, "visual")));
    assert_eq!(entitlements[1], VerificationResult::Unverified);

    let group = storetier_types::Product::subscription(
        "visual",
        "Visual",
        storetier_types::Price::from_minor_units(200),
    );
    let statuses = platform.subscription_statuses(&group).await.unwrap();
    assert_eq!(
        statuses[0].renewal_info,
        VerificationResult::Verified(RenewalInfo::new("visual"))
    );
}

#[test]
fn signed_record_without_key_is_a_config_error() {
    let fixture = PlatformFixture {
        entitlements: vec![FixtureRecord::Signed("abc.def".to_string())],
        ..Default::default()
    };
    assert!(matches!(fixture.into_platform(), Err(EngineError::Config(_))));
}

#[test]
fn bad_public_key_is_a_config_error() {
    let fixture = PlatformFixture {
        public_key: Some("short".to_string()),
        ..Default::default()
    };
    assert!(matches!(fixture.into_platform(), Err(EngineError::Config(_))));
}

#[test]
fn malformed_fixture_is_a_serialization_error() {
    assert!(matches!(
        PlatformFixture::from_json_str("{\"catalog\": 3}"),
        Err(EngineError::Serialization(_))
    ));
}

#[tokio::test]
async fn fixture_updates_wait_for_first_subscriber() {
    let fixture = PlatformFixture {
        updates: vec![FixtureRecord::Plain(VerificationResult::Verified(tx(5, "idea")))],
        ..Default::default()
    };
    let platform = fixture.into_platform().unwrap();
    let mut updates = platform.transaction_updates();
    platform.close_updates();
    assert_eq!(updates.next().await, Some(VerificationResult::Verified(tx(5, "idea"))));
    assert_eq!(updates.next().await, None);
}
