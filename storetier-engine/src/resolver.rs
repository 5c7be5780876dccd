//! Picks the single current subscription out of a group's statuses.
//!
//! Family sharing and multiple devices can leave several statuses valid at
//! once. Only the highest tier is surfaced; expired and revoked statuses
//! never win regardless of tier.

use storetier_types::{Product, ResolvedEntitlement, StatusRecord};
use storetier_verify::verify;
use tracing::debug;

/// Resolves the highest-tier active entitlement.
///
/// Single pass over `statuses`. A status is skipped when its state is
/// excluded, its renewal info fails verification, or its current product is
/// not in `known_products`. The first surviving status wins; later ones
/// replace it only with a strictly higher tier, so ties keep the first seen.
///
/// The group's candidate product is not an input here: it only selects which
/// group's statuses are fetched (see `EntitlementEngine::resolve_for`).
#[must_use]
pub fn resolve(
    statuses: &[StatusRecord],
    known_products: &[Product],
) -> Option<ResolvedEntitlement> {
    if known_products.is_empty() {
        return None;
    }

    let mut winner: Option<ResolvedEntitlement> = None;

    for status in statuses {
        if status.state.is_excluded() {
            continue;
        }

        let renewal_info = match verify(status.renewal_info.clone()) {
            Ok(info) => info,
            Err(e) => {
                debug!("Skipping {:?} status: {}", status.state, e);
                continue;
            }
        };

        let Some(product) = known_products
            .iter()
            .find(|p| p.id == renewal_info.current_product_id)
        else {
            debug!("Status refers to unknown product {}", renewal_info.current_product_id);
            continue;
        };

        let replaces = match &winner {
            None => true,
            Some(current) => product.tier() > current.product.tier(),
        };
        if replaces {
            winner = Some(ResolvedEntitlement {
                product: product.clone(),
                status: status.clone(),
            });
        }
    }

    winner
}
