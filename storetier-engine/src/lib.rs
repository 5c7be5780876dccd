//! Entitlement reconciliation engine for storetier.
//!
//! Turns a stream of signed platform records into the single subscription
//! tier a user is currently entitled to.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Store**: Immutable entitlement snapshots (catalog, purchased products,
//!   group renewal state) published through a watch channel
//! - **Resolver**: Collapses a subscription group's statuses into the single
//!   highest-tier current subscription
//! - **Platform**: The commerce platform seam, plus an in-memory implementation
//! - **Listener**: Background task that reacts to live transaction updates
//! - **Engine**: Facade tying the above together for callers
//!
//! ## Update Flow
//!
//! 1. **Receive**: The listener takes the next record from the update stream
//! 2. **Verify**: Unverified records are dropped
//! 3. **Recompute**: The purchased set is rebuilt from the platform's current
//!    entitlements, never patched
//! 4. **Acknowledge**: The incoming transaction is finished on the platform
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use storetier_engine::{EngineConfig, EntitlementEngine, InMemoryPlatform};
//!
//! let platform = Arc::new(InMemoryPlatform::new());
//! let engine = EntitlementEngine::new(platform, EngineConfig::default());
//! assert!(engine.current_purchased_products().is_empty());
//! ```

mod config;
mod engine;
mod error;
pub mod glyphs;
pub mod listener;
pub mod memory;
pub mod platform;
pub mod resolver;
pub mod store;

pub use config::{EngineConfig, DEFAULT_FETCH_TIMEOUT_MS};
pub use engine::EntitlementEngine;
pub use error::{EngineError, EngineResult, PlatformError, PlatformResult};
pub use glyphs::GlyphMap;
pub use listener::{ListenerStats, UpdateListener};
pub use memory::{FixtureRecord, FixtureStatus, InMemoryPlatform, Operation, PlatformFixture};
pub use platform::{CommercePlatform, RecordStream};
pub use resolver::resolve;
pub use store::{catalog_subscriptions, EntitlementSnapshot, EntitlementStore};
