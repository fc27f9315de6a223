//! Capability ports.
//!
//! Narrow read interfaces one service exposes so another can consume it without
//! holding the full client, plus the sinks and capabilities the services are
//! built with. Production implementations live in this crate.

pub mod hasher;
pub mod observer;

use async_trait::async_trait;

use crate::domain::{Order, ProviderRating};
use crate::error::Result;

pub use hasher::{PasswordHasher, Sha256Hasher};
pub use observer::{BroadcastObserver, LifecycleObserver, LoggingObserver};

/// Display names of providers, consumed by the posting service.
///
/// Implemented by [`crate::clients::UserClient`].
#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    /// Fails with `NotFound` for an unknown id.
    async fn name_by_id(&self, provider_id: &str) -> Result<String>;
}

/// Aggregated review scores, consumed by the posting service.
///
/// Implemented by [`crate::clients::ProviderRatings`].
#[async_trait]
pub trait Ratings: Send + Sync {
    async fn avg_for_provider(&self, provider_id: &str) -> Result<ProviderRating>;
}

/// Read access to orders, consumed by the review service.
///
/// Implemented by [`crate::clients::OrderClient`].
#[async_trait]
pub trait OrderReader: Send + Sync {
    /// Fails with `NotFound` for an unknown id.
    async fn order_by_id(&self, order_id: &str) -> Result<Order>;
}

/// Checks an order request against the live postings, consumed by the order service.
///
/// Implemented by [`crate::clients::PostingClient`].
#[async_trait]
pub trait PostingCatalog: Send + Sync {
    /// True when the posting exists, is not archived and belongs to `provider_id`.
    async fn is_offered_by(&self, posting_id: &str, provider_id: &str) -> Result<bool>;
}
