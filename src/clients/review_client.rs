use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{stars_in_range, OrderStatus, ProviderRating, Review, ReviewCreate, ReviewPatch};
use crate::error::{MarketError, Result};
use crate::ports::{OrderReader, Ratings};

/// Provider averages computed straight from the review store.
///
/// Holds only the store handle, so the posting service can consume ratings
/// before the review service (which needs orders) is wired.
#[derive(Clone)]
pub struct ProviderRatings {
    reviews: ResourceClient<Review>,
}

impl ProviderRatings {
    pub fn new(reviews: ResourceClient<Review>) -> Self {
        Self { reviews }
    }
}

#[async_trait]
impl Ratings for ProviderRatings {
    /// `(0.0, 0)` for a provider nobody has reviewed yet.
    async fn avg_for_provider(&self, provider_id: &str) -> Result<ProviderRating> {
        let provider = provider_id.to_string();
        let reviews = self
            .reviews
            .list(move |r: &Review| r.provider_id == provider)
            .await?;
        if reviews.is_empty() {
            return Ok(ProviderRating::default());
        }
        let total: u32 = reviews.iter().map(|r| u32::from(r.stars)).sum();
        Ok(ProviderRating {
            average: f64::from(total) / reviews.len() as f64,
            count: reviews.len(),
        })
    }
}

/// Review service: eligibility, one review per order and the edit window.
#[derive(Clone)]
pub struct ReviewClient {
    inner: ResourceClient<Review>,
    ratings: ProviderRatings,
    orders: Arc<dyn OrderReader>,
    clock: Arc<dyn Clock>,
    edit_window: Duration,
}

impl_client_methods!(ReviewClient, Review, review);

impl ReviewClient {
    pub fn new(
        inner: ResourceClient<Review>,
        orders: Arc<dyn OrderReader>,
        clock: Arc<dyn Clock>,
        edit_window: Duration,
    ) -> Self {
        Self {
            ratings: ProviderRatings::new(inner.clone()),
            inner,
            orders,
            clock,
            edit_window,
        }
    }

    /// Reviews a completed order on behalf of its client.
    ///
    /// # Errors
    /// Checked in this order: `InvalidFields` for stars outside 1..=5, the order
    /// lookup's own error, `OrderNotDone` unless the order is `COMPLETED`,
    /// `Forbidden` for anyone but the order's client, `AlreadyExists` for a
    /// second review of the same order.
    #[instrument(skip(self, comment))]
    pub async fn create(
        &self,
        client_id: &str,
        order_id: &str,
        stars: i64,
        comment: &str,
    ) -> Result<Review> {
        if !stars_in_range(stars) {
            return Err(MarketError::InvalidFields(format!(
                "stars must be between 1 and 5, got {stars}"
            )));
        }

        let order = self.orders.order_by_id(order_id).await?;
        if order.status != OrderStatus::Completed {
            debug!(status = %order.status, "Order not reviewable yet");
            return Err(MarketError::OrderNotDone);
        }
        if order.client_id != client_id {
            return Err(MarketError::Forbidden(format!(
                "order {order_id} belongs to another client"
            )));
        }

        let params = ReviewCreate {
            order_id: order.id,
            client_id: client_id.to_string(),
            provider_id: order.provider_id,
            stars,
            comment: comment.to_string(),
            at: self.clock.utc(),
        };
        let id = self.inner.create(params).await?;
        info!(order_id = %id, stars, "Review created");
        self.fetch_review(&id).await
    }

    /// Rewrites stars and comment while the edit window is open.
    #[instrument(skip(self, comment))]
    pub async fn edit(
        &self,
        client_id: &str,
        order_id: &str,
        stars: i64,
        comment: &str,
    ) -> Result<Review> {
        let patch = ReviewPatch {
            client_id: client_id.to_string(),
            stars,
            comment: comment.to_string(),
            at: self.clock.utc(),
            edit_window: self.edit_window,
        };
        let review = self.inner.update(order_id.to_string(), patch).await?;
        info!(stars = review.stars, "Review edited");
        Ok(review)
    }

    pub async fn get_review(&self, order_id: &str) -> Result<Review> {
        self.fetch_review(order_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_for_provider(&self, provider_id: &str) -> Result<Vec<Review>> {
        let provider = provider_id.to_string();
        self.inner
            .list(move |r: &Review| r.provider_id == provider)
            .await
    }

    pub async fn avg_for_provider(&self, provider_id: &str) -> Result<ProviderRating> {
        self.ratings.avg_for_provider(provider_id).await
    }
}
