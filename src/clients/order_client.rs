use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::domain::{Order, OrderAction, OrderCreate};
use crate::error::{MarketError, Result};
use crate::ports::{LifecycleObserver, OrderReader, PostingCatalog};

/// Client for the order store.
///
/// Orchestrates order requests against the posting catalog and drives the
/// lifecycle, reporting every committed transition to the observer.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    postings: Arc<dyn PostingCatalog>,
    observer: Arc<dyn LifecycleObserver>,
    clock: Arc<dyn Clock>,
}

impl_client_methods!(OrderClient, Order, order);

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        postings: Arc<dyn PostingCatalog>,
        observer: Arc<dyn LifecycleObserver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner,
            postings,
            observer,
            clock,
        }
    }

    /// Opens a `PENDING` order from `client_id` against a live posting of `provider_id`.
    #[instrument(skip(self))]
    pub async fn request(
        &self,
        client_id: &str,
        posting_id: &str,
        provider_id: &str,
    ) -> Result<Order> {
        // Step 1: Validate input
        if [client_id, posting_id, provider_id]
            .iter()
            .any(|value| value.trim().is_empty())
        {
            return Err(MarketError::InvalidFields(
                "client, posting and provider are required".to_string(),
            ));
        }

        // Step 2: Validate posting ownership
        if !self.postings.is_offered_by(posting_id, provider_id).await? {
            error!("Posting is not offered by this provider");
            return Err(MarketError::InvalidFields(format!(
                "posting {posting_id} is not offered by {provider_id}"
            )));
        }

        // Step 3: Create order in ResourceActor
        let params = OrderCreate {
            client_id: client_id.to_string(),
            posting_id: posting_id.to_string(),
            provider_id: provider_id.to_string(),
            at: self.clock.utc(),
        };
        let id = self.inner.create(params).await?;
        info!(order_id = %id, "Order requested");

        let order = self.fetch_order(&id).await?;
        self.observer.order_status_changed(&order);
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn accept(
        &self,
        provider_id: &str,
        order_id: &str,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Order> {
        let action = OrderAction::Accept {
            actor: provider_id.to_string(),
            scheduled_at,
            at: self.clock.utc(),
        };
        self.transition(order_id, action).await
    }

    #[instrument(skip(self))]
    pub async fn start(&self, provider_id: &str, order_id: &str) -> Result<Order> {
        let action = OrderAction::Start {
            actor: provider_id.to_string(),
            at: self.clock.utc(),
        };
        self.transition(order_id, action).await
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, provider_id: &str, order_id: &str) -> Result<Order> {
        let action = OrderAction::Complete {
            actor: provider_id.to_string(),
            at: self.clock.utc(),
        };
        self.transition(order_id, action).await
    }

    /// Either party may cancel while the order is `PENDING` or `ACCEPTED`.
    #[instrument(skip(self))]
    pub async fn cancel(&self, user_id: &str, order_id: &str) -> Result<Order> {
        let action = OrderAction::Cancel {
            actor: user_id.to_string(),
            at: self.clock.utc(),
        };
        self.transition(order_id, action).await
    }

    pub async fn get(&self, order_id: &str) -> Result<Order> {
        self.fetch_order(order_id).await
    }

    /// Orders where `user_id` is the client or the provider, oldest first.
    #[instrument(skip(self))]
    pub async fn list_mine(&self, user_id: &str) -> Result<Vec<Order>> {
        let user = user_id.to_string();
        self.inner
            .list(move |o: &Order| o.client_id == user || o.provider_id == user)
            .await
    }

    async fn transition(&self, order_id: &str, action: OrderAction) -> Result<Order> {
        match self.inner.perform_action(order_id.to_string(), action).await {
            Ok(order) => {
                info!(status = %order.status, "Order transitioned");
                self.observer.order_status_changed(&order);
                Ok(order)
            }
            Err(e) => {
                warn!(error = %e, "Order transition rejected");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl OrderReader for OrderClient {
    async fn order_by_id(&self, order_id: &str) -> Result<Order> {
        self.fetch_order(order_id).await
    }
}
