use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::actor_framework::ResourceActor;
use crate::clients::{OrderClient, PostingClient, ProviderRatings, ReviewClient, UserClient};
use crate::config::MarketConfig;
use crate::domain::{Order, Posting, Review, User};
use crate::error::{MarketError, Result};
use crate::ports::{BroadcastObserver, Sha256Hasher};

const EVENT_CAPACITY: usize = 64;

fn uuid_ids() -> impl Fn() -> String + Send + Sync + 'static {
    || Uuid::new_v4().to_string()
}

/// The main application system that orchestrates all actors.
///
/// Starts one store actor per entity and wires the services together in
/// dependency order: identity, postings, orders, reviews. Ratings flow back
/// into postings through a read view over the review store, so no service
/// needs one that is built after it.
pub struct MarketSystem {
    pub users: UserClient,
    pub postings: PostingClient,
    pub orders: OrderClient,
    pub reviews: ReviewClient,
    events: BroadcastObserver,
    handles: Vec<JoinHandle<()>>,
}

impl MarketSystem {
    /// Must be called from within a tokio runtime.
    pub fn new(config: &MarketConfig) -> Self {
        Self::with_clock(config, Arc::new(DefaultClock))
    }

    pub fn with_clock(config: &MarketConfig, clock: Arc<dyn Clock>) -> Self {
        let buffer = config.channel_buffer;

        // 1. Identity
        let (user_actor, user_store) = ResourceActor::<User>::new(buffer, uuid_ids());
        let users = UserClient::new(user_store, Arc::new(Sha256Hasher), clock.clone());
        let user_handle = tokio::spawn(user_actor.run());

        // 2. Review store first, so postings can read provider ratings from it
        let (review_actor, review_store) = ResourceActor::<Review>::new(buffer, uuid_ids());
        let review_handle = tokio::spawn(review_actor.run());

        // 3. Postings
        let (posting_actor, posting_store) = ResourceActor::<Posting>::new(buffer, uuid_ids());
        let postings = PostingClient::new(
            posting_store,
            Arc::new(users.clone()),
            Arc::new(ProviderRatings::new(review_store.clone())),
            clock.clone(),
        );
        let posting_handle = tokio::spawn(posting_actor.run());

        // 4. Orders
        let events = BroadcastObserver::new(EVENT_CAPACITY);
        let (order_actor, order_store) = ResourceActor::<Order>::new(buffer, uuid_ids());
        let orders = OrderClient::new(
            order_store,
            Arc::new(postings.clone()),
            Arc::new(events.clone()),
            clock.clone(),
        );
        let order_handle = tokio::spawn(order_actor.run());

        // 5. Reviews
        let reviews = ReviewClient::new(
            review_store,
            Arc::new(orders.clone()),
            clock,
            config.review_edit_window(),
        );

        info!(buffer, "Market system started");
        Self {
            users,
            postings,
            orders,
            reviews,
            events,
            handles: vec![user_handle, review_handle, posting_handle, order_handle],
        }
    }

    /// Order snapshots after every lifecycle change, creation included.
    pub fn subscribe(&self) -> broadcast::Receiver<Order> {
        self.events.subscribe()
    }

    /// Drops every client, which closes the actor mailboxes, then waits for the
    /// actors to drain.
    pub async fn shutdown(self) -> Result<()> {
        info!("Shutting down system...");
        let Self {
            users,
            postings,
            orders,
            reviews,
            handles,
            ..
        } = self;
        drop(reviews);
        drop(orders);
        drop(postings);
        drop(users);

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(MarketError::ActorCommunication(format!(
                    "actor task failed: {e}"
                )));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[tokio::test]
    async fn starts_and_shuts_down_cleanly() {
        let system = MarketSystem::new(&MarketConfig::default());
        let user = system
            .users
            .register("Ana", "ana@example.com", "correct horse", "customer")
            .await
            .unwrap();
        assert_eq!(user.role, Role::Customer);
        assert!(Uuid::parse_str(&user.id).is_ok());

        system.shutdown().await.unwrap();
    }
}
