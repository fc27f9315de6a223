use chrono::{DateTime, Utc};

use crate::actor_framework::Entity;
use crate::domain::{HistoryEntry, Order, OrderAction, OrderCreate, OrderStatus};
use crate::error::MarketError;

impl Order {
    fn ensure_provider(&self, actor: &str) -> Result<(), MarketError> {
        if actor != self.provider_id {
            return Err(MarketError::Forbidden(format!(
                "only the provider may change order {}",
                self.id
            )));
        }
        Ok(())
    }

    fn ensure_party(&self, actor: &str) -> Result<(), MarketError> {
        if actor != self.client_id && actor != self.provider_id {
            return Err(MarketError::Forbidden(format!(
                "{actor} is not a party to order {}",
                self.id
            )));
        }
        Ok(())
    }

    /// Moves to `to` and appends the matching history entry.
    fn transition(
        &mut self,
        actor: String,
        to: OrderStatus,
        at: DateTime<Utc>,
        note: &str,
    ) -> Result<(), MarketError> {
        let from = self.status;
        if !from.can_transition_to(to) {
            return Err(MarketError::InvalidState(format!("{from} -> {to}")));
        }
        self.status = to;
        self.updated_at = at;
        self.history.push(HistoryEntry {
            at,
            by: actor,
            from: Some(from),
            to,
            note: note.to_string(),
        });
        Ok(())
    }
}

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = ();
    type Action = OrderAction;
    type ActionResult = Order;
    type Error = MarketError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Order in `PENDING` with its creation entry.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, MarketError> {
        if params.client_id.is_empty() || params.posting_id.is_empty() || params.provider_id.is_empty()
        {
            return Err(MarketError::InvalidFields(
                "client, posting and provider are required".to_string(),
            ));
        }
        Ok(Self {
            id,
            history: vec![HistoryEntry {
                at: params.at,
                by: params.client_id.clone(),
                from: None,
                to: OrderStatus::Pending,
                note: "order created".to_string(),
            }],
            posting_id: params.posting_id,
            client_id: params.client_id,
            provider_id: params.provider_id,
            scheduled_at: None,
            status: OrderStatus::Pending,
            created_at: params.at,
            updated_at: params.at,
        })
    }

    /// Orders change only through lifecycle actions.
    fn on_update(&mut self, _patch: ()) -> Result<(), MarketError> {
        Err(MarketError::InvalidState(
            "orders change only through lifecycle actions".to_string(),
        ))
    }

    /// Runs one lifecycle transition.
    ///
    /// # Errors
    /// `Forbidden` when the actor may not drive this transition, checked before
    /// `InvalidState` for an illegal move from the current status.
    fn handle_action(&mut self, action: OrderAction) -> Result<Order, MarketError> {
        match action {
            OrderAction::Accept {
                actor,
                scheduled_at,
                at,
            } => {
                self.ensure_provider(&actor)?;
                self.transition(actor, OrderStatus::Accepted, at, "accepted with schedule")?;
                self.scheduled_at = Some(scheduled_at);
            }
            OrderAction::Start { actor, at } => {
                self.ensure_provider(&actor)?;
                self.transition(actor, OrderStatus::InProgress, at, "service started")?;
            }
            OrderAction::Complete { actor, at } => {
                self.ensure_provider(&actor)?;
                self.transition(actor, OrderStatus::Completed, at, "service completed")?;
            }
            OrderAction::Cancel { actor, at } => {
                self.ensure_party(&actor)?;
                self.transition(actor, OrderStatus::Canceled, at, "canceled")?;
            }
        }
        Ok(self.clone())
    }
}
