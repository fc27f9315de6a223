use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Canceled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Accepted, InProgress)
                | (InProgress, Completed)
                | (Pending, Canceled)
                | (Accepted, Canceled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Canceled => "CANCELED",
        };
        f.write_str(label)
    }
}

/// One step in an order's lifecycle. `from` is `None` only for the creation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub by: String,
    pub from: Option<OrderStatus>,
    pub to: OrderStatus,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub note: String,
}

/// A customer's request for a posting, tracked through its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub posting_id: String,
    pub client_id: String,
    pub provider_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub client_id: String,
    pub posting_id: String,
    pub provider_id: String,
    pub at: DateTime<Utc>,
}

/// Lifecycle commands. `actor` is the user asking for the transition.
#[derive(Debug, Clone)]
pub enum OrderAction {
    Accept {
        actor: String,
        scheduled_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    Start {
        actor: String,
        at: DateTime<Utc>,
    },
    Complete {
        actor: String,
        at: DateTime<Utc>,
    },
    Cancel {
        actor: String,
        at: DateTime<Utc>,
    },
}
