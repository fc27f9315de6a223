use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A service offer published by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    pub id: String,
    pub provider_id: String,
    /// Captured when the posting is created; not kept in sync with the account.
    pub provider_name: String,
    pub title: String,
    pub description: String,
    /// Smallest currency unit, always positive.
    pub price: i64,
    pub category: String,
    pub city: String,
    pub district: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Filled in at read time from the provider's reviews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_avg: Option<f64>,
}

/// Payload for publishing a posting. Text fields are trimmed by the entity hook.
#[derive(Debug, Clone)]
pub struct PostingCreate {
    pub provider_id: String,
    pub provider_name: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub category: String,
    pub city: String,
    pub district: String,
    pub at: DateTime<Utc>,
}

/// Fields a provider may change on a posting. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostingPatch {
    pub provider_id: String,
    pub fields: PostingFields,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum PostingAction {
    /// Soft-deletes the posting. There is no way back.
    Archive {
        provider_id: String,
        at: DateTime<Utc>,
    },
}

/// Filters, ordering and paging for a public search.
///
/// Text filters may arrive URL-encoded; they are decoded and normalized before
/// comparison. `price_min`/`price_max` of zero mean "no bound".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub category: String,
    pub city: String,
    pub district: String,
    pub price_min: i64,
    pub price_max: i64,
    pub sort: String,
    pub order: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub items: Vec<Posting>,
    /// Offset of the following page, `None` when this is the last one.
    pub next_offset: Option<usize>,
}
