use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A client's rating of a completed order, keyed by the order id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub order_id: String,
    pub client_id: String,
    pub provider_id: String,
    /// 1..=5
    pub stars: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReviewCreate {
    pub order_id: String,
    pub client_id: String,
    pub provider_id: String,
    /// As supplied by the caller; narrowed to `u8` only after the range check.
    pub stars: i64,
    pub comment: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReviewPatch {
    pub client_id: String,
    pub stars: i64,
    pub comment: String,
    pub at: DateTime<Utc>,
    pub edit_window: Duration,
}

/// Aggregate of every review a provider has received.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProviderRating {
    pub average: f64,
    pub count: usize,
}

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

/// The rating as stored, or `None` when it falls outside 1..=5.
pub fn checked_stars(stars: i64) -> Option<u8> {
    u8::try_from(stars)
        .ok()
        .filter(|s| (MIN_STARS..=MAX_STARS).contains(s))
}

pub fn stars_in_range(stars: i64) -> bool {
    checked_stars(stars).is_some()
}
