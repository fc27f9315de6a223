//! Service clients.
//!
//! Each client is a cheap, cloneable handle over one store actor plus the ports it
//! needs. Cross-service calls go through the traits in [`crate::ports`].

#[macro_use]
mod macros;

mod order_client;
mod posting_client;
mod review_client;
mod user_client;

pub use order_client::OrderClient;
pub use posting_client::{NewPosting, PostingClient};
pub use review_client::{ProviderRatings, ReviewClient};
pub use user_client::UserClient;
