//! Marketplace backend core.
//!
//! Providers publish postings, customers order against them, orders move
//! through a fixed lifecycle and completed orders can be reviewed. Each entity
//! lives in its own store actor; the services in [`clients`] talk to those
//! actors and to each other only through the traits in [`ports`].

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

mod order_actor;
mod posting_actor;
mod review_actor;
mod user_actor;

#[cfg(test)]
mod mock_framework;

pub use app_system::{setup_tracing, MarketSystem};
pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use posting_actor::search::{decode, normalize, DEFAULT_LIMIT, MAX_LIMIT};
