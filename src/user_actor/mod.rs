//! Identity store: account creation, email index and provider profiles.

pub mod entity;
