//! Posting store plus the search and ranking rules applied on top of it.

pub mod entity;
pub mod search;
