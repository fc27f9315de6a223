//! Review store: one review per completed order, editable for a limited time.

pub mod entity;
