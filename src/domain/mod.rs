//! Business entities, kept separate from the actor infrastructure that stores them.

pub mod order;
pub mod posting;
pub mod review;
pub mod user;

pub use order::*;
pub use posting::*;
pub use review::*;
pub use user::*;
