//! Order store and the lifecycle state machine.

pub mod entity;
