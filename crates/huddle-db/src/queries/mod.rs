//! Typed access to the persisted collections.

pub mod media;
pub mod plans;
