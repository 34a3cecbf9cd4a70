//! Core planning logic for huddle: the occurrence resolver, the plan book
//! and media library, generation, and export rendering.

pub mod calendar;
pub mod export;
pub mod generate;
pub mod identity;
pub mod media;
pub mod store;

pub use store::{PlanBook, SortOrder, StoreError, ToggleOutcome};
