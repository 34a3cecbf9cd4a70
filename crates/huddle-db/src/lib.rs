//! Data model and snapshot persistence for huddle.

pub mod config;
pub mod models;
pub mod queries;
pub mod snapshot;

pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotError, SnapshotStore};
