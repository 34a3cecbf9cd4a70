//! Snapshot access for planning items.

use crate::models::PlanningItem;
use crate::snapshot::{SnapshotError, SnapshotStore, load_collection, store_collection};

/// Key of the durable saved-plans collection.
pub const SAVED_PLANS_KEY: &str = "saved_plans";

/// Key of the current-results cache. This is the session view, not a
/// durable collection: it is replaced wholesale by every generation.
pub const CURRENT_RESULTS_KEY: &str = "current_results";

/// Load saved plans, most recently added first.
pub fn load_saved_plans(store: &dyn SnapshotStore) -> Vec<PlanningItem> {
    load_collection(store, SAVED_PLANS_KEY)
}

/// Replace the saved-plans snapshot.
pub fn store_saved_plans(
    store: &dyn SnapshotStore,
    items: &[PlanningItem],
) -> Result<(), SnapshotError> {
    store_collection(store, SAVED_PLANS_KEY, items)
}

/// Load the cached results of the last generation.
pub fn load_current_results(store: &dyn SnapshotStore) -> Vec<PlanningItem> {
    load_collection(store, CURRENT_RESULTS_KEY)
}

/// Replace the cached results.
pub fn store_current_results(
    store: &dyn SnapshotStore,
    items: &[PlanningItem],
) -> Result<(), SnapshotError> {
    store_collection(store, CURRENT_RESULTS_KEY, items)
}
