//! Snapshot access for media items.

use crate::models::MediaItem;
use crate::snapshot::{SnapshotError, SnapshotStore, load_collection, store_collection};

/// Key of the media library collection.
pub const MEDIA_ITEMS_KEY: &str = "media_items";

/// Load media items, most recently added first.
pub fn load_media_items(store: &dyn SnapshotStore) -> Vec<MediaItem> {
    load_collection(store, MEDIA_ITEMS_KEY)
}

/// Replace the media snapshot.
pub fn store_media_items(store: &dyn SnapshotStore, items: &[MediaItem]) -> Result<(), SnapshotError> {
    store_collection(store, MEDIA_ITEMS_KEY, items)
}
