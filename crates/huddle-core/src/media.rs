//! Library of saved promotional artifacts.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use huddle_db::SnapshotStore;
use huddle_db::models::{MediaItem, MediaKind};
use huddle_db::queries::media;

use crate::identity::new_id;
use crate::store::{StoreError, find_by_id};

/// Number of context characters kept in a default media title.
const TITLE_CONTEXT_CHARS: usize = 20;

/// Default title for an artifact generated about `context`,
/// e.g. `"Poster: Summer Youth Camp 20..."`.
pub fn media_title(kind: &MediaKind, context: &str) -> String {
    let head: String = context.chars().take(TITLE_CONTEXT_CHARS).collect();
    format!("{kind}: {head}...")
}

/// A generated artifact that has not been filed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedia {
    pub kind: MediaKind,
    pub content: String,
    /// Event or topic the artifact was generated for.
    pub context: String,
    pub title: Option<String>,
    pub category: Option<String>,
}

/// Criteria for [`MediaLibrary::filter`]. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct MediaFilter {
    pub kind: Option<MediaKind>,
    /// [`MediaItem::UNCATEGORIZED`] matches items without a category.
    pub category: Option<String>,
    /// Case-insensitive substring of title or content.
    pub search: Option<String>,
}

impl MediaFilter {
    pub fn matches(&self, item: &MediaItem) -> bool {
        if self.kind.as_ref().is_some_and(|k| *k != item.kind) {
            return false;
        }
        if self
            .category
            .as_deref()
            .is_some_and(|c| c != item.category_or_default())
        {
            return false;
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(needle) if !needle.is_empty() => {
                item.title.to_lowercase().contains(&needle)
                    || item.content.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

pub struct MediaLibrary {
    store: Arc<dyn SnapshotStore>,
    items: Vec<MediaItem>,
}

impl std::fmt::Debug for MediaLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaLibrary")
            .field("items", &self.items.len())
            .finish()
    }
}

impl MediaLibrary {
    pub fn open(store: Arc<dyn SnapshotStore>) -> Self {
        let items = media::load_media_items(store.as_ref());
        debug!(count = items.len(), "loaded media items");
        Self { store, items }
    }

    /// All items, most recently added first.
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn find(&self, id_or_prefix: &str) -> Result<&MediaItem, StoreError> {
        find_by_id(&self.items, id_or_prefix, |m| Some(m.id.as_str()))
    }

    /// File a new artifact at the front of the library.
    ///
    /// Without an explicit category the item files under `active_context`,
    /// or [`MediaItem::UNCATEGORIZED`] when there is none.
    pub fn save(
        &mut self,
        draft: NewMedia,
        active_context: Option<&str>,
    ) -> Result<MediaItem, StoreError> {
        let title = draft
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| media_title(&draft.kind, &draft.context));
        let category = draft
            .category
            .filter(|c| !c.trim().is_empty())
            .or_else(|| {
                active_context
                    .filter(|c| !c.trim().is_empty())
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| MediaItem::UNCATEGORIZED.to_owned());

        let item = MediaItem {
            id: new_id(),
            title,
            content: draft.content,
            kind: draft.kind,
            category: Some(category),
            created_at: Utc::now(),
        };

        let mut next = Vec::with_capacity(self.items.len() + 1);
        next.push(item.clone());
        next.extend(self.items.iter().cloned());

        self.persist(&next)?;
        info!(id = %item.id, kind = %item.kind, media = next.len(), "media saved");
        self.items = next;
        Ok(item)
    }

    /// Replace the item with the same id. Returns whether anything matched;
    /// nothing is written otherwise.
    pub fn update(&mut self, item: &MediaItem) -> Result<bool, StoreError> {
        let Some(index) = self.items.iter().position(|m| m.id == item.id) else {
            debug!(id = %item.id, "media update matched nothing");
            return Ok(false);
        };

        let mut next = self.items.clone();
        next[index] = item.clone();
        self.persist(&next)?;
        info!(id = %item.id, "media updated");
        self.items = next;
        Ok(true)
    }

    /// Remove the item with `id`, returning it if it existed.
    pub fn delete(&mut self, id: &str) -> Result<Option<MediaItem>, StoreError> {
        let Some(index) = self.items.iter().position(|m| m.id == id) else {
            return Ok(None);
        };

        let mut next = self.items.clone();
        let removed = next.remove(index);
        self.persist(&next)?;
        info!(id, media = next.len(), "media deleted");
        self.items = next;
        Ok(Some(removed))
    }

    pub fn filter(&self, filter: &MediaFilter) -> Vec<&MediaItem> {
        self.items.iter().filter(|m| filter.matches(m)).collect()
    }

    /// Distinct categories with their item counts, in first-appearance order.
    pub fn categories(&self) -> Vec<(&str, usize)> {
        let mut out: Vec<(&str, usize)> = Vec::new();
        for item in &self.items {
            let cat = item.category_or_default();
            match out.iter_mut().find(|(c, _)| *c == cat) {
                Some((_, n)) => *n += 1,
                None => out.push((cat, 1)),
            }
        }
        out
    }

    fn persist(&self, next: &[MediaItem]) -> Result<(), StoreError> {
        media::store_media_items(self.store.as_ref(), next).map_err(|source| {
            StoreError::Persist {
                collection: media::MEDIA_ITEMS_KEY,
                source,
            }
        })
    }
}
