//! Shared test utilities for huddle integration tests.
//!
//! Provides a temporary snapshot directory per test and small builders for
//! planning and media items so tests only spell out the fields they care
//! about.

use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use huddle_db::FileSnapshotStore;
use huddle_db::models::{Cost, Difficulty, MediaItem, MediaKind, PlanningItem, Recurrence};

/// A [`FileSnapshotStore`] rooted in a temporary directory.
///
/// The directory is removed when the value is dropped.
pub struct TempStore {
    dir: TempDir,
    store: FileSnapshotStore,
}

impl TempStore {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = FileSnapshotStore::new(dir.path());
        Self { dir, store }
    }

    pub fn store(&self) -> &FileSnapshotStore {
        &self.store
    }

    /// A fresh handle onto the same directory, as a new process would open it.
    pub fn reopen(&self) -> FileSnapshotStore {
        FileSnapshotStore::new(self.dir.path())
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a `YYYY-MM-DD` literal.
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|e| panic!("bad test date {s:?}: {e}"))
}

/// Builder for [`PlanningItem`] fixtures.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    item: PlanningItem,
}

/// Start building an ephemeral plan with the given identity fields.
pub fn plan(title: &str, description: &str) -> PlanBuilder {
    PlanBuilder {
        item: PlanningItem {
            id: None,
            title: title.to_owned(),
            description: description.to_owned(),
            materials_needed: vec!["Bibles".to_owned()],
            steps: vec!["Gather".to_owned(), "Discuss".to_owned()],
            scripture_reference: "Psalm 133:1".to_owned(),
            suggested_duration: "1 hour".to_owned(),
            difficulty_level: Difficulty::Low,
            estimated_cost: Cost::Free,
            roles: None,
            assigned_team_members: None,
            assigned_date: None,
            recurrence: Recurrence::None,
            notes: None,
            saved_at: None,
        },
    }
}

impl PlanBuilder {
    pub fn id(mut self, id: &str) -> Self {
        self.item.id = Some(id.to_owned());
        self
    }

    pub fn on(mut self, day: &str) -> Self {
        self.item.assigned_date = Some(date(day));
        self
    }

    pub fn weekly(mut self) -> Self {
        self.item.recurrence = Recurrence::Weekly;
        self
    }

    pub fn monthly(mut self) -> Self {
        self.item.recurrence = Recurrence::Monthly;
        self
    }

    pub fn duration(mut self, duration: &str) -> Self {
        self.item.suggested_duration = duration.to_owned();
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.item.notes = Some(notes.to_owned());
        self
    }

    pub fn build(self) -> PlanningItem {
        self.item
    }
}

/// A media item with a fixed creation time.
pub fn media(id: &str, title: &str, kind: MediaKind, category: Option<&str>) -> MediaItem {
    MediaItem {
        id: id.to_owned(),
        title: title.to_owned(),
        content: format!("{title} content"),
        kind,
        category: category.map(str::to_owned),
        created_at: Utc
            .timestamp_millis_opt(1_700_000_000_000)
            .single()
            .expect("fixed timestamp is valid"),
    }
}
