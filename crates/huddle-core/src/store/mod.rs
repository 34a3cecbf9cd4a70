//! The plan book: durable saved plans, the session's ephemeral results, and
//! the pending-deletion slot.
//!
//! Every mutation follows the same order: compute the next value of each
//! collection, persist it, and only then adopt it. A failed write therefore
//! leaves the in-memory state exactly as it was.
//!
//! Saving and unsaving go through a single toggle. Toggling a plan that is
//! already saved does not delete it; it parks the saved copy in the
//! pending-deletion slot until [`PlanBook::confirm_deletion`] or
//! [`PlanBook::cancel_deletion`] is called.

pub mod session;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use huddle_db::models::{ItemError, PlanningItem};
use huddle_db::queries::plans;
use huddle_db::{SnapshotError, SnapshotStore};

use crate::calendar::{MoveError, Occurrence, reschedule};
use crate::identity::{ItemIdentity, new_id, same_plan};

pub use session::{Completion, RequestTicket, Session, SessionError};

/// Errors from plan book operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to persist {collection}: {source}")]
    Persist {
        collection: &'static str,
        #[source]
        source: SnapshotError,
    },

    #[error(transparent)]
    Invalid(#[from] ItemError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("nothing matches {0:?}")]
    NotFound(String),

    #[error("{prefix:?} matches {count} items; use a longer prefix")]
    Ambiguous { prefix: String, count: usize },
}

/// Result of [`PlanBook::toggle_save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The plan was added to the saved collection; carries the saved copy.
    Saved(PlanningItem),
    /// The plan was already saved; the saved copy awaits confirmation.
    PendingDeletion(PlanningItem),
}

/// Ordering for listing saved plans. Never changes storage order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
    Date,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Title => "title",
            Self::Date => "date",
        };
        f.write_str(s)
    }
}

impl FromStr for SortOrder {
    type Err = SortOrderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "title" => Ok(Self::Title),
            "date" => Ok(Self::Date),
            _ => Err(SortOrderParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`SortOrder`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid sort order: {0:?} (expected newest, oldest, title, or date)")]
pub struct SortOrderParseError(pub String);

/// Owner of the saved plans, the session, and the pending deletion.
pub struct PlanBook {
    store: Arc<dyn SnapshotStore>,
    saved: Vec<PlanningItem>,
    session: Session,
    pending: Option<PlanningItem>,
    cache_results: bool,
}

impl fmt::Debug for PlanBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanBook")
            .field("saved", &self.saved.len())
            .field("results", &self.session.results().len())
            .field("pending", &self.pending.as_ref().map(|p| &p.title))
            .field("cache_results", &self.cache_results)
            .finish()
    }
}

impl PlanBook {
    /// Load the saved plans from `store`. Results start empty and live only
    /// in memory.
    pub fn open(store: Arc<dyn SnapshotStore>) -> Self {
        let saved = plans::load_saved_plans(store.as_ref());
        debug!(count = saved.len(), "loaded saved plans");
        Self {
            store,
            saved,
            session: Session::new(),
            pending: None,
            cache_results: false,
        }
    }

    /// Like [`Self::open`], but also restore the results cache and write it
    /// through on every change to the results.
    pub fn open_with_results_cache(store: Arc<dyn SnapshotStore>) -> Self {
        let mut book = Self::open(store);
        let results = plans::load_current_results(book.store.as_ref());
        debug!(count = results.len(), "restored cached results");
        book.session = Session::with_results(results);
        book.cache_results = true;
        book
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Saved plans, most recently added first.
    pub fn saved(&self) -> &[PlanningItem] {
        &self.saved
    }

    /// Current (ephemeral) generation results.
    pub fn results(&self) -> &[PlanningItem] {
        self.session.results()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn pending_deletion(&self) -> Option<&PlanningItem> {
        self.pending.as_ref()
    }

    /// Whether a saved plan matches `item` under composite identity.
    pub fn is_saved(&self, item: &PlanningItem) -> bool {
        self.saved.iter().any(|s| same_plan(s, item))
    }

    /// Find a saved plan by full identifier or unique identifier prefix.
    pub fn find_saved(&self, id_or_prefix: &str) -> Result<&PlanningItem, StoreError> {
        find_by_id(&self.saved, id_or_prefix, |p| p.id.as_deref())
    }

    /// Saved plans in the requested order.
    ///
    /// `Date` puts scheduled plans first, earliest anchor first; ties and
    /// unscheduled plans keep storage order.
    pub fn sorted_saved(&self, order: SortOrder) -> Vec<&PlanningItem> {
        let mut view: Vec<&PlanningItem> = self.saved.iter().collect();
        match order {
            SortOrder::Newest => {}
            SortOrder::Oldest => view.reverse(),
            SortOrder::Title => view.sort_by_key(|p| p.title.to_lowercase()),
            SortOrder::Date => {
                view.sort_by_key(|p| (p.assigned_date.is_none(), p.assigned_date));
            }
        }
        view
    }

    // -----------------------------------------------------------------------
    // Saving and deletion
    // -----------------------------------------------------------------------

    /// Save `item`, or stage its saved copy for deletion if already saved.
    pub fn toggle_save(&mut self, item: &PlanningItem) -> Result<ToggleOutcome, StoreError> {
        if let Some(existing) = self.saved.iter().find(|s| same_plan(s, item)) {
            debug!(title = %existing.title, "plan already saved, staging deletion");
            self.pending = Some(existing.clone());
            return Ok(ToggleOutcome::PendingDeletion(existing.clone()));
        }

        let mut to_save = item.clone();
        if to_save.id.is_none() {
            to_save.id = Some(new_id());
        }
        to_save.saved_at = Some(Utc::now());

        let mut next_saved = Vec::with_capacity(self.saved.len() + 1);
        next_saved.push(to_save.clone());
        next_saved.extend(self.saved.iter().cloned());

        let mut next_results = self.session.results().to_vec();
        let results_changed = match next_results.iter_mut().find(|r| **r == *item) {
            Some(slot) => {
                *slot = to_save.clone();
                true
            }
            None => false,
        };

        self.persist_saved(&next_saved)?;
        info!(
            id = to_save.id.as_deref().unwrap_or_default(),
            saved = next_saved.len(),
            "plan saved"
        );
        self.saved = next_saved;
        if results_changed {
            self.adopt_results(next_results);
        }
        Ok(ToggleOutcome::Saved(to_save))
    }

    /// Remove every saved plan matching the pending one.
    ///
    /// Returns the removed plan, or `None` when nothing was pending. Results
    /// are not touched.
    pub fn confirm_deletion(&mut self) -> Result<Option<PlanningItem>, StoreError> {
        let Some(pending) = self.pending.as_ref() else {
            return Ok(None);
        };

        let next_saved: Vec<PlanningItem> = self
            .saved
            .iter()
            .filter(|s| !same_plan(s, pending))
            .cloned()
            .collect();

        self.persist_saved(&next_saved)?;
        info!(
            id = pending.id.as_deref().unwrap_or_default(),
            saved = next_saved.len(),
            "plan deleted"
        );
        self.saved = next_saved;
        Ok(self.pending.take())
    }

    /// Abandon the pending deletion.
    pub fn cancel_deletion(&mut self) -> Option<PlanningItem> {
        self.pending.take()
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Apply a changed copy of a plan wherever it is found.
    ///
    /// Every matching results entry is replaced; the first matching saved
    /// entry is replaced. Identifiers are never assigned here, but a copy
    /// without one keeps the identifier and save time of the entry it
    /// replaces. Nothing is written unless the saved collection changed.
    pub fn update(&mut self, item: &PlanningItem) -> Result<(), StoreError> {
        item.validate()?;
        let key = ItemIdentity::of(item);

        let mut next_results = self.session.results().to_vec();
        let mut results_changed = false;
        for slot in next_results
            .iter_mut()
            .filter(|r| ItemIdentity::of(r).matches(&key))
        {
            *slot = keep_identity(item, slot);
            results_changed = true;
        }

        let saved_index = self
            .saved
            .iter()
            .position(|s| ItemIdentity::of(s).matches(&key));

        if let Some(index) = saved_index {
            let mut next_saved = self.saved.clone();
            next_saved[index] = keep_identity(item, &self.saved[index]);
            self.persist_saved(&next_saved)?;
            info!(
                id = next_saved[index].id.as_deref().unwrap_or_default(),
                saved = next_saved.len(),
                "saved plan updated"
            );
            self.saved = next_saved;
        } else {
            debug!(title = %item.title, "update touched no saved plan");
        }

        if results_changed {
            self.adopt_results(next_results);
        }
        Ok(())
    }

    /// Store a plan coming back from the editor.
    ///
    /// The saved collection is searched by identifier only: an edited title
    /// or description must not make the plan look new. Returns the stored
    /// copy, which always carries an identifier.
    pub fn save_edited(&mut self, item: &PlanningItem) -> Result<PlanningItem, StoreError> {
        item.validate()?;

        let mut with_id = item.clone();
        if with_id.id.is_none() {
            with_id.id = Some(new_id());
        }

        let mut next_saved = self.saved.clone();
        match next_saved.iter().position(|s| s.id == with_id.id) {
            Some(index) => next_saved[index] = with_id.clone(),
            None => {
                let mut fresh = with_id.clone();
                fresh.saved_at = Some(Utc::now());
                next_saved.insert(0, fresh);
            }
        }

        let mut next_results = self.session.results().to_vec();
        let mut results_changed = false;
        for slot in next_results.iter_mut().filter(|r| {
            (r.id.is_some() && r.id == with_id.id)
                || (r.title == item.title && r.description == item.description)
        }) {
            *slot = with_id.clone();
            results_changed = true;
        }

        self.persist_saved(&next_saved)?;
        info!(
            id = with_id.id.as_deref().unwrap_or_default(),
            saved = next_saved.len(),
            "edited plan saved"
        );
        let stored = next_saved
            .iter()
            .find(|s| s.id == with_id.id)
            .cloned()
            .unwrap_or(with_id);
        self.saved = next_saved;
        if results_changed {
            self.adopt_results(next_results);
        }
        Ok(stored)
    }

    /// Reschedule an anchor occurrence through [`Self::update`].
    ///
    /// Returns the moved plan, or `None` when the date did not change.
    pub fn move_occurrence(
        &mut self,
        occurrence: &Occurrence<'_>,
        new_date: NaiveDate,
    ) -> Result<Option<PlanningItem>, StoreError> {
        let Some(moved) = reschedule(occurrence, new_date)? else {
            debug!(title = %occurrence.item.title, %new_date, "move to same date ignored");
            return Ok(None);
        };
        self.update(&moved)?;
        Ok(Some(moved))
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    pub fn set_active_context(&mut self, title: impl Into<String>) {
        self.session.set_active_context(title);
    }

    /// Start a generation request; clears the current results.
    pub fn begin_request(&mut self) -> Result<RequestTicket, StoreError> {
        let ticket = self.session.begin_request()?;
        self.write_results_cache(&[]);
        Ok(ticket)
    }

    /// Finish a generation request, adopting its results unless stale.
    pub fn complete_request<E>(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<Vec<PlanningItem>, E>,
    ) -> Completion<E> {
        let completion = self.session.complete_request(ticket, outcome);
        if matches!(completion, Completion::Applied(_)) {
            let results = self.session.results().to_vec();
            self.write_results_cache(&results);
        }
        completion
    }

    /// Navigate home: clear results and context, invalidate in-flight requests.
    pub fn reset_view(&mut self) {
        self.session.reset_view();
        self.write_results_cache(&[]);
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn persist_saved(&self, next: &[PlanningItem]) -> Result<(), StoreError> {
        plans::store_saved_plans(self.store.as_ref(), next).map_err(|source| {
            StoreError::Persist {
                collection: plans::SAVED_PLANS_KEY,
                source,
            }
        })
    }

    fn adopt_results(&mut self, next: Vec<PlanningItem>) {
        self.write_results_cache(&next);
        self.session.replace_results(next);
    }

    /// The results cache is a convenience copy; a failed write is logged
    /// and otherwise ignored.
    fn write_results_cache(&self, results: &[PlanningItem]) {
        if !self.cache_results {
            return;
        }
        if let Err(e) = plans::store_current_results(self.store.as_ref(), results) {
            warn!(error = %e, "failed to write results cache");
        }
    }
}

/// `incoming` with the identifier and save time of `existing` filled in
/// where `incoming` has none.
fn keep_identity(incoming: &PlanningItem, existing: &PlanningItem) -> PlanningItem {
    let mut replacement = incoming.clone();
    if replacement.id.is_none() {
        replacement.id = existing.id.clone();
    }
    if replacement.saved_at.is_none() {
        replacement.saved_at = existing.saved_at;
    }
    replacement
}

/// Look up an entry by exact identifier, then by unique identifier prefix.
pub(crate) fn find_by_id<'a, T>(
    items: &'a [T],
    id_or_prefix: &str,
    id_of: impl Fn(&T) -> Option<&str>,
) -> Result<&'a T, StoreError> {
    let needle = id_or_prefix.trim();
    if needle.is_empty() {
        return Err(StoreError::NotFound(id_or_prefix.to_owned()));
    }
    if let Some(exact) = items.iter().find(|it| id_of(it) == Some(needle)) {
        return Ok(exact);
    }

    let mut matches = items
        .iter()
        .filter(|it| id_of(it).is_some_and(|id| id.starts_with(needle)));
    match (matches.next(), matches.count()) {
        (Some(found), 0) => Ok(found),
        (Some(_), rest) => Err(StoreError::Ambiguous {
            prefix: needle.to_owned(),
            count: rest + 1,
        }),
        (None, _) => Err(StoreError::NotFound(needle.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_db::MemorySnapshotStore;
    use huddle_db::models::{Cost, Difficulty, Recurrence};

    fn item(title: &str, id: Option<&str>) -> PlanningItem {
        PlanningItem {
            id: id.map(str::to_owned),
            title: title.into(),
            description: format!("{title} description"),
            materials_needed: vec![],
            steps: vec![],
            scripture_reference: String::new(),
            suggested_duration: "30 minutes".into(),
            difficulty_level: Difficulty::Low,
            estimated_cost: Cost::Free,
            roles: None,
            assigned_team_members: None,
            assigned_date: None,
            recurrence: Recurrence::None,
            notes: None,
            saved_at: None,
        }
    }

    fn book_with_saved(saved: &[PlanningItem]) -> PlanBook {
        let store = Arc::new(MemorySnapshotStore::new());
        plans::store_saved_plans(store.as_ref(), saved).unwrap();
        PlanBook::open(store)
    }

    #[test]
    fn find_saved_by_exact_id_and_prefix() {
        let book = book_with_saved(&[
            item("A", Some("abc-1")),
            item("B", Some("abd-2")),
            item("C", Some("abc")),
        ]);
        assert_eq!(book.find_saved("abc").unwrap().title, "C");
        assert_eq!(book.find_saved("abd").unwrap().title, "B");
        assert!(matches!(
            book.find_saved("ab"),
            Err(StoreError::Ambiguous { count: 3, .. })
        ));
        assert!(matches!(book.find_saved("zzz"), Err(StoreError::NotFound(_))));
        assert!(matches!(book.find_saved(""), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn sorted_views_leave_storage_order_alone() {
        let mut early = item("beta", Some("1"));
        early.assigned_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        let mut late = item("Alpha", Some("2"));
        late.assigned_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        let unscheduled = item("gamma", Some("3"));

        let book = book_with_saved(&[unscheduled.clone(), late.clone(), early.clone()]);
        let titles = |v: Vec<&PlanningItem>| v.iter().map(|p| p.title.clone()).collect::<Vec<_>>();

        assert_eq!(titles(book.sorted_saved(SortOrder::Newest)), ["gamma", "Alpha", "beta"]);
        assert_eq!(titles(book.sorted_saved(SortOrder::Oldest)), ["beta", "Alpha", "gamma"]);
        assert_eq!(titles(book.sorted_saved(SortOrder::Title)), ["Alpha", "beta", "gamma"]);
        assert_eq!(titles(book.sorted_saved(SortOrder::Date)), ["beta", "Alpha", "gamma"]);
        assert_eq!(book.saved()[0].title, "gamma");
    }

    #[test]
    fn sort_order_parses_case_insensitively() {
        assert_eq!("Title".parse::<SortOrder>().unwrap(), SortOrder::Title);
        assert!("random".parse::<SortOrder>().is_err());
    }

    #[test]
    fn cancel_deletion_clears_pending_without_writing() {
        let mut book = book_with_saved(&[item("A", Some("1"))]);
        let saved = book.saved()[0].clone();
        assert!(matches!(
            book.toggle_save(&saved).unwrap(),
            ToggleOutcome::PendingDeletion(_)
        ));
        assert_eq!(book.cancel_deletion().unwrap().title, "A");
        assert!(book.pending_deletion().is_none());
        assert_eq!(book.confirm_deletion().unwrap(), None);
        assert_eq!(book.saved().len(), 1);
    }

    #[test]
    fn update_rejects_recurrence_without_anchor() {
        let mut book = book_with_saved(&[item("A", Some("1"))]);
        let mut bad = book.saved()[0].clone();
        bad.recurrence = Recurrence::Monthly;
        assert!(matches!(book.update(&bad), Err(StoreError::Invalid(_))));
        assert_eq!(book.saved()[0].recurrence, Recurrence::None);
    }
}
