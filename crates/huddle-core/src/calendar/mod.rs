//! Calendar placement of planning items.
//!
//! The resolver answers "which plans appear on this day" from each plan's
//! anchor date and recurrence rule. An appearance on the anchor date itself
//! is the plan's *anchor occurrence*; appearances produced by the rule on
//! later dates are *derived* and cannot be rescheduled on their own.
//!
//! ```text
//! anchor 2024-03-04 (Mon), Weekly
//!   03-04  anchor   (movable)
//!   03-11  derived
//!   03-18  derived
//!   03-25  derived
//! ```

pub mod month;
pub mod share;

use chrono::{Datelike, NaiveDate};

use huddle_db::models::{PlanningItem, Recurrence};

pub use month::{DayCell, MonthView, YearMonth, YearMonthParseError};
pub use share::share_text;

/// One appearance of a plan on a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub item: &'a PlanningItem,
    pub day: NaiveDate,
    /// `true` when produced by the recurrence rule rather than the anchor date.
    pub derived: bool,
}

impl Occurrence<'_> {
    /// Only anchor occurrences may be dragged to another day.
    pub fn is_reschedulable(&self) -> bool {
        !self.derived
    }
}

/// Resolve the plans that appear on `day`.
///
/// Anchor matches come first in the container's order, followed by
/// recurrence matches in the container's order. A plan is never echoed
/// backwards in time, and never echoed onto its own anchor date.
pub fn occurrences_on_day(items: &[PlanningItem], day: NaiveDate) -> Vec<Occurrence<'_>> {
    let anchors = items
        .iter()
        .filter(|item| item.assigned_date == Some(day))
        .map(|item| Occurrence {
            item,
            day,
            derived: false,
        });

    let echoes = items
        .iter()
        .filter(|item| recurs_on(item, day))
        .map(|item| Occurrence {
            item,
            day,
            derived: true,
        });

    anchors.chain(echoes).collect()
}

/// Whether the recurrence rule of `item` produces a derived occurrence on `day`.
///
/// A monthly rule anchored on the 31st yields nothing in shorter months.
fn recurs_on(item: &PlanningItem, day: NaiveDate) -> bool {
    let Some(anchor) = item.assigned_date else {
        return false;
    };
    if anchor >= day {
        return false;
    }
    match item.recurrence {
        Recurrence::None => false,
        Recurrence::Weekly => anchor.weekday() == day.weekday(),
        Recurrence::Monthly => anchor.day() == day.day(),
    }
}

/// Errors from rescheduling an occurrence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error(
        "{title:?} on {day} repeats the plan anchored on {anchor}; only the anchor date can be moved"
    )]
    DerivedOccurrence {
        title: String,
        day: NaiveDate,
        anchor: NaiveDate,
    },

    #[error("plan {title:?} has not been saved, so it cannot be moved on the calendar")]
    Unsaved { title: String },
}

/// Compute the plan that results from moving `occurrence` to `new_date`.
///
/// Only the anchor date changes; the recurrence rule is kept. Returns
/// `Ok(None)` when the plan is already anchored on `new_date`.
pub fn reschedule(
    occurrence: &Occurrence<'_>,
    new_date: NaiveDate,
) -> Result<Option<PlanningItem>, MoveError> {
    let item = occurrence.item;
    if occurrence.derived {
        return Err(MoveError::DerivedOccurrence {
            title: item.title.clone(),
            day: occurrence.day,
            // A derived occurrence always has an anchor.
            anchor: item.assigned_date.unwrap_or(occurrence.day),
        });
    }
    if item.id.is_none() {
        return Err(MoveError::Unsaved {
            title: item.title.clone(),
        });
    }
    if item.assigned_date == Some(new_date) {
        return Ok(None);
    }

    let mut moved = item.clone();
    moved.assigned_date = Some(new_date);
    Ok(Some(moved))
}

/// Find the occurrence of the plan with `id` on `day`, if it appears there.
pub fn occurrence_of<'a>(
    items: &'a [PlanningItem],
    id: &str,
    day: NaiveDate,
) -> Option<Occurrence<'a>> {
    occurrences_on_day(items, day)
        .into_iter()
        .find(|occ| occ.item.id.as_deref() == Some(id))
}
