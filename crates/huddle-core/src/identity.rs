//! Composite identity for planning items.
//!
//! An item is identified primarily by its assigned identifier. Items that
//! have not been saved yet carry no identifier, so a secondary key of
//! `(title, description)` stands in for them. Every lookup in the store goes
//! through [`ItemIdentity::matches`].

use huddle_db::models::PlanningItem;

/// Borrowed two-tier key of a [`PlanningItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemIdentity<'a> {
    pub id: Option<&'a str>,
    pub title: &'a str,
    pub description: &'a str,
}

impl<'a> ItemIdentity<'a> {
    pub fn of(item: &'a PlanningItem) -> Self {
        Self {
            id: item.id.as_deref(),
            title: &item.title,
            description: &item.description,
        }
    }

    /// Whether two keys denote the same logical plan.
    ///
    /// Equal identifiers when both sides have one; otherwise equal title and
    /// description.
    pub fn matches(&self, other: &ItemIdentity<'_>) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.title == other.title && self.description == other.description,
        }
    }
}

/// Shorthand for `ItemIdentity::of(a).matches(&ItemIdentity::of(b))`.
pub fn same_plan(a: &PlanningItem, b: &PlanningItem) -> bool {
    ItemIdentity::of(a).matches(&ItemIdentity::of(b))
}

/// Generate a fresh identifier for a plan or media item.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key<'a>(id: Option<&'a str>, title: &'a str, description: &'a str) -> ItemIdentity<'a> {
        ItemIdentity {
            id,
            title,
            description,
        }
    }

    #[test]
    fn equal_ids_match_regardless_of_content() {
        assert!(key(Some("a"), "Old", "x").matches(&key(Some("a"), "New", "y")));
    }

    #[test]
    fn different_ids_never_match_even_with_equal_content() {
        assert!(!key(Some("a"), "Same", "x").matches(&key(Some("b"), "Same", "x")));
    }

    #[test]
    fn missing_id_on_either_side_falls_back_to_content() {
        assert!(key(None, "T", "D").matches(&key(Some("b"), "T", "D")));
        assert!(key(Some("a"), "T", "D").matches(&key(None, "T", "D")));
        assert!(key(None, "T", "D").matches(&key(None, "T", "D")));
    }

    #[test]
    fn fallback_requires_both_title_and_description() {
        assert!(!key(None, "T", "D").matches(&key(None, "T", "other")));
        assert!(!key(None, "T", "D").matches(&key(None, "other", "D")));
    }

    #[test]
    fn new_ids_are_unique_uuids() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }
}
