use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How demanding a plan is to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(s)
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(DifficultyParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Difficulty`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid difficulty: {0:?} (expected Low, Medium, or High)")]
pub struct DifficultyParseError(pub String);

// ---------------------------------------------------------------------------

/// Rough cost band of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cost {
    Free,
    Low,
    Medium,
    High,
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Free => "Free",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(s)
    }
}

impl FromStr for Cost {
    type Err = CostParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(CostParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Cost`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid cost: {0:?} (expected Free, Low, Medium, or High)")]
pub struct CostParseError(pub String);

// ---------------------------------------------------------------------------

/// Recurrence rule relative to a plan's anchor date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    #[default]
    None,
    Weekly,
    Monthly,
}

impl Recurrence {
    /// Whether this rule produces occurrences beyond the anchor date.
    pub fn is_recurring(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "None",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        };
        f.write_str(s)
    }
}

impl FromStr for Recurrence {
    type Err = RecurrenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(RecurrenceParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Recurrence`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid recurrence: {0:?} (expected None, Weekly, or Monthly)")]
pub struct RecurrenceParseError(pub String);

// ---------------------------------------------------------------------------

/// Kind tag of a generated promotional artifact.
///
/// The four built-in kinds come from the promotion tools; anything else
/// read from a snapshot or typed by the user is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaKind {
    Poster,
    Script,
    Caption,
    WhatsApp,
    Other(String),
}

impl MediaKind {
    /// The built-in kinds, in the order the promotion tools list them.
    pub const BUILT_IN: [MediaKind; 4] = [
        MediaKind::Poster,
        MediaKind::Script,
        MediaKind::Caption,
        MediaKind::WhatsApp,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Poster => "Poster",
            Self::Script => "Script",
            Self::Caption => "Caption",
            Self::WhatsApp => "WhatsApp",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MediaKind {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "poster" => Self::Poster,
            "script" => Self::Script,
            "caption" => Self::Caption,
            "whatsapp" => Self::WhatsApp,
            _ => Self::Other(s),
        }
    }
}

impl From<MediaKind> for String {
    fn from(kind: MediaKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl FromStr for MediaKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A generated or hand-edited activity plan.
///
/// Field names serialize in camelCase so snapshots exported from the
/// browser version of the planner load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningItem {
    /// Durable identifier. `None` while the item is ephemeral.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub materials_needed: Vec<String>,
    pub steps: Vec<String>,
    pub scripture_reference: String,
    pub suggested_duration: String,
    pub difficulty_level: Difficulty,
    pub estimated_cost: Cost,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_team_members: Option<Vec<String>>,
    /// Anchor date. Recurrence is computed relative to this.
    #[serde(
        default,
        with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Set the first time the item enters the saved collection.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub saved_at: Option<DateTime<Utc>>,
}

impl PlanningItem {
    /// Whether the item has never been given a durable identifier.
    pub fn is_ephemeral(&self) -> bool {
        self.id.is_none()
    }

    /// Check the invariants that editing paths must preserve.
    pub fn validate(&self) -> Result<(), ItemError> {
        if self.recurrence.is_recurring() && self.assigned_date.is_none() {
            return Err(ItemError::RecurrenceWithoutAnchor {
                title: self.title.clone(),
                recurrence: self.recurrence,
            });
        }
        Ok(())
    }
}

/// Violations of [`PlanningItem`] invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    #[error("plan {title:?} has {recurrence} recurrence but no date to repeat from")]
    RecurrenceWithoutAnchor { title: String, recurrence: Recurrence },
}

/// A saved promotional artifact (poster strategy, script, caption, message).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl MediaItem {
    /// Category label used for grouping when none was set.
    pub const UNCATEGORIZED: &str = "Uncategorized";

    /// The category this item files under, falling back to
    /// [`Self::UNCATEGORIZED`].
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(Self::UNCATEGORIZED)
    }
}

/// `YYYY-MM-DD` dates where an empty string means "not scheduled".
mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, FORMAT)
                .map(Some)
                .map_err(|e| serde::de::Error::custom(format!("invalid date {s:?}: {e}"))),
        }
    }
}
