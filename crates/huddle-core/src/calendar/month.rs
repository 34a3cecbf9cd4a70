use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDate};

use huddle_db::models::PlanningItem;

use super::{Occurrence, occurrences_on_day};

/// A calendar month, the unit the month grid and share text work in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

/// Error returned when parsing an invalid `YYYY-MM` string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid month: {0:?} (expected YYYY-MM)")]
pub struct YearMonthParseError(pub String);

impl YearMonth {
    /// `month` is 1-based. Returns `None` outside 1..=12 or chrono's year range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// The month containing `day`.
    pub fn containing(day: NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// English month name, e.g. `"March"`.
    pub fn name(self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("", |m| m.name())
    }

    pub fn first_day(self) -> NaiveDate {
        // Constructors guarantee the first of the month exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn days_in_month(self) -> u32 {
        let next = self.next().first_day();
        u32::try_from((next - self.first_day()).num_days()).unwrap_or(0)
    }

    /// Every date of the month in order.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        first.iter_days().take(self.days_in_month() as usize)
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year)
    }
}

impl FromStr for YearMonth {
    type Err = YearMonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || YearMonthParseError(s.to_owned());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

// ---------------------------------------------------------------------------
// Month grid
// ---------------------------------------------------------------------------

/// One day of the month grid with everything scheduled on it.
#[derive(Debug, Clone)]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    pub occurrences: Vec<Occurrence<'a>>,
}

/// A month laid out as Sunday-first weeks.
///
/// The first week is padded with blank cells up to the weekday of the 1st;
/// the last week is padded to a full seven cells.
#[derive(Debug, Clone)]
pub struct MonthView<'a> {
    pub month: YearMonth,
    pub days: Vec<DayCell<'a>>,
}

impl<'a> MonthView<'a> {
    pub fn build(items: &'a [PlanningItem], month: YearMonth) -> Self {
        let days = month
            .days()
            .map(|date| DayCell {
                date,
                occurrences: occurrences_on_day(items, date),
            })
            .collect();
        Self { month, days }
    }

    /// Blank cells before the 1st (0 when the month starts on a Sunday).
    pub fn leading_blanks(&self) -> usize {
        self.month.first_day().weekday().num_days_from_sunday() as usize
    }

    /// Rows of seven cells, `None` for padding.
    pub fn weeks(&self) -> Vec<[Option<&DayCell<'a>>; 7]> {
        let cells: Vec<Option<&DayCell<'a>>> = std::iter::repeat_n(None, self.leading_blanks())
            .chain(self.days.iter().map(Some))
            .collect();

        cells
            .chunks(7)
            .map(|chunk| {
                let mut row = [None; 7];
                for (slot, cell) in row.iter_mut().zip(chunk) {
                    *slot = *cell;
                }
                row
            })
            .collect()
    }

    /// Days that have at least one occurrence.
    pub fn busy_days(&self) -> impl Iterator<Item = &DayCell<'a>> {
        self.days.iter().filter(|d| !d.occurrences.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.busy_days().next().is_none()
    }
}
