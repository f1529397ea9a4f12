//! Weekday and weekly-pattern value types.
//!
//! A [`WeeklyPattern`] is the recurring set of weekdays a guest occupies a
//! unit, repeated every week of the lease. Weekdays are indexed Sunday-first
//! (0 = Sunday ... 6 = Saturday) to match the listing data.

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::CalendarDate;

/// Days in a week.
pub const DAYS_PER_WEEK: u8 = 7;

/// Short labels indexed by [`WeekdayIndex`].
const SHORT_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Full English names indexed by [`WeekdayIndex`].
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

// ---------------------------------------------------------------------------
// WeekdayIndex
// ---------------------------------------------------------------------------

/// One day of the week, 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekdayIndex(u8);

impl WeekdayIndex {
    pub const SUNDAY: Self = Self(0);
    pub const MONDAY: Self = Self(1);
    pub const TUESDAY: Self = Self(2);
    pub const WEDNESDAY: Self = Self(3);
    pub const THURSDAY: Self = Self(4);
    pub const FRIDAY: Self = Self(5);
    pub const SATURDAY: Self = Self(6);

    pub fn new(index: u8) -> Result<Self, CoreError> {
        if index >= DAYS_PER_WEEK {
            return Err(CoreError::Validation(format!(
                "weekday index must be between 0 and 6, got {index}"
            )));
        }
        Ok(Self(index))
    }

    /// Weekday of a calendar date.
    pub fn of_date(date: CalendarDate) -> Self {
        Self::from(date.weekday())
    }

    /// Parse an English weekday name or 3-letter abbreviation, any case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        WEEKDAY_NAMES
            .iter()
            .position(|full| {
                full.eq_ignore_ascii_case(name)
                    || (name.len() == 3 && full[..3].eq_ignore_ascii_case(name))
            })
            .map(|i| Self(i as u8))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn short_name(self) -> &'static str {
        SHORT_NAMES[self.0 as usize]
    }

    pub fn name(self) -> &'static str {
        WEEKDAY_NAMES[self.0 as usize]
    }

    /// Days to move forward from `self` to reach `target` (0..=6).
    pub fn days_until(self, target: Self) -> u8 {
        (target.0 + DAYS_PER_WEEK - self.0) % DAYS_PER_WEEK
    }
}

impl TryFrom<u8> for WeekdayIndex {
    type Error = CoreError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl From<WeekdayIndex> for u8 {
    fn from(day: WeekdayIndex) -> Self {
        day.0
    }
}

impl From<Weekday> for WeekdayIndex {
    fn from(day: Weekday) -> Self {
        Self(day.num_days_from_sunday() as u8)
    }
}

impl From<WeekdayIndex> for Weekday {
    fn from(day: WeekdayIndex) -> Self {
        match day.0 {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }
}

impl std::fmt::Display for WeekdayIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// WeeklyPattern
// ---------------------------------------------------------------------------

/// Ordered-unique set of weekdays, stored as a 7-bit mask.
///
/// An empty pattern is representable so that "nothing selected yet" can flow
/// through the validators, which report it as a soft error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeeklyPattern(u8);

impl WeeklyPattern {
    const FULL_MASK: u8 = 0b0111_1111;

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn full_week() -> Self {
        Self(Self::FULL_MASK)
    }

    /// Build from raw indices. Rejects out-of-range values and duplicates.
    pub fn from_indices(indices: &[u8]) -> Result<Self, CoreError> {
        let mut mask = 0u8;
        for &index in indices {
            let day = WeekdayIndex::new(index)?;
            let bit = 1 << day.0;
            if mask & bit != 0 {
                return Err(CoreError::InvalidPattern(format!(
                    "weekday {index} selected more than once"
                )));
            }
            mask |= bit;
        }
        Ok(Self(mask))
    }

    /// Build from weekdays; repeated days collapse into one.
    pub fn from_weekdays<I>(days: I) -> Self
    where
        I: IntoIterator<Item = WeekdayIndex>,
    {
        Self(days.into_iter().fold(0, |mask, day| mask | (1 << day.0)))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_full_week(self) -> bool {
        self.0 == Self::FULL_MASK
    }

    pub fn contains(self, day: WeekdayIndex) -> bool {
        self.0 & (1 << day.0) != 0
    }

    /// Whether any weekday is in both patterns.
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Weekdays present in both patterns.
    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Weekdays in ascending index order.
    pub fn iter(self) -> impl Iterator<Item = WeekdayIndex> {
        (0..DAYS_PER_WEEK)
            .filter(move |i| self.0 & (1 << i) != 0)
            .map(WeekdayIndex)
    }

    pub fn to_sorted_vec(self) -> Vec<WeekdayIndex> {
        self.iter().collect()
    }

    /// Day-pill summary, e.g. `"Mon - Fri"`, `"Sat - Sun"` or `"Every day"`.
    ///
    /// Non-contiguous selections list every day instead of a range.
    pub fn summary_label(self) -> String {
        if self.is_empty() {
            return String::new();
        }
        if self.is_full_week() {
            return "Every day".to_string();
        }

        let sorted = self.to_sorted_vec();
        let run = match crate::contiguity::find_wraparound_gap(self) {
            Some(gap) => Some((gap.after, gap.before)),
            None if sorted
                .windows(2)
                .all(|pair| pair[1].index() == pair[0].index() + 1) =>
            {
                Some((sorted[0], sorted[sorted.len() - 1]))
            }
            None => None,
        };

        match run {
            Some((first, last)) if first == last => first.short_name().to_string(),
            Some((first, last)) => format!("{} - {}", first.short_name(), last.short_name()),
            None => sorted
                .into_iter()
                .map(WeekdayIndex::short_name)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl TryFrom<Vec<u8>> for WeeklyPattern {
    type Error = CoreError;

    fn try_from(indices: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(&indices)
    }
}

impl From<WeeklyPattern> for Vec<u8> {
    fn from(pattern: WeeklyPattern) -> Self {
        pattern.iter().map(u8::from).collect()
    }
}

impl FromIterator<WeekdayIndex> for WeeklyPattern {
    fn from_iter<I: IntoIterator<Item = WeekdayIndex>>(iter: I) -> Self {
        Self::from_weekdays(iter)
    }
}
