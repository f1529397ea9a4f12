//! Listing-side scheduling constraints.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::types::CalendarDate;
use crate::weekly_pattern::WeeklyPattern;

/// A closed interval of dates the host has blocked. Both ends inclusive,
/// never inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DateSpan")]
pub struct BlockedDateRange {
    start: CalendarDate,
    end: CalendarDate,
}

#[derive(Deserialize)]
struct DateSpan {
    start: CalendarDate,
    end: CalendarDate,
}

impl TryFrom<DateSpan> for BlockedDateRange {
    type Error = CoreError;

    fn try_from(span: DateSpan) -> Result<Self, Self::Error> {
        Self::new(span.start, span.end)
    }
}

impl BlockedDateRange {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::Validation(format!(
                "blocked range ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single_day(date: CalendarDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> CalendarDate {
        self.start
    }

    pub fn end(&self) -> CalendarDate {
        self.end
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Sort and merge overlapping or adjacent ranges.
    pub fn merge_all(mut ranges: Vec<Self>) -> Vec<Self> {
        ranges.sort_by_key(|range| range.start);

        let mut merged: Vec<Self> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if last.end.succ_opt().map_or(true, |next| range.start <= next) => {
                    last.end = last.end.max(range.end);
                }
                _ => merged.push(range),
            }
        }
        merged
    }
}

/// Scheduling constraints for one listing, assembled by the caller.
///
/// Deserialising runs [`ListingAvailabilityConfig::validate_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(try_from = "AvailabilityRecord")]
#[validate(schema(function = "validate_constraints"))]
pub struct ListingAvailabilityConfig {
    #[validate(range(max = 7))]
    pub minimum_nights_per_week: u32,
    #[validate(range(max = 7))]
    pub maximum_nights_per_week: u32,
    /// Weekdays the host never offers.
    pub days_not_available: WeeklyPattern,
    pub first_available_date: CalendarDate,
    pub last_available_date: Option<CalendarDate>,
    pub blocked_date_ranges: Vec<BlockedDateRange>,
}

#[derive(Deserialize)]
struct AvailabilityRecord {
    minimum_nights_per_week: u32,
    maximum_nights_per_week: u32,
    #[serde(default)]
    days_not_available: WeeklyPattern,
    first_available_date: CalendarDate,
    #[serde(default)]
    last_available_date: Option<CalendarDate>,
    #[serde(default)]
    blocked_date_ranges: Vec<BlockedDateRange>,
}

impl TryFrom<AvailabilityRecord> for ListingAvailabilityConfig {
    type Error = CoreError;

    fn try_from(record: AvailabilityRecord) -> Result<Self, Self::Error> {
        let config = Self {
            minimum_nights_per_week: record.minimum_nights_per_week,
            maximum_nights_per_week: record.maximum_nights_per_week,
            days_not_available: record.days_not_available,
            first_available_date: record.first_available_date,
            last_available_date: record.last_available_date,
            blocked_date_ranges: record.blocked_date_ranges,
        };
        config.validate_config()?;
        Ok(config)
    }
}

impl ListingAvailabilityConfig {
    /// Run all structural checks, mapping failures into [`CoreError`].
    pub fn validate_config(&self) -> Result<(), CoreError> {
        self.validate().map_err(CoreError::from)
    }

    /// The blocked range holding `date`, if any.
    pub fn blocked_range_containing(&self, date: CalendarDate) -> Option<&BlockedDateRange> {
        self.blocked_date_ranges.iter().find(|range| range.contains(date))
    }

    pub fn is_blocked(&self, date: CalendarDate) -> bool {
        self.blocked_range_containing(date).is_some()
    }
}

fn constraint_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_constraints(config: &ListingAvailabilityConfig) -> Result<(), ValidationError> {
    if config.minimum_nights_per_week > config.maximum_nights_per_week {
        return Err(constraint_error(
            "night_bounds",
            format!(
                "minimum nights ({}) exceeds maximum nights ({})",
                config.minimum_nights_per_week, config.maximum_nights_per_week
            ),
        ));
    }
    if let Some(last) = config.last_available_date {
        if last < config.first_available_date {
            return Err(constraint_error(
                "availability_window",
                format!(
                    "last available date {last} is before first available date {}",
                    config.first_available_date
                ),
            ));
        }
    }

    let mut ranges = config.blocked_date_ranges.clone();
    ranges.sort_by_key(|range| range.start);
    for pair in ranges.windows(2) {
        if pair[0].overlaps(&pair[1]) {
            return Err(constraint_error(
                "blocked_ranges",
                format!(
                    "blocked ranges {} .. {} and {} .. {} overlap",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                ),
            ));
        }
    }
    Ok(())
}
