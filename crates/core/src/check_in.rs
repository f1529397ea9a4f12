//! Anchoring a weekly pattern to calendar dates.

use chrono::Days;
use serde::{Deserialize, Serialize};

use crate::contiguity::resolve_check_in_out;
use crate::error::CoreError;
use crate::types::{CalendarDate, ReservationSpan};
use crate::weekly_pattern::{WeekdayIndex, WeeklyPattern, DAYS_PER_WEEK};

/// Earliest date on or after `min_date` that falls on the pattern's
/// check-in weekday.
pub fn next_available_check_in(
    pattern: WeeklyPattern,
    min_date: CalendarDate,
) -> Result<CalendarDate, CoreError> {
    let check_in = resolve_check_in_out(pattern)?.check_in;

    let mut candidate = min_date;
    for _ in 0..DAYS_PER_WEEK {
        if WeekdayIndex::of_date(candidate) == check_in {
            return Ok(candidate);
        }
        candidate = candidate
            .succ_opt()
            .ok_or_else(|| CoreError::Validation(format!("no date after {candidate}")))?;
    }
    // Seven consecutive dates cover every weekday.
    Err(CoreError::Validation(format!(
        "no {check_in} within a week of {min_date}"
    )))
}

/// Calendar dates a lease covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationDates {
    pub move_in: CalendarDate,
    /// Check-out date of the first week.
    pub first_check_out: CalendarDate,
    /// Check-out date of the final week.
    pub move_out: CalendarDate,
}

/// Resolve first check-out and final move-out dates for a lease starting on
/// `move_in` (assumed to be a check-in day).
///
/// Fails with [`CoreError::Validation`] when the lease runs past the last
/// representable date.
pub fn reservation_dates(
    move_in: CalendarDate,
    pattern: WeeklyPattern,
    span: ReservationSpan,
) -> Result<ReservationDates, CoreError> {
    let days = resolve_check_in_out(pattern)?;
    let stay_days = if pattern.is_full_week() {
        u64::from(DAYS_PER_WEEK)
    } else {
        u64::from(days.check_in.days_until(days.check_out))
    };
    let later_weeks_days = (u64::from(span.weeks()) - 1) * u64::from(DAYS_PER_WEEK);

    let out_of_range = || {
        CoreError::Validation(format!(
            "a {}-week lease from {move_in} ends past the supported calendar",
            span.weeks()
        ))
    };
    let first_check_out = move_in
        .checked_add_days(Days::new(stay_days))
        .ok_or_else(out_of_range)?;
    let move_out = first_check_out
        .checked_add_days(Days::new(later_weeks_days))
        .ok_or_else(out_of_range)?;

    Ok(ReservationDates {
        move_in,
        first_check_out,
        move_out,
    })
}
