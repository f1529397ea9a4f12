//! Wraparound-aware contiguity check and check-in/check-out resolution.
//!
//! A pattern is contiguous when its weekdays form one unbroken run. Runs may
//! cross the Saturday -> Sunday boundary: `{5, 6, 0}` is Fri-Sat-Sun. In
//! index order such a run shows exactly one gap, and the days after the gap
//! are the start of the run.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::weekly_pattern::{WeekdayIndex, WeeklyPattern};

/// The single break in a week-wrapping run, in ascending index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WraparoundGap {
    /// Last day of the run (the element before the gap).
    pub before: WeekdayIndex,
    /// First day of the run (the element after the gap).
    pub after: WeekdayIndex,
}

/// Check-in and check-out weekdays of a weekly pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInOut {
    pub check_in: WeekdayIndex,
    pub check_out: WeekdayIndex,
}

/// Positions `i` in `sorted` where the step to `sorted[i + 1]` exceeds one day.
fn gap_positions(sorted: &[WeekdayIndex]) -> Vec<usize> {
    sorted
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1].index() - pair[0].index() > 1)
        .map(|(i, _)| i)
        .collect()
}

fn ensure_non_empty(pattern: WeeklyPattern) -> Result<(), CoreError> {
    if pattern.is_empty() {
        return Err(CoreError::InvalidPattern("no weekdays selected".into()));
    }
    Ok(())
}

/// Locate the wraparound gap, if the pattern wraps through the week boundary.
///
/// Only a non-full-week pattern holding both Saturday and Sunday with exactly
/// one internal gap wraps.
pub fn find_wraparound_gap(pattern: WeeklyPattern) -> Option<WraparoundGap> {
    if pattern.is_full_week()
        || !pattern.contains(WeekdayIndex::SUNDAY)
        || !pattern.contains(WeekdayIndex::SATURDAY)
    {
        return None;
    }
    let sorted = pattern.to_sorted_vec();
    match gap_positions(&sorted).as_slice() {
        [i] => Some(WraparoundGap {
            before: sorted[*i],
            after: sorted[*i + 1],
        }),
        _ => None,
    }
}

/// Whether the pattern is one unbroken run of weekdays.
///
/// Errors on an empty pattern; that is invalid input, not a "no".
pub fn is_contiguous(pattern: WeeklyPattern) -> Result<bool, CoreError> {
    ensure_non_empty(pattern)?;
    if pattern.is_full_week() {
        return Ok(true);
    }
    let gaps = gap_positions(&pattern.to_sorted_vec()).len();
    let wraps = pattern.contains(WeekdayIndex::SUNDAY) && pattern.contains(WeekdayIndex::SATURDAY);
    Ok(gaps == 0 || (wraps && gaps == 1))
}

/// Derive check-in and check-out weekdays.
///
/// Does not check contiguity: a non-contiguous pattern resolves to its
/// smallest and largest index, which callers should not treat as a real
/// schedule.
pub fn resolve_check_in_out(pattern: WeeklyPattern) -> Result<CheckInOut, CoreError> {
    ensure_non_empty(pattern)?;
    if let Some(gap) = find_wraparound_gap(pattern) {
        return Ok(CheckInOut {
            check_in: gap.after,
            check_out: gap.before,
        });
    }
    let sorted = pattern.to_sorted_vec();
    match (sorted.first(), sorted.last()) {
        (Some(&check_in), Some(&check_out)) => Ok(CheckInOut {
            check_in,
            check_out,
        }),
        _ => Err(CoreError::InvalidPattern("no weekdays selected".into())),
    }
}

/// Weekdays whose nights are slept: the run from check-in up to, but not
/// including, check-out. A full week sleeps every night.
pub fn occupied_nights(pattern: WeeklyPattern) -> Result<WeeklyPattern, CoreError> {
    if pattern.is_full_week() {
        return Ok(pattern);
    }
    let days = resolve_check_in_out(pattern)?;
    Ok(pattern
        .iter()
        .filter(|&day| day != days.check_out)
        .collect())
}
