//! Move-in date validation against a listing's availability window.

use serde::{Deserialize, Serialize};

use crate::availability::ListingAvailabilityConfig;
use crate::contiguity::resolve_check_in_out;
use crate::error::ErrorCode;
use crate::types::CalendarDate;
use crate::weekly_pattern::{WeekdayIndex, WeeklyPattern};

/// Outcome of [`validate_move_in`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInValidationResult {
    pub valid: bool,
    pub error_code: Option<ErrorCode>,
}

impl MoveInValidationResult {
    fn ok() -> Self {
        Self {
            valid: true,
            error_code: None,
        }
    }

    fn rejected(code: ErrorCode) -> Self {
        Self {
            valid: false,
            error_code: Some(code),
        }
    }
}

/// Check a candidate move-in date. Returns the first failing check, in order:
/// first available date, last available date, blocked ranges, check-in
/// weekday.
pub fn validate_move_in(
    candidate: CalendarDate,
    config: &ListingAvailabilityConfig,
    pattern: WeeklyPattern,
) -> MoveInValidationResult {
    match first_violation(candidate, config, pattern) {
        None => MoveInValidationResult::ok(),
        Some(code) => {
            tracing::debug!(%candidate, code = %code, "Move-in date rejected");
            MoveInValidationResult::rejected(code)
        }
    }
}

fn first_violation(
    candidate: CalendarDate,
    config: &ListingAvailabilityConfig,
    pattern: WeeklyPattern,
) -> Option<ErrorCode> {
    if candidate < config.first_available_date {
        return Some(ErrorCode::BeforeFirstAvailable);
    }
    if matches!(config.last_available_date, Some(last) if candidate > last) {
        return Some(ErrorCode::AfterLastAvailable);
    }
    if config.is_blocked(candidate) {
        return Some(ErrorCode::DateBlocked);
    }
    let check_in = match resolve_check_in_out(pattern) {
        Ok(days) => days.check_in,
        Err(_) => return Some(ErrorCode::InvalidPattern),
    };
    if WeekdayIndex::of_date(candidate) != check_in {
        return Some(ErrorCode::WeekdayMismatch);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::BlockedDateRange;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekdays() -> WeeklyPattern {
        WeeklyPattern::from_indices(&[1, 2, 3, 4, 5]).unwrap()
    }

    /// Open Mondays 2024-01-01 through 2024-06-24; 2024-02-05 .. 2024-02-12 blocked.
    fn config() -> ListingAvailabilityConfig {
        ListingAvailabilityConfig {
            minimum_nights_per_week: 2,
            maximum_nights_per_week: 7,
            days_not_available: WeeklyPattern::empty(),
            first_available_date: date(2024, 1, 1),
            last_available_date: Some(date(2024, 6, 24)),
            blocked_date_ranges: vec![
                BlockedDateRange::new(date(2024, 2, 5), date(2024, 2, 12)).unwrap(),
            ],
        }
    }

    fn code(candidate: CalendarDate) -> Option<ErrorCode> {
        validate_move_in(candidate, &config(), weekdays()).error_code
    }

    #[test]
    fn monday_inside_window_accepted() {
        let result = validate_move_in(date(2024, 1, 15), &config(), weekdays());
        assert!(result.valid);
        assert_eq!(result.error_code, None);
    }

    #[test]
    fn first_and_last_available_dates_inclusive() {
        assert_eq!(code(date(2024, 1, 1)), None);
        assert_eq!(code(date(2024, 6, 24)), None);
    }

    #[test]
    fn before_first_available() {
        assert_eq!(code(date(2023, 12, 25)), Some(ErrorCode::BeforeFirstAvailable));
    }

    #[test]
    fn after_last_available() {
        assert_eq!(code(date(2024, 7, 1)), Some(ErrorCode::AfterLastAvailable));
    }

    #[test]
    fn open_ended_window_has_no_upper_bound() {
        let mut c = config();
        c.last_available_date = None;
        assert!(validate_move_in(date(2030, 1, 7), &c, weekdays()).valid);
    }

    #[test]
    fn blocked_range_bounds_inclusive() {
        assert_eq!(code(date(2024, 2, 5)), Some(ErrorCode::DateBlocked));
        assert_eq!(code(date(2024, 2, 12)), Some(ErrorCode::DateBlocked));
        assert_eq!(code(date(2024, 2, 19)), None);
    }

    #[test]
    fn wrong_weekday_rejected() {
        // Tuesday.
        assert_eq!(code(date(2024, 1, 16)), Some(ErrorCode::WeekdayMismatch));
    }

    #[test]
    fn window_checked_before_weekday() {
        // Sunday before the window opens reports the window, not the weekday.
        assert_eq!(code(date(2023, 12, 31)), Some(ErrorCode::BeforeFirstAvailable));
    }

    #[test]
    fn empty_pattern_reports_invalid_pattern() {
        let result = validate_move_in(date(2024, 1, 15), &config(), WeeklyPattern::empty());
        assert_eq!(result.error_code, Some(ErrorCode::InvalidPattern));
        assert!(!result.valid);
    }

    #[test]
    fn revalidation_is_idempotent() {
        let c = config();
        let mut day = date(2024, 1, 1);
        while day <= date(2024, 3, 31) {
            let first = validate_move_in(day, &c, weekdays());
            if first.valid {
                assert_eq!(validate_move_in(day, &c, weekdays()), first);
            }
            day = day.succ_opt().unwrap();
        }
    }
}
