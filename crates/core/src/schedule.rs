//! Weekly-pattern validation against a listing's night bounds and
//! unavailable weekdays.

use serde::{Deserialize, Serialize};

use crate::availability::ListingAvailabilityConfig;
use crate::config::NightCountRule;
use crate::contiguity::is_contiguous;
use crate::error::ErrorCode;
use crate::weekly_pattern::WeeklyPattern;

/// Outcome of [`validate_schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleValidationResult {
    pub valid: bool,
    pub error_code: Option<ErrorCode>,
    pub nights_count: u32,
    /// Informational: non-contiguous selections are shown as a distinct UI
    /// state, they are not rejected here.
    pub contiguous: bool,
}

/// Validate a weekly pattern.
///
/// Precedence is fixed: no days selected, below minimum nights, above
/// maximum nights, unavailable weekday. Bounds are inclusive.
pub fn validate_schedule(
    pattern: WeeklyPattern,
    config: &ListingAvailabilityConfig,
    rule: NightCountRule,
) -> ScheduleValidationResult {
    let nights_count = rule.nights_for(pattern);
    let contiguous = is_contiguous(pattern).unwrap_or(false);

    let error_code = if pattern.is_empty() {
        Some(ErrorCode::NoDaysSelected)
    } else if nights_count < config.minimum_nights_per_week {
        Some(ErrorCode::BelowMinimumNights)
    } else if nights_count > config.maximum_nights_per_week {
        Some(ErrorCode::AboveMaximumNights)
    } else if pattern.intersects(config.days_not_available) {
        Some(ErrorCode::DayNotAvailable)
    } else {
        None
    };

    if let Some(code) = error_code {
        tracing::debug!(
            days = ?Vec::<u8>::from(pattern),
            nights_count,
            min = config.minimum_nights_per_week,
            max = config.maximum_nights_per_week,
            code = %code,
            "Schedule rejected"
        );
    }

    ScheduleValidationResult {
        valid: error_code.is_none(),
        error_code,
        nights_count,
        contiguous,
    }
}
