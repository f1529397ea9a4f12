use serde::{Deserialize, Serialize};

/// Hard failures: contract violations by an internal caller or malformed
/// collaborator data. User-facing rejections are reported as [`ErrorCode`]
/// inside result structs instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid weekly pattern: {0}")]
    InvalidPattern(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid listing field '{field}': {reason}")]
    InvalidListing { field: &'static str, reason: String },

    #[error("Invalid configuration {var}: {reason}")]
    Config { var: &'static str, reason: String },
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

// ---------------------------------------------------------------------------
// Soft error codes
// ---------------------------------------------------------------------------

/// Closed set of recoverable rejection codes. The UI maps each one to a
/// message and re-prompts the user for a different selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoDaysSelected,
    InvalidPattern,
    BelowMinimumNights,
    AboveMaximumNights,
    DayNotAvailable,
    BeforeFirstAvailable,
    AfterLastAvailable,
    DateBlocked,
    WeekdayMismatch,
    RateNotFound,
}

impl ErrorCode {
    /// Wire value, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoDaysSelected => "NO_DAYS_SELECTED",
            Self::InvalidPattern => "INVALID_PATTERN",
            Self::BelowMinimumNights => "BELOW_MINIMUM_NIGHTS",
            Self::AboveMaximumNights => "ABOVE_MAXIMUM_NIGHTS",
            Self::DayNotAvailable => "DAY_NOT_AVAILABLE",
            Self::BeforeFirstAvailable => "BEFORE_FIRST_AVAILABLE",
            Self::AfterLastAvailable => "AFTER_LAST_AVAILABLE",
            Self::DateBlocked => "DATE_BLOCKED",
            Self::WeekdayMismatch => "WEEKDAY_MISMATCH",
            Self::RateNotFound => "RATE_NOT_FOUND",
        }
    }

    /// Human-readable message for display in the booking widget.
    pub fn message(self) -> &'static str {
        match self {
            Self::NoDaysSelected => "Select at least one day",
            Self::InvalidPattern => "The selected days do not form a valid schedule",
            Self::BelowMinimumNights => "Fewer nights than the host's minimum",
            Self::AboveMaximumNights => "More nights than the host's maximum",
            Self::DayNotAvailable => "One of the selected days is not available",
            Self::BeforeFirstAvailable => "Move-in is before the listing becomes available",
            Self::AfterLastAvailable => "Move-in is after the listing's last available date",
            Self::DateBlocked => "The host has blocked this date",
            Self::WeekdayMismatch => "Move-in must fall on the schedule's check-in day",
            Self::RateNotFound => "No nightly rate for this number of nights",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_matches_as_str() {
        for code in [
            ErrorCode::NoDaysSelected,
            ErrorCode::InvalidPattern,
            ErrorCode::BelowMinimumNights,
            ErrorCode::AboveMaximumNights,
            ErrorCode::DayNotAvailable,
            ErrorCode::BeforeFirstAvailable,
            ErrorCode::AfterLastAvailable,
            ErrorCode::DateBlocked,
            ErrorCode::WeekdayMismatch,
            ErrorCode::RateNotFound,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn display_uses_wire_value() {
        assert_eq!(ErrorCode::DateBlocked.to_string(), "DATE_BLOCKED");
    }

    #[test]
    fn core_error_messages_name_the_field() {
        let err = CoreError::InvalidListing {
            field: "minimum_nights_per_week",
            reason: "not a number".into(),
        };
        assert!(err.to_string().contains("minimum_nights_per_week"));
    }
}
