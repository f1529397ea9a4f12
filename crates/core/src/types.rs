use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Currency amounts in the listing's currency unit.
pub type Money = f64;

/// All scheduling is done on plain Gregorian dates, no timezone.
pub type CalendarDate = chrono::NaiveDate;

/// Number of weeks the weekly pattern repeats for one lease. Always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ReservationSpan(u32);

impl ReservationSpan {
    pub fn new(weeks: u32) -> Result<Self, CoreError> {
        if weeks == 0 {
            return Err(CoreError::Validation(
                "reservation span must be at least one week".into(),
            ));
        }
        Ok(Self(weeks))
    }

    pub fn weeks(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for ReservationSpan {
    type Error = CoreError;

    fn try_from(weeks: u32) -> Result<Self, Self::Error> {
        Self::new(weeks)
    }
}

impl From<ReservationSpan> for u32 {
    fn from(span: ReservationSpan) -> Self {
        span.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_weeks_rejected() {
        assert!(ReservationSpan::new(0).is_err());
    }

    #[test]
    fn deserialize_enforces_positive_span() {
        assert!(serde_json::from_str::<ReservationSpan>("0").is_err());
        let span: ReservationSpan = serde_json::from_str("13").unwrap();
        assert_eq!(span.weeks(), 13);
    }
}
