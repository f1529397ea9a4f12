//! End-to-end evaluation of a guest's booking selection.
//!
//! Runs schedule validation, check-in resolution, move-in validation and
//! pricing in one pass and returns a serialisable summary for the booking
//! widget and the proposal payload. "Today" is always the caller-supplied
//! `reference_date`.

use chrono::Days;
use serde::{Deserialize, Serialize};

use crate::availability::ListingAvailabilityConfig;
use crate::check_in::{next_available_check_in, reservation_dates, ReservationDates};
use crate::config::PricingPolicy;
use crate::contiguity::{resolve_check_in_out, CheckInOut};
use crate::listing_adapter::ListingProfile;
use crate::move_in::{validate_move_in, MoveInValidationResult};
use crate::pricing::{compute_price_breakdown, PriceBreakdown};
use crate::schedule::{validate_schedule, ScheduleValidationResult};
use crate::types::{CalendarDate, ReservationSpan};
use crate::weekly_pattern::WeeklyPattern;

/// How far ahead [`suggest_move_in`] searches, in weeks.
pub const MAX_SUGGESTION_WEEKS: u32 = 104;

/// The guest's selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub pattern: WeeklyPattern,
    /// Chosen move-in date. When absent the earliest valid date is suggested.
    #[serde(default)]
    pub move_in: Option<CalendarDate>,
    pub span: ReservationSpan,
}

/// Result of [`evaluate_booking`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingEvaluation {
    pub schedule: ScheduleValidationResult,
    /// Present only for contiguous selections.
    pub check_in_out: Option<CheckInOut>,
    pub next_available_check_in: Option<CalendarDate>,
    /// The requested move-in date, or the suggested one.
    pub move_in_date: Option<CalendarDate>,
    pub move_in: Option<MoveInValidationResult>,
    pub reservation: Option<ReservationDates>,
    pub price: PriceBreakdown,
    pub bookable: bool,
}

/// Availability with the window clipped so nothing before `reference_date`
/// is offered.
fn effective_availability(
    config: &ListingAvailabilityConfig,
    reference_date: CalendarDate,
) -> ListingAvailabilityConfig {
    let mut config = config.clone();
    config.first_available_date = config.first_available_date.max(reference_date);
    config
}

/// Earliest check-in date on or after the effective first available date
/// that passes move-in validation, searching at most
/// [`MAX_SUGGESTION_WEEKS`] weeks ahead.
pub fn suggest_move_in(
    pattern: WeeklyPattern,
    config: &ListingAvailabilityConfig,
    reference_date: CalendarDate,
) -> Option<CalendarDate> {
    let config = effective_availability(config, reference_date);
    let mut candidate = next_available_check_in(pattern, config.first_available_date).ok()?;

    for _ in 0..MAX_SUGGESTION_WEEKS {
        if matches!(config.last_available_date, Some(last) if candidate > last) {
            return None;
        }
        if validate_move_in(candidate, &config, pattern).valid {
            return Some(candidate);
        }
        candidate = candidate.checked_add_days(Days::new(7))?;
    }
    None
}

/// Evaluate a booking selection against a listing.
pub fn evaluate_booking(
    request: &BookingRequest,
    profile: &ListingProfile,
    policy: &PricingPolicy,
    reference_date: CalendarDate,
) -> BookingEvaluation {
    let pattern = request.pattern;
    let availability = effective_availability(&profile.availability, reference_date);

    let schedule = validate_schedule(pattern, &availability, policy.night_count_rule);

    let check_in_out = if schedule.contiguous {
        resolve_check_in_out(pattern).ok()
    } else {
        None
    };
    let next_available = check_in_out
        .and_then(|_| next_available_check_in(pattern, availability.first_available_date).ok());

    let move_in_date = match request.move_in {
        Some(date) => Some(date),
        None if schedule.contiguous => suggest_move_in(pattern, &availability, reference_date),
        None => None,
    };
    let move_in = move_in_date.map(|date| validate_move_in(date, &availability, pattern));

    let reservation = match (move_in_date, move_in) {
        (Some(date), Some(result)) if result.valid => {
            reservation_dates(date, pattern, request.span).ok()
        }
        _ => None,
    };

    let price = compute_price_breakdown(
        pattern,
        request.span,
        &profile.rates,
        &profile.fees,
        policy,
    );

    let bookable = schedule.valid
        && schedule.contiguous
        && move_in.is_some_and(|result| result.valid)
        && reservation.is_some()
        && price.valid;

    tracing::debug!(
        days = ?Vec::<u8>::from(pattern),
        weeks = request.span.weeks(),
        %reference_date,
        bookable,
        "Evaluated booking selection"
    );

    BookingEvaluation {
        schedule,
        check_in_out,
        next_available_check_in: next_available,
        move_in_date,
        move_in,
        reservation,
        price,
        bookable,
    }
}
