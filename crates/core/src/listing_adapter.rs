//! Normalise loosely keyed listing records into typed configuration.
//!
//! Listing rows reach the engine from several collaborators, each spelling
//! fields differently (`"Minimum Nights"`, `minimumNights`,
//! `minimum_nights_per_week`, ...). This module is the only place that knows
//! about those spellings; everything downstream works on
//! [`ListingProfile`].

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::availability::{BlockedDateRange, ListingAvailabilityConfig};
use crate::config::MAX_NIGHTS_PER_WEEK;
use crate::error::CoreError;
use crate::pricing::{Fees, RateTable, MIN_RATE_NIGHTS};
use crate::types::{CalendarDate, Money};
use crate::weekly_pattern::{WeekdayIndex, WeeklyPattern};

/// Minimum nights per week assumed when the listing does not say.
pub const DEFAULT_MINIMUM_NIGHTS: u32 = 2;
/// Maximum nights per week assumed when the listing does not say.
pub const DEFAULT_MAXIMUM_NIGHTS: u32 = 7;

// ---------------------------------------------------------------------------
// Key aliases
// ---------------------------------------------------------------------------

const MINIMUM_NIGHTS_KEYS: &[&str] = &[
    "minimum_nights_per_week",
    "minimumNightsPerWeek",
    "minimumNights",
    "Minimum Nights",
];
const MAXIMUM_NIGHTS_KEYS: &[&str] = &[
    "maximum_nights_per_week",
    "maximumNightsPerWeek",
    "maximumNights",
    "Maximum Nights",
];
const DAYS_NOT_AVAILABLE_KEYS: &[&str] = &[
    "days_not_available",
    "daysNotAvailable",
    "Days Not Available",
];
const FIRST_AVAILABLE_KEYS: &[&str] = &[
    "first_available_date",
    "firstAvailableDate",
    "First Available",
];
const LAST_AVAILABLE_KEYS: &[&str] = &[
    "last_available_date",
    "lastAvailableDate",
    "Last Available",
];
const BLOCKED_DATES_KEYS: &[&str] = &[
    "blocked_date_ranges",
    "blockedDateRanges",
    "blockedDates",
    "Dates - Blocked",
];
const RATE_MAP_KEYS: &[&str] = &["rates", "rate_table", "rateTable"];
const DAMAGE_DEPOSIT_KEYS: &[&str] = &["damage_deposit", "damageDeposit", "Damage Deposit"];
const MAINTENANCE_FEE_KEYS: &[&str] = &[
    "maintenance_fee",
    "maintenanceFee",
    "Maintenance Fee",
    "Cleaning Cost / Maintenance Fee",
];

/// Per-tier rate keys, e.g. `"Nightly Host Rate for 4 nights"`.
fn tier_rate_keys(nights: u32) -> [String; 3] {
    [
        format!("Nightly Host Rate for {nights} nights"),
        format!("nightly_rate_{nights}_nights"),
        format!("nightlyRate{nights}Nights"),
    ]
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Everything the engine needs to know about one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingProfile {
    pub availability: ListingAvailabilityConfig,
    pub rates: RateTable,
    pub fees: Fees,
}

/// Assemble a [`ListingProfile`] from a listing record.
///
/// `reference_date` stands in for a missing first available date. The
/// result has passed [`ListingAvailabilityConfig::validate_config`].
pub fn normalize_listing(
    record: &Value,
    reference_date: CalendarDate,
) -> Result<ListingProfile, CoreError> {
    let record = record.as_object().ok_or_else(|| CoreError::InvalidListing {
        field: "listing",
        reason: "expected a JSON object".into(),
    })?;

    let minimum_nights_per_week = match lookup(record, MINIMUM_NIGHTS_KEYS) {
        Some(v) => night_bound(v, "minimum_nights_per_week")?,
        None => DEFAULT_MINIMUM_NIGHTS,
    };
    let maximum_nights_per_week = match lookup(record, MAXIMUM_NIGHTS_KEYS) {
        Some(v) => night_bound(v, "maximum_nights_per_week")?,
        None => DEFAULT_MAXIMUM_NIGHTS,
    };
    let days_not_available = match lookup(record, DAYS_NOT_AVAILABLE_KEYS) {
        Some(v) => weekday_set(v, "days_not_available")?,
        None => WeeklyPattern::empty(),
    };
    let first_available_date = match lookup(record, FIRST_AVAILABLE_KEYS) {
        Some(v) => date(v, "first_available_date")?,
        None => reference_date,
    };
    let last_available_date = lookup(record, LAST_AVAILABLE_KEYS)
        .map(|v| date(v, "last_available_date"))
        .transpose()?;
    let blocked_date_ranges = match lookup(record, BLOCKED_DATES_KEYS) {
        Some(v) => blocked_ranges(v)?,
        None => Vec::new(),
    };

    let availability = ListingAvailabilityConfig {
        minimum_nights_per_week,
        maximum_nights_per_week,
        days_not_available,
        first_available_date,
        last_available_date,
        blocked_date_ranges,
    };
    availability.validate_config()?;

    let rates = rate_table(record)?;
    if rates.is_empty() {
        tracing::warn!("Listing has no nightly rates; every schedule will price as RATE_NOT_FOUND");
    }

    let fees = Fees::new(
        optional_money(record, DAMAGE_DEPOSIT_KEYS, "damage_deposit")?,
        optional_money(record, MAINTENANCE_FEE_KEYS, "maintenance_fee")?,
    )?;

    Ok(ListingProfile {
        availability,
        rates,
        fees,
    })
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// First non-null value under any of `keys`.
fn lookup<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|v| !v.is_null())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidListing {
        field,
        reason: reason.into(),
    }
}

/// Numbers may arrive as JSON numbers or as strings like `"$1,250.00"`.
fn number(value: &Value, field: &'static str) -> Result<f64, CoreError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(field, format!("{n} is not representable"))),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| !matches!(c, '$' | ',' | ' ')).collect();
            cleaned
                .parse()
                .map_err(|_| invalid(field, format!("'{s}' is not a number")))
        }
        other => Err(invalid(field, format!("expected a number, got {other}"))),
    }
}

fn night_bound(value: &Value, field: &'static str) -> Result<u32, CoreError> {
    let n = number(value, field)?;
    if n.fract() != 0.0 || !(0.0..=f64::from(MAX_NIGHTS_PER_WEEK)).contains(&n) {
        return Err(invalid(
            field,
            format!("expected a whole number of nights between 0 and {MAX_NIGHTS_PER_WEEK}, got {n}"),
        ));
    }
    Ok(n as u32)
}

fn optional_money(
    record: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
) -> Result<Money, CoreError> {
    lookup(record, keys)
        .map(|v| number(v, field))
        .transpose()
        .map(|amount| amount.unwrap_or(0.0))
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp whose calendar date is used as
/// written.
fn date(value: &Value, field: &'static str) -> Result<CalendarDate, CoreError> {
    let s = value
        .as_str()
        .ok_or_else(|| invalid(field, format!("expected a date string, got {value}")))?;
    let s = s.trim();
    CalendarDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .map_err(|_| invalid(field, format!("'{s}' is not a date")))
}

/// Weekdays as indices (`[0, 6]`) or English names (`["Sunday", "Sat"]`).
/// Unrecognised entries are skipped with a warning.
fn weekday_set(value: &Value, field: &'static str) -> Result<WeeklyPattern, CoreError> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid(field, "expected a list of weekdays"))?;

    let mut days = Vec::with_capacity(items.len());
    for item in items {
        let day = match item {
            Value::Number(n) => n
                .as_u64()
                .and_then(|i| u8::try_from(i).ok())
                .and_then(|i| WeekdayIndex::new(i).ok()),
            Value::String(s) => WeekdayIndex::from_name(s),
            _ => None,
        };
        match day {
            Some(day) => days.push(day),
            None => tracing::warn!(field, value = %item, "Skipping unrecognised weekday"),
        }
    }
    Ok(WeeklyPattern::from_weekdays(days))
}

/// Blocked dates as single date strings or `{start, end}` objects, merged
/// into sorted non-overlapping ranges.
fn blocked_ranges(value: &Value) -> Result<Vec<BlockedDateRange>, CoreError> {
    const FIELD: &str = "blocked_date_ranges";
    let items = value
        .as_array()
        .ok_or_else(|| invalid(FIELD, "expected a list of dates or ranges"))?;

    let ranges = items
        .iter()
        .map(|item| match item {
            Value::Object(range) => {
                let start = range
                    .get("start")
                    .ok_or_else(|| invalid(FIELD, "range is missing 'start'"))?;
                let end = range.get("end").unwrap_or(start);
                BlockedDateRange::new(date(start, FIELD)?, date(end, FIELD)?)
            }
            other => Ok(BlockedDateRange::single_day(date(other, FIELD)?)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BlockedDateRange::merge_all(ranges))
}

fn rate_table(record: &Map<String, Value>) -> Result<RateTable, CoreError> {
    const FIELD: &str = "rates";
    let mut table = RateTable::new();

    if let Some(map) = lookup(record, RATE_MAP_KEYS) {
        let map = map
            .as_object()
            .ok_or_else(|| invalid(FIELD, "expected an object keyed by night count"))?;
        for (key, rate) in map {
            let nights: u32 = key
                .trim()
                .parse()
                .map_err(|_| invalid(FIELD, format!("'{key}' is not a night count")))?;
            if rate.is_null() {
                continue;
            }
            table.insert(nights, number(rate, FIELD)?)?;
        }
    }

    for nights in MIN_RATE_NIGHTS..=MAX_NIGHTS_PER_WEEK {
        let keys = tier_rate_keys(nights);
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        if let Some(rate) = lookup(record, &keys) {
            table.insert(nights, number(rate, FIELD)?)?;
        }
    }

    Ok(table)
}
