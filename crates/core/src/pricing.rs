//! Tiered nightly pricing.
//!
//! The nightly rate depends on how many nights per week the guest books,
//! looked up in a per-listing [`RateTable`]. Rent is then prorated weekly,
//! over four weeks and over the configured billing period, and the first
//! payment adds the damage deposit and maintenance fee to four weeks' rent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::{PricingPolicy, MAX_NIGHTS_PER_WEEK};
use crate::error::{CoreError, ErrorCode};
use crate::types::{Money, ReservationSpan};
use crate::weekly_pattern::WeeklyPattern;

/// Smallest night count a rate tier can be defined for.
pub const MIN_RATE_NIGHTS: u32 = 2;

/// Hosts often leave the 6-night tier blank; it is priced at the 5-night
/// rate.
pub const SIX_NIGHT_FALLBACK: (u32, u32) = (6, 5);

/// Weeks covered by `four_week_rent` and the first payment.
pub const FIRST_PAYMENT_WEEKS: u32 = 4;

// ---------------------------------------------------------------------------
// Rate table
// ---------------------------------------------------------------------------

/// A resolved nightly rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLookup {
    pub rate: Money,
    /// Tier the rate was taken from.
    pub source_nights: u32,
    pub fallback_used: bool,
}

/// Sparse mapping from nights-per-week to nightly rate, plus the fallback
/// rules applied when a tier is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RateTableRecord")]
pub struct RateTable {
    rates: BTreeMap<u32, Money>,
    fallbacks: BTreeMap<u32, u32>,
}

/// Wire shape of [`RateTable`]; every entry goes through the checked
/// setters on the way in.
#[derive(Deserialize)]
struct RateTableRecord {
    rates: BTreeMap<u32, Money>,
    #[serde(default = "default_fallbacks")]
    fallbacks: BTreeMap<u32, u32>,
}

impl TryFrom<RateTableRecord> for RateTable {
    type Error = CoreError;

    fn try_from(record: RateTableRecord) -> Result<Self, Self::Error> {
        let mut table = Self {
            rates: BTreeMap::new(),
            fallbacks: BTreeMap::new(),
        };
        for (nights, rate) in record.rates {
            table.insert(nights, rate)?;
        }
        for (nights, source) in record.fallbacks {
            table.add_fallback(nights, source)?;
        }
        Ok(table)
    }
}

fn default_fallbacks() -> BTreeMap<u32, u32> {
    BTreeMap::from([SIX_NIGHT_FALLBACK])
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rates: BTreeMap::new(),
            fallbacks: default_fallbacks(),
        }
    }
}

fn validate_tier(nights: u32) -> Result<(), CoreError> {
    if !(MIN_RATE_NIGHTS..=MAX_NIGHTS_PER_WEEK).contains(&nights) {
        return Err(CoreError::Validation(format!(
            "rate tier must be between {MIN_RATE_NIGHTS} and {MAX_NIGHTS_PER_WEEK} nights, got {nights}"
        )));
    }
    Ok(())
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nightly rate for a tier. Rates must be finite and >= 0.
    pub fn insert(&mut self, nights: u32, rate: Money) -> Result<(), CoreError> {
        validate_tier(nights)?;
        if !rate.is_finite() || rate < 0.0 {
            return Err(CoreError::Validation(format!(
                "nightly rate for {nights} nights must be a non-negative amount, got {rate}"
            )));
        }
        self.rates.insert(nights, rate);
        Ok(())
    }

    /// Builder form of [`RateTable::insert`].
    pub fn with_rate(mut self, nights: u32, rate: Money) -> Result<Self, CoreError> {
        self.insert(nights, rate)?;
        Ok(self)
    }

    /// Price tier `nights` from tier `source` when `nights` has no rate.
    pub fn add_fallback(&mut self, nights: u32, source: u32) -> Result<(), CoreError> {
        validate_tier(nights)?;
        validate_tier(source)?;
        self.fallbacks.insert(nights, source);
        Ok(())
    }

    pub fn rate(&self, nights: u32) -> Option<Money> {
        self.rates.get(&nights).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Resolve the rate for `nights`. An explicit tier always wins; fallbacks
    /// are followed one step only.
    pub fn rate_for(&self, nights: u32) -> Option<RateLookup> {
        if let Some(rate) = self.rate(nights) {
            return Some(RateLookup {
                rate,
                source_nights: nights,
                fallback_used: false,
            });
        }
        let source = *self.fallbacks.get(&nights)?;
        self.rate(source).map(|rate| RateLookup {
            rate,
            source_nights: source,
            fallback_used: true,
        })
    }
}

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

/// One-time charges collected with the first payment. Both amounts are
/// finite and >= 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(try_from = "FeesRecord")]
pub struct Fees {
    #[validate(range(min = 0.0))]
    damage_deposit: Money,
    #[validate(range(min = 0.0))]
    maintenance_fee: Money,
}

#[derive(Deserialize)]
struct FeesRecord {
    #[serde(default)]
    damage_deposit: Money,
    #[serde(default)]
    maintenance_fee: Money,
}

impl TryFrom<FeesRecord> for Fees {
    type Error = CoreError;

    fn try_from(record: FeesRecord) -> Result<Self, Self::Error> {
        Self::new(record.damage_deposit, record.maintenance_fee)
    }
}

impl Fees {
    pub fn new(damage_deposit: Money, maintenance_fee: Money) -> Result<Self, CoreError> {
        if !damage_deposit.is_finite() || !maintenance_fee.is_finite() {
            return Err(CoreError::Validation("fees must be finite amounts".into()));
        }
        let fees = Self {
            damage_deposit,
            maintenance_fee,
        };
        fees.validate()?;
        Ok(fees)
    }

    pub fn damage_deposit(&self) -> Money {
        self.damage_deposit
    }

    pub fn maintenance_fee(&self) -> Money {
        self.maintenance_fee
    }
}

// ---------------------------------------------------------------------------
// Price breakdown
// ---------------------------------------------------------------------------

/// Computed price for a weekly pattern over a reservation span.
///
/// When `valid` is false every money field is zero and `error_code` says why.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub price_per_night: Money,
    pub nights_per_week: u32,
    pub weekly_rent: Money,
    /// Always four weeks of rent.
    pub four_week_rent: Money,
    /// Rent for the policy's billing period.
    pub billing_period_rent: Money,
    pub reservation_total: Money,
    pub damage_deposit: Money,
    pub maintenance_fee: Money,
    pub first_four_weeks_total: Money,
    pub used_rate_fallback: bool,
    pub valid: bool,
    pub error_code: Option<ErrorCode>,
}

impl PriceBreakdown {
    fn invalid(nights_per_week: u32, code: ErrorCode) -> Self {
        Self {
            price_per_night: 0.0,
            nights_per_week,
            weekly_rent: 0.0,
            four_week_rent: 0.0,
            billing_period_rent: 0.0,
            reservation_total: 0.0,
            damage_deposit: 0.0,
            maintenance_fee: 0.0,
            first_four_weeks_total: 0.0,
            used_rate_fallback: false,
            valid: false,
            error_code: Some(code),
        }
    }
}

/// Price a weekly pattern held for `span` weeks.
pub fn compute_price_breakdown(
    pattern: WeeklyPattern,
    span: ReservationSpan,
    rates: &RateTable,
    fees: &Fees,
    policy: &PricingPolicy,
) -> PriceBreakdown {
    let nights_per_week = policy.night_count_rule.nights_for(pattern);

    if pattern.is_empty() {
        tracing::debug!("Pricing skipped: empty weekly pattern");
        return PriceBreakdown::invalid(nights_per_week, ErrorCode::InvalidPattern);
    }

    let lookup = match rates.rate_for(nights_per_week) {
        Some(lookup) if nights_per_week > 0 => lookup,
        _ => {
            tracing::debug!(nights_per_week, "No nightly rate for night count");
            return PriceBreakdown::invalid(nights_per_week, ErrorCode::RateNotFound);
        }
    };
    if lookup.fallback_used {
        tracing::warn!(
            nights_per_week,
            source_nights = lookup.source_nights,
            "Nightly rate taken from fallback tier"
        );
    }

    let weekly_rent = lookup.rate * f64::from(nights_per_week);
    let four_week_rent = weekly_rent * f64::from(FIRST_PAYMENT_WEEKS);
    let billing_period_rent = weekly_rent * f64::from(policy.billing_period_weeks);
    let reservation_total = weekly_rent * f64::from(span.weeks());

    PriceBreakdown {
        price_per_night: lookup.rate,
        nights_per_week,
        weekly_rent,
        four_week_rent,
        billing_period_rent,
        reservation_total,
        damage_deposit: fees.damage_deposit(),
        maintenance_fee: fees.maintenance_fee(),
        first_four_weeks_total: four_week_rent + fees.damage_deposit() + fees.maintenance_fee(),
        used_rate_fallback: lookup.fallback_used,
        valid: true,
        error_code: None,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::config::NightCountRule;

    fn pattern(indices: &[u8]) -> WeeklyPattern {
        WeeklyPattern::from_indices(indices).unwrap()
    }

    fn span(weeks: u32) -> ReservationSpan {
        ReservationSpan::new(weeks).unwrap()
    }

    fn rates() -> RateTable {
        RateTable::new()
            .with_rate(2, 150.0)
            .unwrap()
            .with_rate(3, 140.0)
            .unwrap()
            .with_rate(4, 125.0)
            .unwrap()
            .with_rate(5, 110.0)
            .unwrap()
            .with_rate(7, 90.0)
            .unwrap()
    }

    fn fees() -> Fees {
        Fees::new(500.0, 75.0).unwrap()
    }

    fn price(days: &[u8], weeks: u32, table: &RateTable) -> PriceBreakdown {
        compute_price_breakdown(pattern(days), span(weeks), table, &fees(), &PricingPolicy::default())
    }

    // -----------------------------------------------------------------------
    // Rate table
    // -----------------------------------------------------------------------

    #[test]
    fn tier_out_of_range_rejected() {
        assert!(RateTable::new().with_rate(1, 100.0).is_err());
        assert!(RateTable::new().with_rate(8, 100.0).is_err());
    }

    #[test]
    fn negative_or_nan_rate_rejected() {
        assert!(RateTable::new().with_rate(3, -1.0).is_err());
        assert!(RateTable::new().with_rate(3, f64::NAN).is_err());
    }

    #[test]
    fn six_nights_falls_back_to_five() {
        let lookup = rates().rate_for(6).unwrap();
        assert_eq!(lookup.rate, 110.0);
        assert_eq!(lookup.source_nights, 5);
        assert!(lookup.fallback_used);
    }

    #[test]
    fn explicit_six_night_rate_wins() {
        let table = rates().with_rate(6, 100.0).unwrap();
        let lookup = table.rate_for(6).unwrap();
        assert_eq!(lookup.rate, 100.0);
        assert!(!lookup.fallback_used);
    }

    #[test]
    fn fallback_is_not_a_general_rule() {
        let table = RateTable::new().with_rate(2, 150.0).unwrap();
        assert_eq!(table.rate_for(3), None);
    }

    #[test]
    fn custom_fallback_rule() {
        let mut table = RateTable::new().with_rate(2, 150.0).unwrap();
        table.add_fallback(3, 2).unwrap();
        assert_eq!(table.rate_for(3).map(|l| l.rate), Some(150.0));

        // An explicit tier still wins over the new rule.
        let mut full = rates();
        full.add_fallback(3, 2).unwrap();
        assert_eq!(full.rate_for(3).map(|l| l.rate), Some(140.0));
    }

    #[test]
    fn rate_table_deserializes_with_default_fallback() {
        let table: RateTable = serde_json::from_str(r#"{"rates": {"5": 110.0}}"#).unwrap();
        assert_eq!(table.rate_for(6).map(|l| l.rate), Some(110.0));
    }

    #[test]
    fn rate_table_deserialize_rejects_tiers_outside_range() {
        assert!(serde_json::from_str::<RateTable>(r#"{"rates": {"1": 200.0}}"#).is_err());
        assert!(serde_json::from_str::<RateTable>(r#"{"rates": {"8": 80.0}}"#).is_err());
        assert!(
            serde_json::from_str::<RateTable>(r#"{"rates": {"5": 110.0}, "fallbacks": {"6": 9}}"#)
                .is_err()
        );
    }

    // -----------------------------------------------------------------------
    // Fees
    // -----------------------------------------------------------------------

    #[test]
    fn negative_fees_rejected() {
        assert_matches!(Fees::new(-1.0, 0.0), Err(CoreError::Validation(_)));
        assert!(Fees::new(0.0, -5.0).is_err());
    }

    // -----------------------------------------------------------------------
    // compute_price_breakdown
    // -----------------------------------------------------------------------

    #[test]
    fn weekday_breakdown() {
        // Mon-Fri = 4 nights at the 4-night rate.
        let breakdown = price(&[1, 2, 3, 4, 5], 13, &rates());
        assert!(breakdown.valid);
        assert_eq!(breakdown.nights_per_week, 4);
        assert_eq!(breakdown.price_per_night, 125.0);
        assert_eq!(breakdown.weekly_rent, 500.0);
        assert_eq!(breakdown.four_week_rent, 2000.0);
        assert_eq!(breakdown.reservation_total, 6500.0);
        assert_eq!(breakdown.first_four_weeks_total, 2575.0);
        assert_eq!(breakdown.error_code, None);
    }

    #[test]
    fn totals_follow_rate_nights_and_span() {
        let table = rates().with_rate(6, 100.0).unwrap();
        for (days, weeks) in [(&[1u8, 2, 3][..], 1u32), (&[0, 1, 2, 3, 4][..], 8), (&[5, 6, 0][..], 26)] {
            let b = price(days, weeks, &table);
            assert!(b.valid);
            let expected = b.price_per_night * f64::from(b.nights_per_week);
            assert_eq!(b.reservation_total, expected * f64::from(weeks));
            assert_eq!(b.four_week_rent, expected * 4.0);
        }
    }

    #[test]
    fn full_week_priced_at_seven_night_rate() {
        let breakdown = price(&[0, 1, 2, 3, 4, 5, 6], 4, &rates());
        assert_eq!(breakdown.nights_per_week, 7);
        assert_eq!(breakdown.price_per_night, 90.0);
    }

    #[test]
    fn six_nights_priced_at_five_night_rate() {
        let policy = PricingPolicy {
            night_count_rule: NightCountRule::DaysSelected,
            ..PricingPolicy::default()
        };
        let six_days = pattern(&[0, 1, 2, 3, 4, 5]);

        let fallback = compute_price_breakdown(six_days, span(4), &rates(), &fees(), &policy);
        assert_eq!(fallback.nights_per_week, 6);
        assert_eq!(fallback.price_per_night, 110.0);
        assert!(fallback.used_rate_fallback);

        let explicit = rates().with_rate(6, 100.0).unwrap();
        let breakdown = compute_price_breakdown(six_days, span(4), &explicit, &fees(), &policy);
        assert_eq!(breakdown.price_per_night, 100.0);
        assert!(!breakdown.used_rate_fallback);
    }

    #[test]
    fn missing_tier_is_invalid_with_zero_money() {
        let table = RateTable::new().with_rate(5, 110.0).unwrap();
        let breakdown = price(&[1, 2, 3], 4, &table);
        assert!(!breakdown.valid);
        assert_eq!(breakdown.error_code, Some(ErrorCode::RateNotFound));
        assert_eq!(breakdown.price_per_night, 0.0);
        assert_eq!(breakdown.four_week_rent, 0.0);
        assert_eq!(breakdown.reservation_total, 0.0);
        assert_eq!(breakdown.damage_deposit, 0.0);
        assert_eq!(breakdown.first_four_weeks_total, 0.0);
    }

    #[test]
    fn single_day_has_no_nights_to_price() {
        let breakdown = price(&[3], 4, &rates());
        assert!(!breakdown.valid);
        assert_eq!(breakdown.nights_per_week, 0);
    }

    #[test]
    fn empty_pattern_reports_invalid_pattern() {
        let breakdown = compute_price_breakdown(
            WeeklyPattern::empty(),
            span(4),
            &rates(),
            &fees(),
            &PricingPolicy::default(),
        );
        assert_eq!(breakdown.error_code, Some(ErrorCode::InvalidPattern));
    }

    #[test]
    fn billing_period_rent_follows_policy_without_touching_four_week_rent() {
        let policy = PricingPolicy {
            billing_period_weeks: 2,
            ..PricingPolicy::default()
        };
        let breakdown = compute_price_breakdown(
            pattern(&[1, 2, 3, 4, 5]),
            span(13),
            &rates(),
            &fees(),
            &policy,
        );
        assert_eq!(breakdown.billing_period_rent, 1000.0);
        assert_eq!(breakdown.four_week_rent, 2000.0);
        assert_eq!(breakdown.first_four_weeks_total, 2575.0);
    }

    #[test]
    fn deserialized_inputs_cannot_price_negative() {
        let table = serde_json::from_str::<RateTable>(r#"{"rates": {"4": -125.0}}"#);
        assert_matches!(table, Err(_));
        let fees = serde_json::from_str::<Fees>(
            r#"{"damage_deposit": -500.0, "maintenance_fee": -75.0}"#,
        );
        assert_matches!(fees, Err(_));

        let table: RateTable = serde_json::from_str(r#"{"rates": {"4": 125.0}}"#).unwrap();
        let fees: Fees =
            serde_json::from_str(r#"{"damage_deposit": 500.0, "maintenance_fee": 75.0}"#).unwrap();
        let breakdown = compute_price_breakdown(
            pattern(&[1, 2, 3, 4, 5]),
            span(4),
            &table,
            &fees,
            &PricingPolicy::default(),
        );
        assert!(breakdown.valid);
        assert_eq!(breakdown.first_four_weeks_total, 2575.0);
    }
}
