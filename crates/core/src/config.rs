//! Engine tunables.
//!
//! Defaults match the production business rules. Deployments may override
//! them through environment variables; the library never reads the
//! environment on its own, callers load a [`PricingPolicy`] once and pass it
//! in.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::weekly_pattern::WeeklyPattern;

/// Env var overriding [`PricingPolicy::billing_period_weeks`].
pub const ENV_BILLING_PERIOD_WEEKS: &str = "SPLIT_LEASE_BILLING_PERIOD_WEEKS";

/// Env var overriding [`PricingPolicy::night_count_rule`].
pub const ENV_NIGHT_COUNT_RULE: &str = "SPLIT_LEASE_NIGHT_COUNT_RULE";

/// Weeks in one billing period, reported as `billing_period_rent`.
pub const DEFAULT_BILLING_PERIOD_WEEKS: u32 = 4;

/// Maximum nights in one week.
pub const MAX_NIGHTS_PER_WEEK: u32 = 7;

// ---------------------------------------------------------------------------
// Night counting
// ---------------------------------------------------------------------------

/// How many nights per week a weekly pattern implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightCountRule {
    /// Selected days minus the check-out day. A full week is 7 nights.
    #[default]
    DaysMinusOne,
    /// One night per selected day.
    DaysSelected,
}

impl NightCountRule {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.trim() {
            "days_minus_one" => Ok(Self::DaysMinusOne),
            "days_selected" => Ok(Self::DaysSelected),
            other => Err(format!(
                "unknown night count rule '{other}'. Must be one of: days_minus_one, days_selected"
            )),
        }
    }

    /// Nights per week for `pattern`. Empty patterns have zero nights.
    pub fn nights_for(self, pattern: WeeklyPattern) -> u32 {
        let days = pattern.len() as u32;
        match self {
            _ if pattern.is_full_week() => MAX_NIGHTS_PER_WEEK,
            Self::DaysMinusOne => days.saturating_sub(1),
            Self::DaysSelected => days,
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Pricing and scheduling policy shared by every calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Weeks priced into `billing_period_rent` (default: `4`). The first
    /// payment is always four weeks regardless.
    pub billing_period_weeks: u32,
    /// Night-count definition (default: `days_minus_one`).
    pub night_count_rule: NightCountRule,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            billing_period_weeks: DEFAULT_BILLING_PERIOD_WEEKS,
            night_count_rule: NightCountRule::default(),
        }
    }
}

impl PricingPolicy {
    /// Load the policy from process environment variables with defaults.
    ///
    /// | Env Var                            | Default          |
    /// |------------------------------------|------------------|
    /// | `SPLIT_LEASE_BILLING_PERIOD_WEEKS` | `4`              |
    /// | `SPLIT_LEASE_NIGHT_COUNT_RULE`     | `days_minus_one` |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the policy through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let billing_period_weeks = match lookup(ENV_BILLING_PERIOD_WEEKS) {
            Some(raw) => {
                let weeks: u32 = raw.trim().parse().map_err(|_| CoreError::Config {
                    var: ENV_BILLING_PERIOD_WEEKS,
                    reason: format!("'{raw}' is not a valid week count"),
                })?;
                if weeks == 0 {
                    return Err(CoreError::Config {
                        var: ENV_BILLING_PERIOD_WEEKS,
                        reason: "must be at least 1".into(),
                    });
                }
                weeks
            }
            None => defaults.billing_period_weeks,
        };

        let night_count_rule = match lookup(ENV_NIGHT_COUNT_RULE) {
            Some(raw) => {
                NightCountRule::from_str_value(&raw).map_err(|reason| CoreError::Config {
                    var: ENV_NIGHT_COUNT_RULE,
                    reason,
                })?
            }
            None => defaults.night_count_rule,
        };

        tracing::debug!(
            billing_period_weeks,
            night_count_rule = ?night_count_rule,
            "Loaded pricing policy"
        );

        Ok(Self {
            billing_period_weeks,
            night_count_rule,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn pattern(indices: &[u8]) -> WeeklyPattern {
        WeeklyPattern::from_indices(indices).unwrap()
    }

    // -----------------------------------------------------------------------
    // NightCountRule
    // -----------------------------------------------------------------------

    #[test]
    fn days_minus_one_counts_weekdays_as_four_nights() {
        assert_eq!(NightCountRule::DaysMinusOne.nights_for(pattern(&[1, 2, 3, 4, 5])), 4);
    }

    #[test]
    fn days_selected_counts_every_day() {
        assert_eq!(NightCountRule::DaysSelected.nights_for(pattern(&[1, 2, 3, 4, 5])), 5);
    }

    #[test]
    fn full_week_is_seven_nights_under_both_rules() {
        let week = WeeklyPattern::full_week();
        assert_eq!(NightCountRule::DaysMinusOne.nights_for(week), 7);
        assert_eq!(NightCountRule::DaysSelected.nights_for(week), 7);
    }

    #[test]
    fn empty_and_single_day() {
        assert_eq!(NightCountRule::DaysMinusOne.nights_for(WeeklyPattern::empty()), 0);
        assert_eq!(NightCountRule::DaysMinusOne.nights_for(pattern(&[2])), 0);
    }

    // -----------------------------------------------------------------------
    // PricingPolicy loading
    // -----------------------------------------------------------------------

    #[test]
    fn defaults_when_unset() {
        let policy = PricingPolicy::from_lookup(lookup(&[])).unwrap();
        assert_eq!(policy, PricingPolicy::default());
        assert_eq!(policy.billing_period_weeks, 4);
    }

    #[test]
    fn overrides_applied() {
        let policy = PricingPolicy::from_lookup(lookup(&[
            (ENV_BILLING_PERIOD_WEEKS, "2"),
            (ENV_NIGHT_COUNT_RULE, "days_selected"),
        ]))
        .unwrap();
        assert_eq!(policy.billing_period_weeks, 2);
        assert_eq!(policy.night_count_rule, NightCountRule::DaysSelected);
    }

    #[test]
    fn bad_week_count_rejected() {
        let err = PricingPolicy::from_lookup(lookup(&[(ENV_BILLING_PERIOD_WEEKS, "four")]));
        assert_matches!(err, Err(CoreError::Config { var: ENV_BILLING_PERIOD_WEEKS, .. }));
    }

    #[test]
    fn zero_weeks_rejected() {
        let err = PricingPolicy::from_lookup(lookup(&[(ENV_BILLING_PERIOD_WEEKS, "0")]));
        assert_matches!(err, Err(CoreError::Config { .. }));
    }

    #[test]
    fn unknown_rule_rejected() {
        let err = PricingPolicy::from_lookup(lookup(&[(ENV_NIGHT_COUNT_RULE, "nights")]));
        assert_matches!(err, Err(CoreError::Config { var: ENV_NIGHT_COUNT_RULE, .. }));
    }
}
