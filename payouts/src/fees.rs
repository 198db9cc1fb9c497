//! Instant payout fee schedule.
//!
//! The first instant payout in a calendar month is free; each one after
//! that in the same month carries a percentage fee on the requested amount.
//
//  This module is deliberately pure: no async, no IO.

use chrono::{DateTime, Datelike, Timelike, Utc};
use rust_decimal::Decimal;

use pricing::round2;

#[derive(Debug, Clone)]
pub struct InstantFeePolicy {
    /// How many instant payouts per calendar month are free.
    pub free_per_month: u32,
    /// Fee rate applied to the requested amount once the free ones are used.
    pub fee_rate: Decimal,
}

impl Default for InstantFeePolicy {
    fn default() -> Self {
        Self {
            free_per_month: 1,
            fee_rate: Decimal::new(1, 2),
        }
    }
}

/// Fee for the next instant payout, given how many the creator has already
/// taken this month. Rounded to cents.
pub fn instant_fee(amount: Decimal, prior_this_month: u32, policy: &InstantFeePolicy) -> Decimal {
    if prior_this_month < policy.free_per_month {
        Decimal::ZERO
    } else {
        round2(amount * policy.fee_rate)
    }
}

/// Midnight UTC on the first of `now`'s month. Month boundaries for the
/// free-payout count are always reckoned in UTC.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_day(1)
        .and_then(|t| t.with_hour(0))
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}
