//! Tiered pricing rules: platform commission, membership discounts.
//!
//! Everything in this crate is deliberately pure: no async, no IO.

pub mod commission;
pub mod discount;
pub mod tier;

pub use commission::{PayoutBreakdown, commission_rate, payout_breakdown, round2};
pub use discount::{apply_discount, discount_rate, discounted_price};
pub use tier::{EventTier, Tier};
