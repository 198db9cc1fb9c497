//! Membership discount matrix.
//!
//! Gold and platinum members get a percentage off, scaled by the listing's
//! pricing bracket. Silver (or no) membership gets none.

use rust_decimal::Decimal;

use crate::commission::round2;
use crate::tier::{EventTier, Tier};

/// Discount rate for a member tier / event bracket combination.
///
/// Unknown member tiers and unknown event brackets both resolve to zero.
pub fn discount_rate(member: Option<Tier>, event: Option<EventTier>) -> Decimal {
    match (member, event) {
        (Some(Tier::Gold), Some(EventTier::A)) => Decimal::new(20, 2),
        (Some(Tier::Gold), Some(EventTier::B)) => Decimal::new(10, 2),
        (Some(Tier::Gold), Some(EventTier::C)) => Decimal::new(5, 2),
        (Some(Tier::Platinum), Some(EventTier::A)) => Decimal::new(30, 2),
        (Some(Tier::Platinum), Some(EventTier::B)) => Decimal::new(20, 2),
        (Some(Tier::Platinum), Some(EventTier::C)) => Decimal::new(10, 2),
        _ => Decimal::ZERO,
    }
}

/// Applies a discount rate to a price, rounded to cents.
pub fn apply_discount(price: Decimal, rate: Decimal) -> Decimal {
    round2(price * (Decimal::ONE - rate))
}

/// The price a member actually pays for a listing.
///
/// Members without a discounting tier pay the list price unchanged; the
/// multiply is skipped entirely so no rounding can touch the amount.
pub fn discounted_price(price: Decimal, member: Option<Tier>, event: Option<EventTier>) -> Decimal {
    match member {
        Some(Tier::Gold) | Some(Tier::Platinum) => {
            apply_discount(price, discount_rate(member, event))
        }
        _ => price,
    }
}
