//! Platform commission schedule.
//!
//! Higher creator tiers keep more of each booking:
//!   silver 20%, gold 10%, platinum 5% commission.
//! An unknown or absent tier is charged the base (silver) rate.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::tier::Tier;

/// Per-payout money breakdown. `net + commission` always reconstructs
/// `gross` exactly; see [`payout_breakdown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutBreakdown {
    pub gross: Decimal,
    pub commission: Decimal,
    pub net: Decimal,
    pub commission_rate: Decimal,
}

/// Commission rate charged on a creator's earnings.
pub fn commission_rate(tier: Option<Tier>) -> Decimal {
    match tier {
        Some(Tier::Platinum) => Decimal::new(5, 2),
        Some(Tier::Gold) => Decimal::new(10, 2),
        Some(Tier::Silver) | None => Decimal::new(20, 2),
    }
}

/// Round to whole cents, half away from zero.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Splits a gross amount into commission and creator net.
///
/// The commission is rounded to cents first and the net is derived by
/// subtraction, never rounded independently: the two legs must add back to
/// the gross to the cent, or payout records stop reconciling.
pub fn payout_breakdown(gross: Decimal, tier: Option<Tier>) -> PayoutBreakdown {
    let rate = commission_rate(tier);
    let commission = round2(gross * rate);
    let net = round2(gross - commission);

    PayoutBreakdown {
        gross,
        commission,
        net,
        commission_rate: rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rates_follow_the_tier_schedule() {
        assert_eq!(commission_rate(Some(Tier::Silver)), Decimal::new(20, 2));
        assert_eq!(commission_rate(Some(Tier::Gold)), Decimal::new(10, 2));
        assert_eq!(commission_rate(Some(Tier::Platinum)), Decimal::new(5, 2));
    }

    #[test]
    fn unknown_tier_falls_back_to_base_rate() {
        assert_eq!(commission_rate(None), Decimal::new(20, 2));
        assert_eq!(
            commission_rate(Tier::from_label(Some("vip"))),
            Decimal::new(20, 2)
        );
    }

    #[test]
    fn gold_breakdown_matches_schedule() {
        let b = payout_breakdown(Decimal::new(9950, 2), Some(Tier::Gold));
        assert_eq!(b.gross, Decimal::new(9950, 2));
        assert_eq!(b.commission, Decimal::new(995, 2));
        assert_eq!(b.net, Decimal::new(8955, 2));
        assert_eq!(b.commission_rate, Decimal::new(10, 2));
    }

    #[test]
    fn zero_gross_yields_zero_legs() {
        let b = payout_breakdown(Decimal::ZERO, Some(Tier::Platinum));
        assert_eq!(b.commission, Decimal::ZERO);
        assert_eq!(b.net, Decimal::ZERO);
    }

    #[test]
    fn odd_cent_amounts_round_half_up() {
        // 0.05 * 10.10 = 0.505 -> 0.51 at the cent level
        let b = payout_breakdown(Decimal::new(1010, 2), Some(Tier::Platinum));
        assert_eq!(b.commission, Decimal::new(51, 2));
        assert_eq!(b.net, Decimal::new(959, 2));
    }

    proptest! {
        // Whatever the tier and amount, the two legs reconstruct the gross
        // exactly. This is the invariant payout reconciliation relies on.
        #[test]
        fn net_plus_commission_is_gross(cents in 0u64..100_000_000u64, tier_idx in 0usize..4) {
            let tiers = [Some(Tier::Silver), Some(Tier::Gold), Some(Tier::Platinum), None];
            let gross = Decimal::new(cents as i64, 2);

            let b = payout_breakdown(gross, tiers[tier_idx]);

            prop_assert_eq!(b.net + b.commission, b.gross);
            prop_assert!(b.commission >= Decimal::ZERO);
            prop_assert!(b.net >= Decimal::ZERO);
        }
    }
}
