//! The commission rule: a fixed 8.5% of the sale amount.
//!
//! Commission is rounded to two decimal places, half-up. The rule is applied
//! explicitly by the ledger on create and on any amount change; nothing else
//! in the system derives commission from the rate (aggregation sums the
//! persisted field).

use rust_decimal::Decimal;

use salesdesk_core::money::round_money;

/// Fixed commission rate (8.5%).
pub fn commission_rate() -> Decimal {
    Decimal::new(85, 3)
}

/// Commission owed for a sale of the given amount.
pub fn commission_for(amount: Decimal) -> Decimal {
    round_money(amount * commission_rate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn known_amounts_produce_known_commissions() {
        assert_eq!(commission_for(money(100_000)), money(8_500)); // 1000.00 -> 85.00
        assert_eq!(commission_for(money(200_000)), money(17_000)); // 2000.00 -> 170.00
        assert_eq!(commission_for(money(150_000)), money(12_750)); // 1500.00 -> 127.50
    }

    #[test]
    fn midpoints_round_half_up() {
        // 10.30 * 0.085 = 0.8755 -> 0.88
        assert_eq!(commission_for(money(1_030)), money(88));
        // 0.10 * 0.085 = 0.0085 -> 0.01
        assert_eq!(commission_for(money(10)), money(1));
    }

    proptest! {
        #[test]
        fn commission_is_positive_and_within_half_a_cent(cents in 1i64..=100_000_000) {
            let amount = money(cents);
            let commission = commission_for(amount);

            prop_assert!(commission >= Decimal::ZERO);
            prop_assert!(commission.scale() <= 2);

            let exact = amount * commission_rate();
            let error = (commission - exact).abs();
            prop_assert!(error <= Decimal::new(5, 3), "error {error} for amount {amount}");
        }

        #[test]
        fn commission_is_monotonic_in_amount(a in 1i64..=50_000_000, b in 1i64..=50_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(commission_for(money(lo)) <= commission_for(money(hi)));
        }
    }
}
