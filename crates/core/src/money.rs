//! Monetary amounts: two-decimal fixed-point values.
//!
//! All amounts and commissions in the system are decimals with two fraction
//! digits. Rounding is half-up (`MidpointAwayFromZero`), matching how the
//! figures are presented to sellers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Monetary value. Always normalize with [`round_money`] before persisting
/// or comparing.
pub type Money = Decimal;

/// Round a decimal to two fraction digits, half-up.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Render a monetary value with exactly two fraction digits (e.g. `"85.00"`).
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_at_two_decimals() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2)); // 12.345 -> 12.35
        assert_eq!(round_money(Decimal::new(12344, 3)), Decimal::new(1234, 2)); // 12.344 -> 12.34
        assert_eq!(round_money(Decimal::new(1005, 3)), Decimal::new(101, 2)); // 1.005 -> 1.01
    }

    #[test]
    fn format_pads_to_two_decimals() {
        assert_eq!(format_money(Decimal::new(85, 0)), "85.00");
        assert_eq!(format_money(Decimal::new(1275, 1)), "127.50");
    }
}
