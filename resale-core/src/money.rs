//! Currency rounding and price-ending adjustments.
//!
//! Every price leaving a strategy goes through [`round_currency`]: two decimal
//! places, half-up (ties away from zero; prices are never negative).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal places of the display currency.
pub const CURRENCY_DP: u32 = 2;

/// Round to currency precision with round-half-up semantics.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Post-rounding adjustment applied to every successful row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceAdjustment {
    /// Publish the formula price as-is.
    #[default]
    None,
    /// Move the price up to the next `X.90` ending.
    Charm,
}

impl PriceAdjustment {
    pub fn apply(&self, price: Decimal) -> Decimal {
        match self {
            Self::None => price,
            Self::Charm => charm_price(price),
        }
    }
}

/// Charm pricing: the smallest `X.90` that is not below `price`.
///
/// `12.00 → 12.90`, `12.85 → 12.90`, `12.95 → 13.90`. Non-positive prices
/// are returned unchanged, as are prices too close to `Decimal::MAX` to
/// move up.
pub fn charm_price(price: Decimal) -> Decimal {
    if price <= Decimal::ZERO {
        return price;
    }
    let ending = Decimal::new(90, 2);
    let target = price.trunc().checked_add(ending).and_then(|t| {
        if t < price {
            t.checked_add(Decimal::ONE)
        } else {
            Some(t)
        }
    });
    match target {
        Some(t) => round_currency(t),
        None => price,
    }
}

/// Render an amount at currency precision, rounding half-up first.
///
/// `Decimal`'s `{:.2}` formatting truncates, so it is never used directly.
pub fn format_currency(value: Decimal) -> String {
    format!("{:.2}", round_currency(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_currency(dec!(1.005)), dec!(1.01));
        assert_eq!(round_currency(dec!(1.004)), dec!(1.00));
        assert_eq!(round_currency(dec!(79.787234)), dec!(79.79));
    }

    #[test]
    fn rounding_keeps_exact_values() {
        assert_eq!(round_currency(dec!(40)), dec!(40.00));
        assert_eq!(round_currency(dec!(12.3)), dec!(12.30));
    }

    #[test]
    fn charm_raises_to_ninety_cents() {
        assert_eq!(charm_price(dec!(12.00)), dec!(12.90));
        assert_eq!(charm_price(dec!(12.30)), dec!(12.90));
        assert_eq!(charm_price(dec!(12.85)), dec!(12.90));
        assert_eq!(charm_price(dec!(12.90)), dec!(12.90));
    }

    #[test]
    fn charm_moves_to_next_band_when_past_ending() {
        assert_eq!(charm_price(dec!(12.95)), dec!(13.90));
        assert_eq!(charm_price(dec!(0.99)), dec!(1.90));
    }

    #[test]
    fn charm_leaves_non_positive_alone() {
        assert_eq!(charm_price(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(charm_price(dec!(-3)), dec!(-3));
    }

    #[test]
    fn charm_leaves_price_at_decimal_max_unchanged() {
        assert_eq!(charm_price(Decimal::MAX), Decimal::MAX);
        assert_eq!(PriceAdjustment::Charm.apply(Decimal::MAX), Decimal::MAX);
    }

    #[test]
    fn format_currency_rounds_instead_of_truncating() {
        assert_eq!(format_currency(dec!(52.456)), "52.46");
        assert_eq!(format_currency(dec!(52.454)), "52.45");
        assert_eq!(format_currency(dec!(1.005)), "1.01");
        assert_eq!(format_currency(dec!(10)), "10.00");
    }

    #[test]
    fn adjustment_none_is_identity() {
        assert_eq!(PriceAdjustment::None.apply(dec!(79.79)), dec!(79.79));
        assert_eq!(PriceAdjustment::Charm.apply(dec!(79.79)), dec!(79.90));
    }
}
