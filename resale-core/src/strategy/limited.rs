//! Limited strategy — reverse-engineer a listing price from a promotion.
//!
//! A limited-time promotion shows the shopper `listing * discount_rate` and
//! stacks an instant coupon plus a coupon one unit larger on top. Working
//! backwards from the net price the seller wants:
//!
//! ```text
//! price = (target_net_price + instant_coupon + 1) / discount_rate
//! ```
//!
//! Cost and shipping do not enter the formula.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::money::round_currency;

/// Fixed transaction fee baked into the promotion formula.
pub const TRANSACTION_FEE: Decimal = Decimal::ONE;

/// Parameters for the promotion formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitedParams {
    /// Net price the shopper should end up paying.
    pub target_net_price: Decimal,
    /// Instant coupon amount.
    pub instant_coupon: Decimal,
    /// Promotion discount as a fraction in `(0, 1]`.
    pub discount_rate: Decimal,
}

impl LimitedParams {
    pub fn new(target_net_price: Decimal, instant_coupon: Decimal, discount_rate: Decimal) -> Self {
        Self {
            target_net_price,
            instant_coupon,
            discount_rate,
        }
    }

    /// Copy with a different target net price (per-SKU planned price).
    pub fn with_target(&self, target_net_price: Decimal) -> Self {
        Self {
            target_net_price,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        if self.discount_rate <= Decimal::ZERO {
            return Err(PricingError::InvalidParameter(format!(
                "discount_rate must be above 0, got {}",
                self.discount_rate
            )));
        }
        Ok(())
    }

    /// Discounts above 1 are accepted but mark up the listing instead of
    /// discounting it.
    pub fn has_unusual_discount(&self) -> bool {
        self.discount_rate > Decimal::ONE
    }
}

/// Final listing price for one SKU, rounded to currency precision.
pub fn final_price(params: &LimitedParams) -> Result<Decimal, PricingError> {
    params.validate()?;
    if params.target_net_price < Decimal::ZERO {
        return Err(PricingError::InvalidInput(format!(
            "target_net_price must not be negative, got {}",
            params.target_net_price
        )));
    }
    if params.instant_coupon < Decimal::ZERO {
        return Err(PricingError::InvalidInput(format!(
            "instant_coupon must not be negative, got {}",
            params.instant_coupon
        )));
    }

    let numerator = params
        .target_net_price
        .checked_add(params.instant_coupon)
        .and_then(|v| v.checked_add(TRANSACTION_FEE))
        .ok_or_else(|| PricingError::InvalidInput("promotion total overflows".into()))?;
    let raw = numerator.checked_div(params.discount_rate).ok_or_else(|| {
        PricingError::InvalidParameter("discount_rate is too small".into())
    })?;
    Ok(round_currency(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn worked_example() {
        let price = final_price(&LimitedParams::new(dec!(30), dec!(5), dec!(0.9))).unwrap();
        assert_eq!(price, dec!(40.00));
    }

    #[test]
    fn half_discount() {
        // (10 + 5 + 1) / 0.5
        let price = final_price(&LimitedParams::new(dec!(10), dec!(5), dec!(0.5))).unwrap();
        assert_eq!(price, dec!(32.00));
    }

    #[test]
    fn eighty_percent_discount() {
        // (20 + 7 + 1) / 0.8
        let price = final_price(&LimitedParams::new(dec!(20), dec!(7), dec!(0.8))).unwrap();
        assert_eq!(price, dec!(35.00));
    }

    #[test]
    fn full_price_adds_coupon_and_fee() {
        let price = final_price(&LimitedParams::new(dec!(18.35), dec!(3), dec!(1))).unwrap();
        assert_eq!(price, dec!(22.35));
    }

    #[test]
    fn rounds_half_up() {
        // 10 / 0.3 = 33.333...
        let price = final_price(&LimitedParams::new(dec!(9), dec!(0), dec!(0.3))).unwrap();
        assert_eq!(price, dec!(33.33));
        // 11 / 0.6 = 18.3333...
        let price = final_price(&LimitedParams::new(dec!(10), dec!(0), dec!(0.6))).unwrap();
        assert_eq!(price, dec!(18.33));
    }

    #[test]
    fn zero_or_negative_discount_is_invalid_parameter() {
        for rate in [dec!(0), dec!(-0.5)] {
            let err = final_price(&LimitedParams::new(dec!(30), dec!(5), rate)).unwrap_err();
            assert!(matches!(err, PricingError::InvalidParameter(_)));
        }
    }

    #[test]
    fn discount_above_one_is_permitted() {
        let params = LimitedParams::new(dec!(30), dec!(5), dec!(1.2));
        assert!(params.has_unusual_discount());
        assert_eq!(final_price(&params).unwrap(), dec!(30.00));
    }

    #[test]
    fn negative_amounts_are_invalid_input() {
        let err = final_price(&LimitedParams::new(dec!(-1), dec!(5), dec!(0.9))).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput(_)));
        let err = final_price(&LimitedParams::new(dec!(30), dec!(-5), dec!(0.9))).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput(_)));
    }

    #[test]
    fn with_target_keeps_other_fields() {
        let base = LimitedParams::new(dec!(30), dec!(5), dec!(0.9));
        let sku = base.with_target(dec!(12));
        assert_eq!(sku.target_net_price, dec!(12));
        assert_eq!(sku.instant_coupon, dec!(5));
        assert_eq!(sku.discount_rate, dec!(0.9));
    }
}
