//! Default strategy — cost plus platform fee plus target margin.
//!
//! ```text
//! price = (unit_cost + shipping_fee + extra_markup)
//!         / ((1 - platform_fee_rate) * (1 - target_margin_rate))
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::money::round_currency;

/// Parameters for the cost-plus-margin formula.
///
/// Missing fields deserialize to the `Default` values (6% fee, 20% margin,
/// no markup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultParams {
    /// Share of the sale price the platform keeps, as a fraction.
    pub platform_fee_rate: Decimal,
    /// Margin to keep after the platform fee, as a fraction.
    pub target_margin_rate: Decimal,
    /// Flat amount added to the cost base before fees.
    pub extra_markup: Decimal,
}

impl Default for DefaultParams {
    fn default() -> Self {
        Self {
            platform_fee_rate: Decimal::new(6, 2),
            target_margin_rate: Decimal::new(20, 2),
            extra_markup: Decimal::ZERO,
        }
    }
}

impl DefaultParams {
    pub fn new(platform_fee_rate: Decimal, target_margin_rate: Decimal) -> Self {
        Self {
            platform_fee_rate,
            target_margin_rate,
            extra_markup: Decimal::ZERO,
        }
    }

    pub fn with_extra_markup(mut self, extra_markup: Decimal) -> Self {
        self.extra_markup = extra_markup;
        self
    }

    /// Check both rates are fractions in `[0, 1)`.
    pub fn validate(&self) -> Result<(), PricingError> {
        check_rate("platform_fee_rate", self.platform_fee_rate)?;
        check_rate("target_margin_rate", self.target_margin_rate)?;
        Ok(())
    }

    /// `(1 - fee) * (1 - margin)`; positive once `validate` passes.
    fn divisor(&self) -> Decimal {
        (Decimal::ONE - self.platform_fee_rate) * (Decimal::ONE - self.target_margin_rate)
    }
}

fn check_rate(name: &str, rate: Decimal) -> Result<(), PricingError> {
    if rate >= Decimal::ONE {
        return Err(PricingError::InvalidParameter(format!(
            "{name} must be below 1, got {rate}"
        )));
    }
    if rate < Decimal::ZERO {
        return Err(PricingError::InvalidParameter(format!(
            "{name} must not be negative, got {rate}"
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: Decimal) -> Result<(), PricingError> {
    if value < Decimal::ZERO {
        return Err(PricingError::InvalidInput(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}

/// Suggested sale price for one SKU, rounded to currency precision.
pub fn suggested_price(
    unit_cost: Decimal,
    shipping_fee: Decimal,
    params: &DefaultParams,
) -> Result<Decimal, PricingError> {
    params.validate()?;
    check_non_negative("unit_cost", unit_cost)?;
    check_non_negative("shipping_fee", shipping_fee)?;
    check_non_negative("extra_markup", params.extra_markup)?;

    let cost_base = unit_cost
        .checked_add(shipping_fee)
        .and_then(|v| v.checked_add(params.extra_markup))
        .ok_or_else(|| PricingError::InvalidInput("cost base overflows".into()))?;
    if cost_base.is_zero() {
        return Err(PricingError::InvalidInput(
            "cost base (unit_cost + shipping_fee + extra_markup) is zero".into(),
        ));
    }

    let raw = cost_base.checked_div(params.divisor()).ok_or_else(|| {
        PricingError::InvalidParameter("rates leave too small a divisor".into())
    })?;
    Ok(round_currency(raw))
}
