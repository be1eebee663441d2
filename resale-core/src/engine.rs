//! Pricing engine — applies one strategy across every SKU of a batch.
//!
//! Per-row failures (`InvalidInput`, `InvalidParameter`) are captured on the
//! row and never stop the batch. Output order is product-major, SKU-minor,
//! matching the input exactly. Products without SKUs produce no rows.
//!
//! The engine holds only immutable configuration, so one instance can be
//! shared across threads; every call is a pure function of its arguments.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Product, Sku};
use crate::error::PricingError;
use crate::money::PriceAdjustment;
use crate::strategy::{final_price, suggested_price, PricingParameters, StrategyKind};

/// Position of a row in the input batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowRef {
    pub product_index: usize,
    pub sku_index: usize,
}

/// A successfully computed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Price to publish, after any price-ending adjustment.
    pub price: Decimal,
    /// Strategy output before adjustment (already currency-rounded).
    pub formula_price: Decimal,
}

/// One output row: a product/SKU pair with its price or failure reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceResult<'a> {
    pub position: RowRef,
    pub product: &'a Product,
    pub sku: &'a Sku,
    pub outcome: Result<Quote, PricingError>,
}

impl PriceResult<'_> {
    pub fn price(&self) -> Option<Decimal> {
        self.outcome.as_ref().ok().map(|q| q.price)
    }

    pub fn error(&self) -> Option<&PricingError> {
        self.outcome.as_ref().err()
    }

    pub fn is_priced(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Stateless batch evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricingEngine {
    adjustment: PriceAdjustment,
}

impl PricingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adjustment(mut self, adjustment: PriceAdjustment) -> Self {
        self.adjustment = adjustment;
        self
    }

    pub fn adjustment(&self) -> PriceAdjustment {
        self.adjustment
    }

    /// Price every SKU of every product under `strategy`.
    ///
    /// Returns exactly one row per input SKU. `params` whose shape does not
    /// match `strategy` fail every row with `InvalidParameter`.
    pub fn evaluate<'a>(
        &self,
        products: &'a [Product],
        strategy: StrategyKind,
        params: &PricingParameters,
    ) -> Vec<PriceResult<'a>> {
        products
            .iter()
            .enumerate()
            .flat_map(|(product_index, product)| {
                self.evaluate_product(product_index, product, strategy, params)
            })
            .collect()
    }

    /// Resolve a strategy selector, then evaluate.
    ///
    /// An unrecognised selector returns `UnknownStrategy` before any row is
    /// priced.
    pub fn evaluate_named<'a>(
        &self,
        products: &'a [Product],
        selector: &str,
        params: &PricingParameters,
    ) -> Result<Vec<PriceResult<'a>>, PricingError> {
        let strategy: StrategyKind = selector.parse()?;
        Ok(self.evaluate(products, strategy, params))
    }

    /// Rows for a single product, tagged with its batch index.
    ///
    /// Building block for callers that fan products out across threads and
    /// reassemble the batch in index order.
    pub fn evaluate_product<'a>(
        &self,
        product_index: usize,
        product: &'a Product,
        strategy: StrategyKind,
        params: &PricingParameters,
    ) -> Vec<PriceResult<'a>> {
        product
            .skus
            .iter()
            .enumerate()
            .map(|(sku_index, sku)| PriceResult {
                position: RowRef {
                    product_index,
                    sku_index,
                },
                product,
                sku,
                outcome: self.price_sku(product, sku, strategy, params),
            })
            .collect()
    }

    /// Price one SKU of `product`.
    pub fn price_sku(
        &self,
        product: &Product,
        sku: &Sku,
        strategy: StrategyKind,
        params: &PricingParameters,
    ) -> Result<Quote, PricingError> {
        let unit_cost = checked_unit_cost(sku)?;

        if params.kind() != strategy {
            return Err(PricingError::InvalidParameter(format!(
                "{} parameters cannot drive the {} strategy",
                params.kind(),
                strategy
            )));
        }

        let formula_price = match params {
            PricingParameters::Default(p) => suggested_price(unit_cost, product.shipping_fee, p)?,
            PricingParameters::Limited(p) => match sku.planned_price {
                Some(planned) if planned < Decimal::ZERO => {
                    return Err(PricingError::InvalidInput(format!(
                        "planned_price must not be negative, got {planned}"
                    )));
                }
                Some(planned) => final_price(&p.with_target(planned))?,
                None => final_price(p)?,
            },
        };

        Ok(Quote {
            price: self.adjustment.apply(formula_price),
            formula_price,
        })
    }
}

/// Price a batch with the default engine (no price-ending adjustment).
pub fn evaluate<'a>(
    products: &'a [Product],
    strategy: StrategyKind,
    params: &PricingParameters,
) -> Vec<PriceResult<'a>> {
    PricingEngine::new().evaluate(products, strategy, params)
}

/// Upstream data is re-validated: cost must be present and non-negative.
fn checked_unit_cost(sku: &Sku) -> Result<Decimal, PricingError> {
    match sku.unit_cost {
        None => Err(PricingError::InvalidInput(format!(
            "unit_cost missing for '{}'",
            sku.specification
        ))),
        Some(cost) if cost < Decimal::ZERO => Err(PricingError::InvalidInput(format!(
            "unit_cost must not be negative, got {cost}"
        ))),
        Some(cost) => Ok(cost),
    }
}
