//! SKU — one purchasable variant of a product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stock-keeping variant (size/color combination) with its own cost and stock.
///
/// `unit_cost` is optional because upstream sources can fail to read it; the
/// engine reports a missing cost as `InvalidInput` rather than guessing zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub specification: String,
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
    #[serde(default)]
    pub stock: u64,
    /// User-edited target net price. Overrides the batch-wide target under
    /// the limited strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_price: Option<Decimal>,
}

impl Sku {
    pub fn new(specification: impl Into<String>, unit_cost: Decimal, stock: u64) -> Self {
        Self {
            specification: specification.into(),
            unit_cost: Some(unit_cost),
            stock,
            planned_price: None,
        }
    }

    /// A SKU whose cost could not be read upstream.
    pub fn without_cost(specification: impl Into<String>, stock: u64) -> Self {
        Self {
            specification: specification.into(),
            unit_cost: None,
            stock,
            planned_price: None,
        }
    }

    pub fn with_planned_price(mut self, planned_price: Decimal) -> Self {
        self.planned_price = Some(planned_price);
        self
    }

    pub fn has_cost(&self) -> bool {
        self.unit_cost.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_sets_cost() {
        let sku = Sku::new("Red / L", dec!(12.50), 40);
        assert_eq!(sku.unit_cost, Some(dec!(12.50)));
        assert!(sku.has_cost());
        assert_eq!(sku.planned_price, None);
    }

    #[test]
    fn without_cost_is_absent() {
        let sku = Sku::without_cost("Blue / M", 0);
        assert!(!sku.has_cost());
    }

    #[test]
    fn deserializes_with_defaults() {
        let sku: Sku = serde_json::from_str(r#"{"specification":"S"}"#).unwrap();
        assert_eq!(sku.unit_cost, None);
        assert_eq!(sku.stock, 0);
        assert_eq!(sku.planned_price, None);
    }
}
