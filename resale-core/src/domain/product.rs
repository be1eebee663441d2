//! Product — one scraped listing and its ordered SKUs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::sku::Sku;

/// Category used when the upstream source gives none.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// A marketplace listing.
///
/// `url` and `category` are carried for traceability in exported reports; the
/// pricing math only reads `shipping_fee` and the SKUs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub shipping_fee: Decimal,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub skus: Vec<Sku>,
}

fn default_category() -> String {
    UNKNOWN_CATEGORY.to_string()
}

impl Product {
    pub fn new(title: impl Into<String>, url: impl Into<String>, shipping_fee: Decimal) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            shipping_fee,
            category: default_category(),
            skus: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_sku(mut self, sku: Sku) -> Self {
        self.skus.push(sku);
        self
    }

    pub fn with_skus(mut self, skus: impl IntoIterator<Item = Sku>) -> Self {
        self.skus.extend(skus);
        self
    }

    /// True when the listing has no variants and therefore no computable price.
    pub fn is_degenerate(&self) -> bool {
        self.skus.is_empty()
    }
}

/// Total SKU count across a batch; the number of rows `evaluate` produces.
pub fn sku_count(products: &[Product]) -> usize {
    products.iter().map(|p| p.skus.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn builder_preserves_sku_order() {
        let product = Product::new("Mug", "https://example.com/1", dec!(3))
            .with_sku(Sku::new("white", dec!(4), 10))
            .with_sku(Sku::new("black", dec!(5), 0));
        let specs: Vec<_> = product.skus.iter().map(|s| s.specification.as_str()).collect();
        assert_eq!(specs, vec!["white", "black"]);
    }

    #[test]
    fn empty_product_is_degenerate() {
        let product = Product::new("Empty", "", Decimal::ZERO);
        assert!(product.is_degenerate());
        assert_eq!(sku_count(&[product]), 0);
    }

    #[test]
    fn missing_category_defaults_to_unknown() {
        let product: Product = serde_json::from_str(r#"{"title":"Lamp"}"#).unwrap();
        assert_eq!(product.category, UNKNOWN_CATEGORY);
        assert_eq!(product.shipping_fee, Decimal::ZERO);
        assert!(product.skus.is_empty());
    }

    #[test]
    fn sku_count_sums_across_products() {
        let a = Product::new("a", "", dec!(0)).with_skus([
            Sku::new("1", dec!(1), 1),
            Sku::new("2", dec!(1), 1),
        ]);
        let b = Product::new("b", "", dec!(0)).with_sku(Sku::new("3", dec!(1), 1));
        assert_eq!(sku_count(&[a, b]), 3);
    }
}
