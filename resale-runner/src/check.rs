//! Quick-check counts over a priced batch.

use resale_core::{ErrorKind, PriceResult};
use serde::{Deserialize, Serialize};

/// Row counts a reviewer scans before publishing a price list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickCheck {
    pub total_rows: usize,
    pub priced_rows: usize,
    pub invalid_input_rows: usize,
    pub invalid_parameter_rows: usize,
    /// Rows whose SKU had no readable cost (a subset of `invalid_input_rows`).
    pub missing_cost_rows: usize,
    /// Informational: stock never affects pricing.
    pub zero_stock_rows: usize,
}

impl QuickCheck {
    pub fn from_rows(rows: &[PriceResult<'_>]) -> Self {
        let mut check = Self {
            total_rows: rows.len(),
            ..Self::default()
        };
        for row in rows {
            match row.error().map(|e| e.kind()) {
                None => check.priced_rows += 1,
                Some(ErrorKind::InvalidInput) => check.invalid_input_rows += 1,
                Some(ErrorKind::InvalidParameter) => check.invalid_parameter_rows += 1,
                // Resolved before evaluation; never appears on a row.
                Some(ErrorKind::UnknownStrategy) => {}
            }
            if !row.sku.has_cost() {
                check.missing_cost_rows += 1;
            }
            if row.sku.stock == 0 {
                check.zero_stock_rows += 1;
            }
        }
        check
    }

    pub fn failed_rows(&self) -> usize {
        self.total_rows - self.priced_rows
    }

    pub fn all_priced(&self) -> bool {
        self.priced_rows == self.total_rows
    }
}
