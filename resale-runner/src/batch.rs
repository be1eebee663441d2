//! Batch runner — resolves a `PricingConfig`, prices every SKU, and
//! summarises the outcome.
//!
//! The parallel path fans products out across the rayon pool. Each task
//! carries its product index and the indexed `collect` restores input order,
//! so both paths return identical rows.

use rayon::prelude::*;
use resale_core::{
    PriceAdjustment, PriceResult, PricingEngine, PricingParameters, Product, StrategyKind,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::check::QuickCheck;
use crate::config::{ConfigError, PricingConfig, ResolvedPricing};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to fingerprint run: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Everything a batch run produced, borrowing the input products.
#[derive(Debug, Clone)]
pub struct BatchReport<'a> {
    pub products: &'a [Product],
    pub strategy: StrategyKind,
    pub parameters: PricingParameters,
    pub adjustment: PriceAdjustment,
    /// blake3 hex digest of the products and resolved parameters.
    pub fingerprint: String,
    pub rows: Vec<PriceResult<'a>>,
    pub check: QuickCheck,
}

/// Price a batch under `config`.
///
/// Only configuration problems (unknown strategy, missing settings) fail the
/// call; per-row problems are recorded on the rows.
pub fn run_batch<'a>(
    products: &'a [Product],
    config: &PricingConfig,
) -> Result<BatchReport<'a>, RunError> {
    price_batch(products, &config.resolve()?)
}

/// Price a batch under settings that were already resolved.
pub fn price_batch<'a>(
    products: &'a [Product],
    pricing: &ResolvedPricing,
) -> Result<BatchReport<'a>, RunError> {
    let ResolvedPricing {
        strategy,
        ref parameters,
        engine,
        parallel,
    } = *pricing;
    let fingerprint = fingerprint(products, parameters, engine.adjustment())?;

    info!(
        strategy = %strategy,
        products = products.len(),
        parallel,
        "pricing batch"
    );
    if let Err(e) = parameters.validate() {
        warn!(error = %e, "parameters are invalid, every row will fail");
    }
    let empty = products.iter().filter(|p| p.is_degenerate()).count();
    if empty > 0 {
        debug!(products = empty, "products without SKUs contribute no rows");
    }

    let rows = if parallel {
        evaluate_parallel(&engine, products, strategy, parameters)
    } else {
        engine.evaluate(products, strategy, parameters)
    };

    let check = QuickCheck::from_rows(&rows);
    for row in rows.iter().filter(|r| !r.is_priced()) {
        debug!(
            product = %row.product.title,
            sku = %row.sku.specification,
            error = %row.error().map(|e| e.to_string()).unwrap_or_default(),
            "row not priced"
        );
    }
    if check.failed_rows() > 0 {
        warn!(
            failed = check.failed_rows(),
            total = check.total_rows,
            "some rows could not be priced"
        );
    }
    info!(priced = check.priced_rows, total = check.total_rows, "batch complete");

    Ok(BatchReport {
        products,
        strategy,
        parameters: parameters.clone(),
        adjustment: engine.adjustment(),
        fingerprint,
        rows,
        check,
    })
}

/// Evaluate products on the rayon pool, preserving input order.
pub fn evaluate_parallel<'a>(
    engine: &PricingEngine,
    products: &'a [Product],
    strategy: StrategyKind,
    params: &PricingParameters,
) -> Vec<PriceResult<'a>> {
    let per_product: Vec<Vec<PriceResult<'a>>> = products
        .par_iter()
        .enumerate()
        .map(|(idx, product)| engine.evaluate_product(idx, product, strategy, params))
        .collect();
    per_product.into_iter().flatten().collect()
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    products: &'a [Product],
    parameters: &'a PricingParameters,
    adjustment: PriceAdjustment,
}

/// Deterministic identity of a run: same products and settings, same digest.
pub fn fingerprint(
    products: &[Product],
    parameters: &PricingParameters,
    adjustment: PriceAdjustment,
) -> Result<String, serde_json::Error> {
    let mut hasher = blake3::Hasher::new();
    serde_json::to_writer(
        &mut hasher,
        &FingerprintInput {
            products,
            parameters,
            adjustment,
        },
    )?;
    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resale_core::{DefaultParams, PricingError, Sku};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn products() -> Vec<Product> {
        (0u64..20)
            .map(|i| {
                let skus = (0..i % 4)
                    .map(move |j| Sku::new(format!("s{j}"), Decimal::from(i + j + 1), j));
                Product::new(format!("p{i}"), format!("https://s/{i}"), dec!(1.5))
                    .with_skus(skus)
            })
            .collect()
    }

    #[test]
    fn parallel_matches_sequential() {
        let products = products();
        let params: PricingParameters = DefaultParams::default().into();
        let engine = PricingEngine::new();
        let seq = engine.evaluate(&products, StrategyKind::Default, &params);
        let par = evaluate_parallel(&engine, &products, StrategyKind::Default, &params);
        assert_eq!(seq, par);
    }

    #[test]
    fn run_batch_fills_report() {
        let products = products();
        let config = PricingConfig {
            parallel: true,
            ..PricingConfig::default()
        };
        let report = run_batch(&products, &config).unwrap();
        assert_eq!(report.strategy, StrategyKind::Default);
        assert_eq!(report.rows.len(), resale_core::sku_count(&products));
        assert!(report.check.all_priced());
        assert_eq!(report.fingerprint.len(), 64);
    }

    #[test]
    fn price_batch_matches_run_batch() {
        let products = products();
        let config = PricingConfig {
            charm_pricing: true,
            ..PricingConfig::default()
        };
        let resolved = ResolvedPricing {
            strategy: StrategyKind::Default,
            parameters: DefaultParams::default().into(),
            engine: PricingEngine::new().with_adjustment(PriceAdjustment::Charm),
            parallel: true,
        };
        let direct = price_batch(&products, &resolved).unwrap();
        let via_config = run_batch(&products, &config).unwrap();
        assert_eq!(direct.rows, via_config.rows);
        assert_eq!(direct.fingerprint, via_config.fingerprint);
        assert_eq!(direct.adjustment, PriceAdjustment::Charm);
    }

    #[test]
    fn unknown_strategy_fails_the_run() {
        let products = products();
        let config = PricingConfig {
            strategy: "aggressive".into(),
            ..PricingConfig::default()
        };
        let err = run_batch(&products, &config).unwrap_err();
        assert!(matches!(
            err,
            RunError::Config(ConfigError::Strategy(PricingError::UnknownStrategy(_)))
        ));
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let products = products();
        let params: PricingParameters = DefaultParams::default().into();
        let a = fingerprint(&products, &params, PriceAdjustment::None).unwrap();
        let b = fingerprint(&products, &params, PriceAdjustment::None).unwrap();
        assert_eq!(a, b);

        let charm = fingerprint(&products, &params, PriceAdjustment::Charm).unwrap();
        assert_ne!(a, charm);

        let other: PricingParameters = DefaultParams::new(dec!(0.05), dec!(0.2)).into();
        assert_ne!(a, fingerprint(&products, &other, PriceAdjustment::None).unwrap());
    }
}
