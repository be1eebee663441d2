//! Engine integration tests — worked examples, batch isolation, fail-fast
//! strategy selection.

use resale_core::{
    evaluate, DefaultParams, ErrorKind, LimitedParams, PriceAdjustment, PricingEngine,
    PricingError, PricingParameters, Product, Sku, StrategyKind,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn default_params() -> PricingParameters {
    DefaultParams::default().into()
}

fn catalog() -> Vec<Product> {
    vec![
        Product::new("Ceramic mug", "https://shop.example/mug", dec!(10))
            .with_category("kitchen")
            .with_skus([
                Sku::new("white 350ml", dec!(50), 120),
                Sku::new("black 350ml", dec!(52.40), 80),
                Sku::new("gift box", dec!(61), 0),
            ]),
        Product::new("Linen napkin", "https://shop.example/napkin", dec!(3.5))
            .with_sku(Sku::new("set of 4", dec!(18.90), 40)),
    ]
}

#[test]
fn default_worked_example() {
    let products = vec![Product::new("p", "", dec!(10)).with_sku(Sku::new("s", dec!(50), 1))];
    let rows = evaluate(&products, StrategyKind::Default, &default_params());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].price(), Some(dec!(79.79)));
}

#[test]
fn limited_worked_example() {
    let products = vec![Product::new("p", "", dec!(10)).with_sku(Sku::new("s", dec!(50), 1))];
    let params: PricingParameters = LimitedParams::new(dec!(30), dec!(5), dec!(0.9)).into();
    let rows = evaluate(&products, StrategyKind::Limited, &params);
    assert_eq!(rows[0].price(), Some(dec!(40.00)));
}

#[test]
fn one_row_per_sku_for_whole_catalog() {
    let products = catalog();
    let rows = evaluate(&products, StrategyKind::Default, &default_params());
    assert_eq!(rows.len(), 4);
    // (52.40 + 10) / 0.752 = 82.978...
    assert_eq!(rows[1].price(), Some(dec!(82.98)));
    // (18.90 + 3.5) / 0.752 = 29.787...
    assert_eq!(rows[3].price(), Some(dec!(29.79)));
}

#[test]
fn negative_cost_fails_only_its_row() {
    let mut products = catalog();
    products[0].skus[1].unit_cost = Some(dec!(-4));
    let rows = evaluate(&products, StrategyKind::Default, &default_params());

    let failed: Vec<_> = rows.iter().filter(|r| !r.is_priced()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].sku.specification, "black 350ml");
    assert_eq!(
        failed[0].error().map(PricingError::kind),
        Some(ErrorKind::InvalidInput)
    );
    assert_eq!(rows[0].price(), Some(dec!(79.79)));
}

#[test]
fn uniform_bad_discount_fails_every_row_without_aborting() {
    let products = catalog();
    let params: PricingParameters = LimitedParams::new(dec!(30), dec!(5), dec!(0)).into();
    let rows = evaluate(&products, StrategyKind::Limited, &params);
    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert_eq!(
            row.error().map(PricingError::kind),
            Some(ErrorKind::InvalidParameter)
        );
    }
}

#[test]
fn uniform_bad_fee_rate_fails_every_row() {
    let products = catalog();
    let params: PricingParameters = DefaultParams::new(dec!(1), dec!(0.2)).into();
    let rows = evaluate(&products, StrategyKind::Default, &params);
    assert!(rows
        .iter()
        .all(|r| matches!(r.error(), Some(PricingError::InvalidParameter(_)))));
}

#[test]
fn unknown_strategy_fails_before_any_row() {
    let products = catalog();
    let result = PricingEngine::new().evaluate_named(&products, "aggressive", &default_params());
    assert_eq!(
        result.unwrap_err(),
        PricingError::UnknownStrategy("aggressive".into())
    );
}

#[test]
fn empty_batch_and_empty_products_give_no_rows() {
    let rows = evaluate(&[], StrategyKind::Default, &default_params());
    assert!(rows.is_empty());

    let products = vec![
        Product::new("no variants", "", dec!(1)),
        Product::new("also none", "", dec!(2)),
    ];
    let rows = evaluate(&products, StrategyKind::Default, &default_params());
    assert!(rows.is_empty());
}

#[test]
fn repeated_evaluation_is_identical() {
    let products = catalog();
    let a = evaluate(&products, StrategyKind::Default, &default_params());
    let b = evaluate(&products, StrategyKind::Default, &default_params());
    assert_eq!(a, b);
    assert_eq!(format!("{a:?}"), format!("{b:?}"));
}

#[test]
fn rows_reference_their_source_records() {
    let products = catalog();
    let rows = evaluate(&products, StrategyKind::Default, &default_params());
    for row in &rows {
        let product = &products[row.position.product_index];
        assert!(std::ptr::eq(row.product, product));
        assert!(std::ptr::eq(row.sku, &product.skus[row.position.sku_index]));
    }
}

#[test]
fn charm_near_decimal_max_keeps_formula_price() {
    let products = vec![Product::new("p", "", dec!(0)).with_sku(Sku::new("s", Decimal::MAX, 1))];
    let params: PricingParameters = DefaultParams::new(dec!(0), dec!(0)).into();
    let rows = PricingEngine::new()
        .with_adjustment(PriceAdjustment::Charm)
        .evaluate(&products, StrategyKind::Default, &params);
    assert_eq!(rows.len(), 1);
    let quote = rows[0].outcome.as_ref().unwrap();
    assert_eq!(quote.formula_price, Decimal::MAX);
    assert_eq!(quote.price, Decimal::MAX);
}
