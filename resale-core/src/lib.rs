//! Resale Core — product model, pricing strategies, batch evaluation.
//!
//! This crate is pure computation with no I/O:
//! - Domain types (`Product`, `Sku`)
//! - Two pricing strategies behind a closed enum (`default`, `limited`)
//! - Currency rounding and optional charm pricing
//! - The pricing engine, which prices a batch row by row and records
//!   per-row failures instead of aborting

pub mod domain;
pub mod engine;
pub mod error;
pub mod money;
pub mod strategy;

pub use domain::{sku_count, Product, Sku};
pub use engine::{evaluate, PriceResult, PricingEngine, Quote, RowRef};
pub use error::{ErrorKind, PricingError};
pub use money::{charm_price, format_currency, round_currency, PriceAdjustment};
pub use strategy::{DefaultParams, LimitedParams, PricingParameters, StrategyKind};
