//! Pricing strategies — a closed set of two formulas.
//!
//! Selection is an enum, not a registry: `StrategyKind` names the formula and
//! `PricingParameters` carries the matching parameter shape. Parsing a
//! selector string is the only place `UnknownStrategy` can arise.

pub mod default;
pub mod limited;

pub use default::{suggested_price, DefaultParams};
pub use limited::{final_price, LimitedParams, TRANSACTION_FEE};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PricingError;

/// Identifier of a pricing formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Cost plus platform fee plus margin.
    Default,
    /// Promotion reverse-engineering.
    Limited,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::Default, StrategyKind::Limited];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Limited => "limited",
        }
    }

    /// Column label used by exporters for the computed price.
    pub fn price_label(&self) -> &'static str {
        match self {
            Self::Default => "suggested_price",
            Self::Limited => "limited_time_price",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = PricingError;

    /// Exact, lowercase match against the closed set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "limited" => Ok(Self::Limited),
            other => Err(PricingError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Strategy configuration: exactly one of the two parameter shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PricingParameters {
    Default(DefaultParams),
    Limited(LimitedParams),
}

impl PricingParameters {
    /// The strategy these parameters are shaped for.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Default(_) => StrategyKind::Default,
            Self::Limited(_) => StrategyKind::Limited,
        }
    }

    /// Parameter-level validation, independent of any SKU.
    pub fn validate(&self) -> Result<(), PricingError> {
        match self {
            Self::Default(p) => p.validate(),
            Self::Limited(p) => p.validate(),
        }
    }
}

impl From<DefaultParams> for PricingParameters {
    fn from(params: DefaultParams) -> Self {
        Self::Default(params)
    }
}

impl From<LimitedParams> for PricingParameters {
    fn from(params: LimitedParams) -> Self {
        Self::Limited(params)
    }
}
