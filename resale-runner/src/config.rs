//! Pricing configuration loaded from TOML.
//!
//! ```toml
//! strategy = "limited"
//! charm_pricing = false
//! parallel = true
//!
//! [default]
//! platform_fee_rate = 0.06
//! target_margin_rate = 0.20
//! extra_markup = 0
//!
//! [limited]
//! target_net_price = 30
//! instant_coupon = 5
//! discount_rate = 0.9
//! ```
//!
//! Both sections may be present; only the one named by `strategy` is used.

use std::path::{Path, PathBuf};

use resale_core::{
    DefaultParams, LimitedParams, PriceAdjustment, PricingEngine, PricingError,
    PricingParameters, StrategyKind,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Errors from loading or resolving a pricing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Strategy(#[from] PricingError),
    #[error("missing required setting `{0}`")]
    MissingField(&'static str),
}

/// `[limited]` section. `target_net_price` has no sensible default and is
/// only required when the limited strategy is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitedSection {
    pub target_net_price: Option<Decimal>,
    pub instant_coupon: Decimal,
    pub discount_rate: Decimal,
}

impl Default for LimitedSection {
    fn default() -> Self {
        Self {
            target_net_price: None,
            instant_coupon: Decimal::new(5, 0),
            discount_rate: Decimal::new(9, 1),
        }
    }
}

/// A config with its selector and parameters already resolved.
///
/// Built once per run by [`PricingConfig::resolve`] so resolution warnings are
/// logged a single time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPricing {
    pub strategy: StrategyKind,
    pub parameters: PricingParameters,
    pub engine: PricingEngine,
    pub parallel: bool,
}

/// Full pricing configuration for one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Strategy selector, resolved against the closed set at run time.
    pub strategy: String,
    /// Round successful prices up to an `X.90` ending.
    pub charm_pricing: bool,
    /// Fan products out across the rayon pool.
    pub parallel: bool,
    pub default: DefaultParams,
    pub limited: LimitedSection,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Default.to_string(),
            charm_pricing: false,
            parallel: false,
            default: DefaultParams::default(),
            limited: LimitedSection::default(),
        }
    }
}

impl PricingConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the strategy selector. Fails with `UnknownStrategy`.
    pub fn strategy_kind(&self) -> Result<StrategyKind, ConfigError> {
        Ok(self.strategy.parse::<StrategyKind>()?)
    }

    /// Resolve the selector and build the matching parameter shape.
    pub fn parameters(&self) -> Result<(StrategyKind, PricingParameters), ConfigError> {
        let kind = self.strategy_kind()?;
        let params = match kind {
            StrategyKind::Default => PricingParameters::Default(self.default.clone()),
            StrategyKind::Limited => {
                let target = self
                    .limited
                    .target_net_price
                    .ok_or(ConfigError::MissingField("limited.target_net_price"))?;
                let params = LimitedParams::new(
                    target,
                    self.limited.instant_coupon,
                    self.limited.discount_rate,
                );
                if params.has_unusual_discount() {
                    warn!(
                        discount_rate = %params.discount_rate,
                        "discount_rate above 1 raises the listing price instead of discounting it"
                    );
                }
                PricingParameters::Limited(params)
            }
        };
        Ok((kind, params))
    }

    /// Resolve everything a batch run needs.
    pub fn resolve(&self) -> Result<ResolvedPricing, ConfigError> {
        let (strategy, parameters) = self.parameters()?;
        Ok(ResolvedPricing {
            strategy,
            parameters,
            engine: self.engine(),
            parallel: self.parallel,
        })
    }

    pub fn adjustment(&self) -> PriceAdjustment {
        if self.charm_pricing {
            PriceAdjustment::Charm
        } else {
            PriceAdjustment::None
        }
    }

    pub fn engine(&self) -> PricingEngine {
        PricingEngine::new().with_adjustment(self.adjustment())
    }
}
