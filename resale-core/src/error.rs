//! Pricing error taxonomy.
//!
//! `InvalidInput` and `InvalidParameter` are per-row outcomes: the engine
//! records them on the affected `PriceResult` and keeps going.
//! `UnknownStrategy` is call-level and is returned before any row is priced.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced while selecting a strategy or pricing a single SKU.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PricingError {
    /// A SKU or product field is missing or negative.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Strategy parameters are outside their valid domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The strategy selector is not one of `default`, `limited`.
    #[error("unknown strategy '{0}' (valid: default, limited)")]
    UnknownStrategy(String),
}

impl PricingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::UnknownStrategy(_) => ErrorKind::UnknownStrategy,
        }
    }

    /// Human-readable detail without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::InvalidInput(msg) | Self::InvalidParameter(msg) | Self::UnknownStrategy(msg) => {
                msg
            }
        }
    }
}

/// Discriminant of [`PricingError`], used by reports and exporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    InvalidParameter,
    UnknownStrategy,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::InvalidParameter => "InvalidParameter",
            Self::UnknownStrategy => "UnknownStrategy",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
