//! Domain types shared by every layer.

pub mod product;
pub mod sku;

pub use product::{sku_count, Product, UNKNOWN_CATEGORY};
pub use sku::Sku;
