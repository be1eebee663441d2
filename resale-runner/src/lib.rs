//! Resale Runner — configuration, product import, batch runs, and exports.
//!
//! This crate builds on `resale-core` to provide:
//! - TOML pricing configuration with per-strategy sections
//! - CSV/JSON product import with column aliasing
//! - Sequential and rayon-parallel batch runs with a quick-check summary
//! - Run fingerprinting (blake3)
//! - CSV, JSON, Markdown and manifest artifacts

pub mod batch;
pub mod check;
pub mod config;
pub mod export;
pub mod import;

pub use batch::{evaluate_parallel, fingerprint, price_batch, run_batch, BatchReport, RunError};
pub use check::QuickCheck;
pub use config::{ConfigError, LimitedSection, PricingConfig, ResolvedPricing};
pub use export::{
    artifact_name, export_results_csv, export_results_json, generate_report, load_manifest,
    sanitize_file_stem, save_artifacts, save_artifacts_at, ArtifactPaths, ExportRow, RunManifest,
};
pub use import::{load_products, read_products_csv, read_products_json, ImportError};
