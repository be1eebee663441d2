//! Reporting and export — CSV, JSON, and Markdown artifacts for a batch run.
//!
//! - **CSV**: one row per SKU, price column named after the strategy
//! - **JSON**: the same rows as an array, for downstream tooling
//! - **Markdown**: run metadata, quick-check counts, and the results table
//! - **Manifest**: strategy, parameters, fingerprint and counts, versioned
//!
//! Failed rows keep their place in every format with a blank price and the
//! error kind in the `status` column.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use resale_core::{
    format_currency, PriceAdjustment, PriceResult, PricingParameters, StrategyKind,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::batch::BatchReport;
use crate::check::QuickCheck;

/// Current schema version for persisted manifests.
pub const SCHEMA_VERSION: u32 = 1;

/// Name used when neither a base name, title, nor specification is available.
pub const FALLBACK_ARTIFACT_NAME: &str = "products";

/// Status written for successfully priced rows.
pub const STATUS_OK: &str = "ok";

// ─── Row shape ──────────────────────────────────────────────────────

/// Owned, flattened result row as written to CSV and JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub title: String,
    pub url: String,
    pub category: String,
    pub specification: String,
    pub stock: u64,
    pub unit_cost: Option<Decimal>,
    pub shipping_fee: Decimal,
    /// Strategy output before any price-ending adjustment.
    pub formula_price: Option<Decimal>,
    pub price: Option<Decimal>,
    /// `ok`, or the error kind (`InvalidInput`, `InvalidParameter`).
    pub status: String,
    pub error: Option<String>,
}

impl From<&PriceResult<'_>> for ExportRow {
    fn from(row: &PriceResult<'_>) -> Self {
        let (formula_price, price, status, error) = match &row.outcome {
            Ok(q) => (Some(q.formula_price), Some(q.price), STATUS_OK.to_string(), None),
            Err(e) => (
                None,
                None,
                e.kind().to_string(),
                Some(e.detail().to_string()),
            ),
        };
        Self {
            title: row.product.title.clone(),
            url: row.product.url.clone(),
            category: row.product.category.clone(),
            specification: row.sku.specification.clone(),
            stock: row.sku.stock,
            unit_cost: row.sku.unit_cost,
            shipping_fee: row.product.shipping_fee,
            formula_price,
            price,
            status,
            error,
        }
    }
}

pub fn export_rows(rows: &[PriceResult<'_>]) -> Vec<ExportRow> {
    rows.iter().map(ExportRow::from).collect()
}

fn fmt_money(value: Option<Decimal>) -> String {
    value.map(format_currency).unwrap_or_default()
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export result rows as CSV.
///
/// Columns: title, url, category, specification, stock, unit_cost,
/// shipping_fee, formula_price, {price label}, status, error. The price
/// column is `suggested_price` or `limited_time_price` depending on the
/// strategy.
pub fn export_results_csv(rows: &[PriceResult<'_>], strategy: StrategyKind) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "title",
        "url",
        "category",
        "specification",
        "stock",
        "unit_cost",
        "shipping_fee",
        "formula_price",
        strategy.price_label(),
        "status",
        "error",
    ])?;

    for row in export_rows(rows) {
        wtr.write_record([
            &row.title,
            &row.url,
            &row.category,
            &row.specification,
            &row.stock.to_string(),
            &fmt_money(row.unit_cost),
            &format_currency(row.shipping_fee),
            &fmt_money(row.formula_price),
            &fmt_money(row.price),
            &row.status,
            row.error.as_deref().unwrap_or(""),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize result rows to pretty JSON.
pub fn export_results_json(rows: &[PriceResult<'_>]) -> Result<String> {
    serde_json::to_string_pretty(&export_rows(rows)).context("failed to serialize result rows")
}

// ─── Manifest ───────────────────────────────────────────────────────

/// Run metadata persisted next to the result tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: DateTime<Local>,
    pub strategy: StrategyKind,
    pub parameters: PricingParameters,
    pub adjustment: PriceAdjustment,
    pub fingerprint: String,
    pub product_count: usize,
    pub check: QuickCheck,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunManifest {
    pub fn from_report(report: &BatchReport<'_>, generated_at: DateTime<Local>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at,
            strategy: report.strategy,
            parameters: report.parameters.clone(),
            adjustment: report.adjustment,
            fingerprint: report.fingerprint.clone(),
            product_count: report.products.len(),
            check: report.check,
        }
    }
}

/// Load a manifest, rejecting unknown schema versions.
pub fn load_manifest(path: &Path) -> Result<RunManifest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: RunManifest =
        serde_json::from_str(&json).context("failed to deserialize run manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        anyhow::bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for one batch run.
pub fn generate_report(report: &BatchReport<'_>) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Pricing Report\n\n");

    md.push_str("## Run\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Strategy | {} |\n", report.strategy));
    match &report.parameters {
        PricingParameters::Default(p) => {
            md.push_str(&format!("| Platform fee rate | {} |\n", p.platform_fee_rate));
            md.push_str(&format!("| Target margin rate | {} |\n", p.target_margin_rate));
            md.push_str(&format!("| Extra markup | {} |\n", p.extra_markup));
        }
        PricingParameters::Limited(p) => {
            md.push_str(&format!("| Target net price | {} |\n", p.target_net_price));
            md.push_str(&format!("| Instant coupon | {} |\n", p.instant_coupon));
            md.push_str(&format!("| Discount rate | {} |\n", p.discount_rate));
        }
    }
    if report.adjustment == PriceAdjustment::Charm {
        md.push_str("| Price endings | charm (X.90) |\n");
    }
    md.push_str(&format!("| Products | {} |\n", report.products.len()));
    md.push_str(&format!("| Fingerprint | `{}` |\n", report.fingerprint));
    md.push('\n');

    let c = &report.check;
    md.push_str("## Quick Check\n\n");
    md.push_str("| Check | Rows |\n");
    md.push_str("| --- | ---: |\n");
    md.push_str(&format!("| Total | {} |\n", c.total_rows));
    md.push_str(&format!("| Priced | {} |\n", c.priced_rows));
    md.push_str(&format!("| Invalid input | {} |\n", c.invalid_input_rows));
    md.push_str(&format!("| Invalid parameter | {} |\n", c.invalid_parameter_rows));
    md.push_str(&format!("| Missing cost | {} |\n", c.missing_cost_rows));
    md.push_str(&format!("| Zero stock | {} |\n", c.zero_stock_rows));
    md.push('\n');

    md.push_str("## Results\n\n");
    if report.rows.is_empty() {
        md.push_str("_No SKUs to price._\n");
        return md;
    }
    md.push_str(&format!(
        "| Product | Specification | Stock | Unit cost | Shipping | {} | Status |\n",
        report.strategy.price_label()
    ));
    md.push_str("| --- | --- | ---: | ---: | ---: | ---: | --- |\n");
    for row in export_rows(&report.rows) {
        let status = match &row.error {
            Some(detail) => format!("{}: {}", row.status, escape_cell(detail)),
            None => row.status.clone(),
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            escape_cell(&row.title),
            escape_cell(&row.specification),
            row.stock,
            fmt_money(row.unit_cost),
            format_currency(row.shipping_fee),
            fmt_money(row.price),
            status,
        ));
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Paths of the files written by [`save_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub results_csv: PathBuf,
    pub results_json: PathBuf,
    pub report_markdown: PathBuf,
    pub manifest: PathBuf,
}

/// Replace characters that are illegal in file names on common platforms.
pub fn sanitize_file_stem(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Artifact directory stem: explicit base name, else the first product
/// title, else the first SKU specification, else `products`.
pub fn artifact_name(base_name: Option<&str>, report: &BatchReport<'_>) -> String {
    let first_title = report
        .products
        .iter()
        .map(|p| p.title.trim())
        .find(|t| !t.is_empty());
    let first_spec = report
        .products
        .iter()
        .flat_map(|p| p.skus.iter())
        .map(|s| s.specification.trim())
        .find(|s| !s.is_empty());

    let raw = base_name
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .or(first_title)
        .or(first_spec)
        .unwrap_or(FALLBACK_ARTIFACT_NAME);
    sanitize_file_stem(raw)
}

/// Save the full artifact set for one batch run.
///
/// Creates `{name}_{strategy}_{timestamp}/` under `output_dir` containing:
/// - `results.csv` — one row per SKU
/// - `results.json` — the same rows as JSON
/// - `report.md` — human-readable summary
/// - `manifest.json` — run metadata
pub fn save_artifacts(
    report: &BatchReport<'_>,
    base_name: Option<&str>,
    output_dir: &Path,
) -> Result<ArtifactPaths> {
    save_artifacts_at(report, base_name, output_dir, Local::now())
}

/// [`save_artifacts`] with an explicit timestamp.
pub fn save_artifacts_at(
    report: &BatchReport<'_>,
    base_name: Option<&str>,
    output_dir: &Path,
    now: DateTime<Local>,
) -> Result<ArtifactPaths> {
    let dirname = format!(
        "{}_{}_{}",
        artifact_name(base_name, report),
        report.strategy,
        now.format("%Y%m%d_%H%M%S")
    );
    let dir = output_dir.join(dirname);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create artifact dir: {}", dir.display()))?;

    let paths = ArtifactPaths {
        results_csv: dir.join("results.csv"),
        results_json: dir.join("results.json"),
        report_markdown: dir.join("report.md"),
        manifest: dir.join("manifest.json"),
        dir,
    };

    write_file(&paths.results_csv, &export_results_csv(&report.rows, report.strategy)?)?;
    write_file(&paths.results_json, &export_results_json(&report.rows)?)?;
    write_file(&paths.report_markdown, &generate_report(report))?;

    let manifest = RunManifest::from_report(report, now);
    let manifest_json =
        serde_json::to_string_pretty(&manifest).context("failed to serialize run manifest")?;
    write_file(&paths.manifest, &manifest_json)?;

    Ok(paths)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
