//! Resale CLI — price product batches and inspect product files.
//!
//! Commands:
//! - `price` — import products, price every SKU, print a summary, save artifacts
//! - `inspect` — print the imported products and their SKU counts

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use resale_core::{format_currency, sku_count, Product, StrategyKind};
use resale_runner::{
    load_products, price_batch, save_artifacts, BatchReport, PricingConfig, ResolvedPricing,
};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "resale", about = "Resale CLI — batch pricing for resale listings")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price every SKU of a product file and save artifacts.
    Price {
        /// Product file (.csv or .json).
        #[arg(long)]
        input: PathBuf,

        /// Path to a TOML pricing config.
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: PricingOverrides,

        /// Artifact directory name. Defaults to the first product title.
        #[arg(long)]
        name: Option<String>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Print the products and SKU counts of a product file.
    Inspect {
        /// Product file (.csv or .json).
        #[arg(long)]
        input: PathBuf,
    },
}

/// Command-line settings layered over the TOML config.
#[derive(Args, Debug, Default, Clone)]
struct PricingOverrides {
    /// Strategy: default or limited.
    #[arg(long)]
    strategy: Option<String>,

    /// Platform fee rate, e.g. 0.06.
    #[arg(long)]
    platform_fee_rate: Option<Decimal>,

    /// Target margin rate, e.g. 0.20.
    #[arg(long)]
    target_margin_rate: Option<Decimal>,

    /// Flat amount added to the cost base.
    #[arg(long)]
    extra_markup: Option<Decimal>,

    /// Net price to receive under the limited strategy.
    #[arg(long)]
    target_net_price: Option<Decimal>,

    /// Instant coupon absorbed by the listing price.
    #[arg(long)]
    instant_coupon: Option<Decimal>,

    /// Promotion discount as a fraction, e.g. 0.9.
    #[arg(long)]
    discount_rate: Option<Decimal>,

    /// Round prices up to an X.90 ending.
    #[arg(long, default_value_t = false)]
    charm: bool,

    /// Price products on all cores.
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

impl PricingOverrides {
    fn apply(&self, config: &mut PricingConfig) {
        if let Some(strategy) = &self.strategy {
            config.strategy = strategy.clone();
        }
        if let Some(v) = self.platform_fee_rate {
            config.default.platform_fee_rate = v;
        }
        if let Some(v) = self.target_margin_rate {
            config.default.target_margin_rate = v;
        }
        if let Some(v) = self.extra_markup {
            config.default.extra_markup = v;
        }
        if let Some(v) = self.target_net_price {
            config.limited.target_net_price = Some(v);
        }
        if let Some(v) = self.instant_coupon {
            config.limited.instant_coupon = v;
        }
        if let Some(v) = self.discount_rate {
            config.limited.discount_rate = v;
        }
        config.charm_pricing |= self.charm;
        config.parallel |= self.parallel;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Price {
            input,
            config,
            overrides,
            name,
            output_dir,
        } => run_price(&input, config.as_deref(), &overrides, name.as_deref(), &output_dir),
        Commands::Inspect { input } => run_inspect(&input),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "resale_cli=debug,resale_runner=debug"
    } else {
        "resale_cli=info,resale_runner=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_config(
    config_path: Option<&Path>,
    overrides: &PricingOverrides,
) -> Result<ResolvedPricing> {
    let mut config = match config_path {
        Some(path) => PricingConfig::from_file(path)?,
        None => PricingConfig::default(),
    };
    overrides.apply(&mut config);
    // Fail on an unknown strategy or missing setting before reading any products.
    Ok(config.resolve()?)
}

fn run_price(
    input: &Path,
    config_path: Option<&Path>,
    overrides: &PricingOverrides,
    name: Option<&str>,
    output_dir: &Path,
) -> Result<()> {
    let pricing = resolve_config(config_path, overrides)?;

    let products = load_products(input)
        .with_context(|| format!("failed to import {}", input.display()))?;
    info!(
        input = %input.display(),
        products = products.len(),
        skus = sku_count(&products),
        "loaded products"
    );

    let report = price_batch(&products, &pricing)?;
    print_summary(&report);

    let paths = save_artifacts(&report, name, output_dir)?;
    println!("Artifacts saved to: {}", paths.dir.display());

    Ok(())
}

fn run_inspect(input: &Path) -> Result<()> {
    let products = load_products(input)
        .with_context(|| format!("failed to import {}", input.display()))?;
    print_products(&products);
    Ok(())
}

fn print_products(products: &[Product]) {
    println!();
    println!("=== Products ===");
    for (i, product) in products.iter().enumerate() {
        let title: &str = if product.title.is_empty() {
            "(untitled)"
        } else {
            &product.title
        };
        println!(
            "{:>3}. {} [{}] shipping {}, {} SKU(s)",
            i + 1,
            title,
            product.category,
            format_currency(product.shipping_fee),
            product.skus.len()
        );
        if product.is_degenerate() {
            println!("       (no SKUs, nothing to price)");
        }
        for sku in &product.skus {
            let cost = sku
                .unit_cost
                .map(format_currency)
                .unwrap_or_else(|| "missing".to_string());
            println!("       - {} (cost {}, stock {})", sku.specification, cost, sku.stock);
        }
    }
    println!();
    println!("Products:       {}", products.len());
    println!("SKUs:           {}", sku_count(products));
    println!();
}

fn print_summary(report: &BatchReport<'_>) {
    let label = match report.strategy {
        StrategyKind::Default => "Suggested",
        StrategyKind::Limited => "Limited-time",
    };
    println!();
    println!("=== Pricing Result ===");
    println!("Strategy:       {}", report.strategy);
    println!("Products:       {}", report.products.len());
    println!("Fingerprint:    {}", &report.fingerprint[..12.min(report.fingerprint.len())]);
    println!();
    println!("--- Rows ---");
    for row in &report.rows {
        match &row.outcome {
            Ok(quote) => println!(
                "{} / {}: {label} {}",
                row.product.title,
                row.sku.specification,
                format_currency(quote.price)
            ),
            Err(err) => println!(
                "{} / {}: FAILED ({err})",
                row.product.title, row.sku.specification
            ),
        }
    }
    println!();
    println!("--- Quick Check ---");
    let c = &report.check;
    println!("Total rows:     {}", c.total_rows);
    println!("Priced:         {}", c.priced_rows);
    println!("Invalid input:  {}", c.invalid_input_rows);
    println!("Invalid param:  {}", c.invalid_parameter_rows);
    println!("Missing cost:   {}", c.missing_cost_rows);
    println!("Zero stock:     {}", c.zero_stock_rows);
    if !c.all_priced() {
        println!();
        println!("WARNING: {} row(s) could not be priced", c.failed_rows());
    }
    println!();
}
