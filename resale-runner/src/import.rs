//! Product import from CSV or JSON files.
//!
//! CSV files carry one row per SKU. Header names are matched against an
//! alias table (English and Chinese, case-insensitive), so exports from most
//! spreadsheet tools load without renaming columns. The header need not be
//! the first row: banner rows above it are skipped. Rows are grouped into
//! products by URL, falling back to title, then to a per-row key.
//!
//! Money cells use `.` as the decimal point. Commas are accepted only as
//! thousands separators (`1,250.50`); a cell such as `12,5` is rejected.
//!
//! JSON files hold an array of `Product` records in the core serde shape.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use resale_core::{Product, Sku};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

/// Specification used when a row leaves the column blank.
pub const DEFAULT_SPECIFICATION: &str = "default";

/// Errors from loading a product file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no specification or unit cost column found (headers: {0})")]
    MissingColumns(String),
    #[error("unsupported product file '{0}' (expected .csv or .json)")]
    UnsupportedFormat(String),
}

// ─── Column aliases ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Specification,
    UnitCost,
    PlannedPrice,
    Stock,
    ShippingFee,
    Title,
    Url,
    Category,
}

const ALIASES: &[(Field, &[&str])] = &[
    (
        Field::Specification,
        &["specification", "spec", "sku", "sku_name", "name", "规格", "sku名称", "sku名"],
    ),
    (
        Field::UnitCost,
        &["unit_cost", "cost", "price", "base_cost", "成本", "价格", "价格(元)", "原价"],
    ),
    (
        Field::PlannedPrice,
        &["planned_price", "selling_price", "target_price", "实际成交价", "成交价", "售价"],
    ),
    (Field::Stock, &["stock", "quantity", "count", "库存", "库存(件数)"]),
    (
        Field::ShippingFee,
        &["shipping_fee", "shipping", "freight", "shipping_cost", "运费", "运费(元)", "快递运费"],
    ),
    (
        Field::Title,
        &["title", "product_name", "product_title", "商品标题", "标题", "商品名"],
    ),
    (Field::Url, &["url", "link", "product_url", "链接", "商品链接"]),
    (Field::Category, &["category", "type", "类目", "分类"]),
];

fn field_for_header(header: &str) -> Option<Field> {
    let needle = header.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(_, names)| names.iter().any(|n| *n == needle))
        .map(|(field, _)| *field)
}

/// Rows searched for the header before falling back to the first row.
const HEADER_SCAN_ROWS: usize = 20;

/// Score a row needs to be taken as the header.
const MIN_HEADER_SCORE: usize = 2;

/// Substrings that mark a header cell even when it is not an exact alias.
const HEADER_HINTS: &[&str] = &["sku", "price", "价格"];

/// One point per exact alias, one more per cell containing a hint.
fn header_score(record: &csv::StringRecord) -> usize {
    record
        .iter()
        .map(|cell| cell.trim().to_lowercase())
        .filter(|cell| !cell.is_empty())
        .map(|cell| {
            let alias = usize::from(field_for_header(&cell).is_some());
            let hint = usize::from(HEADER_HINTS.iter().any(|h| cell.contains(h)));
            alias + hint
        })
        .sum()
}

/// Earliest best-scoring row among the first `HEADER_SCAN_ROWS`, if it
/// reaches `MIN_HEADER_SCORE`.
fn detect_header_row(records: &[csv::StringRecord]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, record) in records.iter().take(HEADER_SCAN_ROWS).enumerate() {
        let score = header_score(record);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((idx, score));
        }
    }
    best.filter(|&(_, score)| score >= MIN_HEADER_SCORE)
        .map(|(idx, _)| idx)
}

/// Header position for each recognised field. First matching column wins.
fn build_column_map(headers: &csv::StringRecord) -> HashMap<Field, usize> {
    let mut map = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(field) = field_for_header(header) {
            map.entry(field).or_insert(idx);
        }
    }
    map
}

// ─── Cell parsing ───────────────────────────────────────────────────

fn cell<'r>(
    record: &'r csv::StringRecord,
    columns: &HashMap<Field, usize>,
    field: Field,
) -> &'r str {
    columns
        .get(&field)
        .and_then(|&i| record.get(i))
        .unwrap_or("")
}

/// `1,250.50` style grouping: 1-3 leading digits, then groups of exactly 3,
/// and no comma after the decimal point.
fn is_thousands_grouped(number: &str) -> bool {
    let (integer, fraction) = number.split_once('.').unwrap_or((number, ""));
    let integer = integer.strip_prefix('-').unwrap_or(integer);
    let digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    let mut groups = integer.split(',');
    let lead = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && digits(g));
    lead && groups.all(|g| g.len() == 3 && digits(g)) && !fraction.contains(',')
}

/// Parse a money cell. Currency symbols are stripped and commas are allowed
/// as thousands separators only; blank or unparsable cells yield `None`.
fn parse_decimal(raw: &str, column: &str, line: u64) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('元')
        .chars()
        .filter(|c| !matches!(c, '¥' | '￥' | '$' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.contains(',') && !is_thousands_grouped(&cleaned) {
        warn!(line, column, value = raw, "ambiguous comma in decimal cell, treating as missing");
        return None;
    }
    match cleaned.replace(',', "").parse::<Decimal>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(line, column, value = raw, "unparsable decimal cell, treating as missing");
            None
        }
    }
}

fn parse_stock(raw: &str, line: u64) -> u64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return n;
    }
    // "12.0" style cells from spreadsheet exports.
    let whole = trimmed
        .parse::<Decimal>()
        .ok()
        .filter(|d| d.fract().is_zero())
        .and_then(|d| d.to_u64());
    whole.unwrap_or_else(|| {
        warn!(line, value = raw, "unparsable stock cell, using 0");
        0
    })
}

// ─── Readers ────────────────────────────────────────────────────────

/// Load products, choosing the parser by file extension.
pub fn load_products(path: &Path) -> Result<Vec<Product>, ImportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let open = || {
        std::fs::File::open(path).map_err(|source| ImportError::Io {
            path: path.display().to_string(),
            source,
        })
    };
    let products = match extension.as_deref() {
        Some("csv") => read_products_csv(open()?)?,
        Some("json") => read_products_json(open()?)?,
        _ => return Err(ImportError::UnsupportedFormat(path.display().to_string())),
    };
    debug!(
        path = %path.display(),
        products = products.len(),
        skus = resale_core::sku_count(&products),
        "imported products"
    );
    Ok(products)
}

/// Read a JSON array of products.
pub fn read_products_json<R: Read>(reader: R) -> Result<Vec<Product>, ImportError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Read one-row-per-SKU CSV and group rows into products.
///
/// The header is the best-scoring row among the first 20 (see
/// [`detect_header_row`]); without a convincing candidate the first row is
/// used.
pub fn read_products_csv<R: Read>(reader: R) -> Result<Vec<Product>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

    let header_idx = detect_header_row(&records).unwrap_or_else(|| {
        debug!("no header row detected, using the first row");
        0
    });
    if header_idx > 0 {
        debug!(skipped = header_idx, "skipping rows above the header");
    }
    let headers = records.get(header_idx).cloned().unwrap_or_default();
    let columns = build_column_map(&headers);
    if !columns.contains_key(&Field::Specification) && !columns.contains_key(&Field::UnitCost) {
        return Err(ImportError::MissingColumns(
            headers.iter().collect::<Vec<_>>().join(", "),
        ));
    }

    let mut products: Vec<Product> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for (row_idx, record) in records.iter().enumerate().skip(header_idx + 1) {
        let line = record.position().map_or(row_idx as u64 + 1, |p| p.line());
        let get = |field: Field| cell(record, &columns, field);

        if record.iter().all(str::is_empty) {
            continue;
        }

        let url = get(Field::Url).to_string();
        let title = get(Field::Title).to_string();
        let key = if !url.is_empty() {
            format!("url:{url}")
        } else if !title.is_empty() {
            format!("title:{title}")
        } else {
            format!("row:{row_idx}")
        };

        let product_idx = match index_by_key.get(&key) {
            Some(&idx) => idx,
            None => {
                let shipping = parse_decimal(get(Field::ShippingFee), "shipping_fee", line)
                    .unwrap_or_default();
                let mut product = Product::new(title, url, shipping);
                let category = get(Field::Category);
                if !category.is_empty() {
                    product = product.with_category(category);
                }
                products.push(product);
                index_by_key.insert(key, products.len() - 1);
                products.len() - 1
            }
        };

        let spec = match get(Field::Specification) {
            "" => DEFAULT_SPECIFICATION,
            s => s,
        };
        let sku = Sku {
            specification: spec.to_string(),
            unit_cost: parse_decimal(get(Field::UnitCost), "unit_cost", line),
            stock: parse_stock(get(Field::Stock), line),
            planned_price: parse_decimal(get(Field::PlannedPrice), "planned_price", line),
        };
        products[product_idx].skus.push(sku);
    }

    Ok(products)
}
