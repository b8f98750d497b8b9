//! Reads the tracked product list.
//!
//! JSON files hold an array of products; TOML files hold a `[[products]]`
//! array. The column names of the spreadsheet export the list usually comes
//! from are accepted as aliases.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::path::Path;
use url::Url;

use crate::models::ProductRecord;
use crate::plugins::trackers::price::clean_price_text;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawPrice {
    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            RawPrice::Integer(value) => Some(Decimal::from(*value)),
            RawPrice::Float(value) => Decimal::from_f64(*value),
            RawPrice::Text(text) => clean_price_text(text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    #[serde(default, alias = "Product Name")]
    name: Option<String>,
    #[serde(default, alias = "Discounted Price")]
    previous_price: Option<RawPrice>,
    #[serde(default, alias = "Product Link")]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlProducts {
    #[serde(default)]
    products: Vec<RawProduct>,
}

/// Load every usable record from `path`.
///
/// Rows without a name or with a missing or relative link are dropped with a
/// warning. An unreadable or malformed file is an error.
pub fn load_products(path: impl AsRef<Path>) -> Result<Vec<ProductRecord>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let raw = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str::<TomlProducts>(&content)?.products,
        Some("json") | None => serde_json::from_str::<Vec<RawProduct>>(&content)?,
        Some(other) => {
            return Err(AppError::Load(format!("unsupported product list format: .{}", other)));
        }
    };

    let total = raw.len();
    let records: Vec<ProductRecord> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, product)| to_record(index, product))
        .collect();

    tracing::info!(
        path = %path.display(),
        loaded = records.len(),
        rejected = total - records.len(),
        "Loaded product list"
    );

    Ok(records)
}

fn to_record(index: usize, raw: RawProduct) -> Option<ProductRecord> {
    let Some(name) = raw.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) else {
        tracing::warn!(row = index, "Rejecting product without a name");
        return None;
    };

    let link = match raw.link.as_deref().map(str::trim).map(Url::parse) {
        Some(Ok(link)) => link,
        Some(Err(e)) => {
            tracing::warn!(row = index, product = %name, "Rejecting product with invalid link: {}", e);
            return None;
        }
        None => {
            tracing::warn!(row = index, product = %name, "Rejecting product without a link");
            return None;
        }
    };

    let previous_price = raw.previous_price.as_ref().and_then(RawPrice::to_decimal);
    Some(ProductRecord::new(name, previous_price, link))
}
