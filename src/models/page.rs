use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw page body as returned by a single fetch.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub raw_content: String,
    pub fetched_at: DateTime<Utc>,
}

impl PageSnapshot {
    pub fn new(raw_content: impl Into<String>) -> Self {
        Self {
            raw_content: raw_content.into(),
            fetched_at: Utc::now(),
        }
    }
}

/// What the page extractor could read off a listing.
///
/// An unavailable listing never carries a price or coupon; use
/// [`ExtractionResult::unavailable`] to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub available: bool,
    pub price: Option<Decimal>,
    pub coupon_text: Option<String>,
}

impl ExtractionResult {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            price: None,
            coupon_text: None,
        }
    }

    pub fn available(price: Option<Decimal>, coupon_text: Option<String>) -> Self {
        Self {
            available: true,
            price,
            coupon_text,
        }
    }
}
