use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::error::CheckError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Reduce arbitrary price text to a decimal.
///
/// Everything but digits and `.` is dropped. When more than one decimal point
/// survives, only the first is kept (`"12.34.56"` becomes `12.3456`).
pub fn clean_price_text(text: &str) -> Option<Decimal> {
    let mut cleaned = String::with_capacity(text.len());
    let mut seen_point = false;

    for c in text.chars() {
        if c.is_ascii_digit() {
            cleaned.push(c);
        } else if c == '.' && !seen_point {
            cleaned.push(c);
            seen_point = true;
        }
    }

    if cleaned.is_empty() || cleaned == "." {
        return None;
    }

    Decimal::from_str(cleaned.trim_end_matches('.')).ok()
}

/// Assemble a price from the separately rendered whole and fraction parts.
///
/// A fraction that is missing, empty or not purely numeric becomes `.00`.
pub fn assemble_price(whole: &str, fraction: Option<&str>) -> Option<Decimal> {
    let mut text = whole.trim().replace(',', "");

    match fraction.map(str::trim) {
        Some(f) if !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()) => {
            text.push('.');
            text.push_str(f);
        }
        _ => text.push_str(".00"),
    }

    clean_price_text(&text)
}

/// Reduction a coupon applies to the live price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CouponEffect {
    /// Fixed amount in currency units.
    Flat { amount: Decimal, symbol: char },
    /// Percentage of the live price.
    Percent(Decimal),
    None,
}

impl CouponEffect {
    /// `None` when the reduction does not fit in a `Decimal`.
    pub fn apply(&self, live_price: Decimal) -> Option<Decimal> {
        match self {
            CouponEffect::Flat { amount, .. } => live_price.checked_sub(*amount),
            CouponEffect::Percent(percent) => percent
                .checked_div(HUNDRED)
                .and_then(|fraction| fraction.checked_mul(live_price))
                .and_then(|reduction| live_price.checked_sub(reduction)),
            CouponEffect::None => Some(live_price),
        }
    }

    pub fn note(&self) -> Option<String> {
        match self {
            CouponEffect::Flat { amount, symbol } => Some(format!("Coupon: {}{} off", symbol, amount)),
            CouponEffect::Percent(percent) => Some(format!("Coupon: {}% off", percent)),
            CouponEffect::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEvaluation {
    pub live_price: Decimal,
    pub effective_price: Decimal,
    pub discount_percent: Decimal,
    pub coupon: CouponEffect,
}

/// Turns a live price plus coupon text into an effective price and the
/// discount relative to a baseline.
pub struct DiscountEngine {
    flat_regex: Regex,
    percent_regex: Regex,
}

impl Default for DiscountEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscountEngine {
    pub fn new() -> Self {
        DiscountEngine {
            flat_regex: Regex::new(r"([₹$£€¥])\s?(\d+)").expect("flat coupon pattern"),
            percent_regex: Regex::new(r"(\d+)\s*%").expect("percent coupon pattern"),
        }
    }

    /// Flat currency amounts take precedence over percentages.
    pub fn parse_coupon(&self, coupon_text: &str) -> CouponEffect {
        let text = coupon_text.replace(',', "");

        if let Some(captures) = self.flat_regex.captures(&text) {
            let symbol = captures[1].chars().next();
            let amount = Decimal::from_str(&captures[2]).ok();
            if let (Some(symbol), Some(amount)) = (symbol, amount) {
                return CouponEffect::Flat { amount, symbol };
            }
        }

        if let Some(captures) = self.percent_regex.captures(&text) {
            if let Ok(percent) = Decimal::from_str(&captures[1]) {
                return CouponEffect::Percent(percent);
            }
        }

        CouponEffect::None
    }

    pub fn evaluate(
        &self,
        previous_price: Decimal,
        live_price: Decimal,
        coupon_text: Option<&str>,
    ) -> Result<PriceEvaluation, CheckError> {
        if previous_price <= Decimal::ZERO {
            return Err(CheckError::MissingBaseline);
        }

        let coupon = coupon_text
            .map(|text| self.parse_coupon(text))
            .unwrap_or(CouponEffect::None);
        let effective_price = coupon.apply(live_price).ok_or(CheckError::PriceOutOfRange)?;
        let discount_percent = previous_price
            .checked_sub(effective_price)
            .and_then(|drop| drop.checked_div(previous_price))
            .and_then(|ratio| ratio.checked_mul(HUNDRED))
            .ok_or(CheckError::PriceOutOfRange)?
            .round_dp(2);

        Ok(PriceEvaluation {
            live_price,
            effective_price,
            discount_percent,
            coupon,
        })
    }
}
