use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::models::ProductRecord;
use crate::plugins::trackers::price::PriceEvaluation;

/// Severity bucket for a price drop. `None` means no alert is sent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertTier {
    Low,
    Medium,
    High,
    None,
}

impl AlertTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertTier::Low => "low",
            AlertTier::Medium => "medium",
            AlertTier::High => "high",
            AlertTier::None => "none",
        }
    }

    pub fn is_alert(&self) -> bool {
        !matches!(self, AlertTier::None)
    }
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub tier: AlertTier,
    pub product_name: String,
    pub link: Url,
    pub effective_price: Decimal,
    pub previous_price: Decimal,
    pub discount_percent: Decimal,
    pub coupon_note: Option<String>,
}

impl Alert {
    /// Builds an alert for a tier that warrants one; `AlertTier::None` yields nothing.
    pub fn new(
        tier: AlertTier,
        record: &ProductRecord,
        previous_price: Decimal,
        evaluation: &PriceEvaluation,
    ) -> Option<Self> {
        if !tier.is_alert() {
            return None;
        }

        Some(Self {
            tier,
            product_name: record.name.clone(),
            link: record.link.clone(),
            effective_price: evaluation.effective_price,
            previous_price,
            discount_percent: evaluation.discount_percent,
            coupon_note: evaluation.coupon.note(),
        })
    }

    /// Message body in Telegram's legacy Markdown dialect.
    pub fn render_markdown(&self, currency_symbol: &str) -> String {
        let mut message = format!(
            "🔔 *Price Drop Alert!* 🔔\n\n\
             🛒 *{}*\n\
             💰 New Price: {}{:.2}\n\
             💲 Previous Price: {}{:.2}\n\
             📉 Discount: {:.2}%\n",
            escape_markdown(&self.product_name),
            currency_symbol,
            self.effective_price,
            currency_symbol,
            self.previous_price,
            self.discount_percent,
        );

        if let Some(note) = &self.coupon_note {
            message.push_str(&format!("🏷️ {}\n", note));
        }

        message.push_str(&format!("🔗 [Buy Now]({})", self.link));
        message
    }
}

/// Backslash-escape the characters legacy Markdown treats as entity markers.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '[' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
