use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::config::TierConfig;
use crate::models::AlertTier;
use crate::utils::error::AppError;

/// Cut points for the alert tiers.
///
/// | discount           | tier   |
/// |--------------------|--------|
/// | `[low, medium)`    | Low    |
/// | `[medium, high]`   | Medium |
/// | `(high, ∞)`        | High   |
/// | below `low`        | None   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub low: Decimal,
    pub medium: Decimal,
    pub high: Decimal,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            low: Decimal::from(45),
            medium: Decimal::from(80),
            high: Decimal::from(90),
        }
    }
}

impl TierThresholds {
    pub fn new(low: Decimal, medium: Decimal, high: Decimal) -> Result<Self, AppError> {
        if low < Decimal::ZERO || low >= medium || medium > high {
            return Err(AppError::Validation(format!(
                "tier thresholds must satisfy 0 <= low < medium <= high (got {}, {}, {})",
                low, medium, high
            )));
        }
        Ok(Self { low, medium, high })
    }

    pub fn from_config(config: &TierConfig) -> Result<Self, AppError> {
        let convert = |name: &str, value: f64| {
            Decimal::from_f64(value)
                .ok_or_else(|| AppError::Validation(format!("tier threshold {} is not a finite number", name)))
        };
        Self::new(
            convert("low", config.low)?,
            convert("medium", config.medium)?,
            convert("high", config.high)?,
        )
    }

    pub fn classify(&self, discount_percent: Decimal) -> AlertTier {
        if discount_percent >= self.low && discount_percent < self.medium {
            AlertTier::Low
        } else if discount_percent >= self.medium && discount_percent <= self.high {
            AlertTier::Medium
        } else if discount_percent > self.high {
            AlertTier::High
        } else {
            AlertTier::None
        }
    }
}
