use async_trait::async_trait;

use crate::models::Alert;
use crate::plugins::traits::{Notifier, NotificationResult};
use crate::utils::error::AppError;

/// Writes alerts to the log instead of sending them. Used for dry runs.
pub struct LogNotifier {
    currency_symbol: String,
}

impl LogNotifier {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, alert: &Alert) -> Result<NotificationResult, AppError> {
        tracing::info!(
            tier = %alert.tier,
            product = %alert.product_name,
            "[dry run] alert:\n{}",
            alert.render_markdown(&self.currency_symbol)
        );

        Ok(NotificationResult {
            success: true,
            channel: alert.tier.to_string(),
            message_id: None,
        })
    }
}
