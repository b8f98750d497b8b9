use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::Alert;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationResult {
    pub success: bool,
    pub channel: String,
    pub message_id: Option<String>,
}

/// Delivers an alert to the channel configured for its tier.
///
/// One call is one delivery attempt. Implementations do not retry; a failed
/// delivery is reported back to the caller, which logs it and moves on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, alert: &Alert) -> Result<NotificationResult, AppError>;
}
