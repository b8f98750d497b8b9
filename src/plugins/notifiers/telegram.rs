use crate::config::{ChannelConfig, NotificationsConfig};
use crate::models::{Alert, AlertTier};
use crate::plugins::traits::{Notifier, NotificationResult};
use crate::utils::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

/// Bot credentials and destination chat for one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramChannel {
    pub token: String,
    pub chat_id: String,
}

impl TelegramChannel {
    pub fn from_config(config: &ChannelConfig) -> Result<Self, String> {
        let token = config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or("Missing bot token")?;
        let chat_id = config
            .chat_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or("Missing chat_id")?;

        Ok(TelegramChannel {
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }
}

/// Sends alerts through the Telegram Bot API, one bot per tier.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    parse_mode: String,
    currency_symbol: String,
    channels: HashMap<AlertTier, TelegramChannel>,
}

impl TelegramNotifier {
    pub fn new(config: &NotificationsConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        let telegram = &config.telegram;
        let mut channels = HashMap::new();
        for (tier, channel) in [
            (AlertTier::Low, &telegram.low),
            (AlertTier::Medium, &telegram.medium),
            (AlertTier::High, &telegram.high),
        ] {
            match TelegramChannel::from_config(channel) {
                Ok(channel) => {
                    channels.insert(tier, channel);
                }
                Err(reason) => {
                    tracing::warn!(tier = %tier, "Telegram channel not configured: {}", reason);
                }
            }
        }

        Ok(Self {
            client,
            api_base: telegram.api_base.trim_end_matches('/').to_string(),
            parse_mode: telegram.parse_mode.clone(),
            currency_symbol: config.currency_symbol.clone(),
            channels,
        })
    }

    pub fn has_channel(&self, tier: AlertTier) -> bool {
        self.channels.contains_key(&tier)
    }

    fn endpoint(&self, channel: &TelegramChannel) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, channel.token)
    }

    fn create_payload(&self, alert: &Alert, channel: &TelegramChannel) -> serde_json::Value {
        json!({
            "chat_id": channel.chat_id,
            "text": alert.render_markdown(&self.currency_symbol),
            "parse_mode": self.parse_mode,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn notify(&self, alert: &Alert) -> Result<NotificationResult, AppError> {
        let tier = alert.tier.to_string();
        let channel = self.channels.get(&alert.tier).ok_or_else(|| AppError::Notification {
            channel: tier.clone(),
            message: "no Telegram channel configured for tier".to_string(),
        })?;

        // The endpoint embeds the bot token, so it is stripped from transport errors.
        let response = self
            .client
            .post(self.endpoint(channel))
            .json(&self.create_payload(alert, channel))
            .send()
            .await
            .map_err(|e| AppError::Notification {
                channel: tier.clone(),
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Notification {
                channel: tier,
                message: format!("Telegram responded with status {}", status),
            });
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message_id = body
            .get("result")
            .and_then(|result| result.get("message_id"))
            .map(|id| id.to_string());

        Ok(NotificationResult {
            success: true,
            channel: tier,
            message_id,
        })
    }
}
