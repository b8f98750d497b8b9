use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub tiers: TierConfig,
    pub notifications: NotificationsConfig,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub max_concurrent_checks: usize,
    /// Seconds before a page fetch is abandoned.
    pub request_timeout: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierConfig {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub request_timeout: u64,
    pub currency_symbol: String,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub api_base: String,
    pub parse_mode: String,
    #[serde(default)]
    pub low: ChannelConfig,
    #[serde(default)]
    pub medium: ChannelConfig,
    #[serde(default)]
    pub high: ChannelConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Six-field cron expression (with seconds) used by watch mode.
    pub cron: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl AppConfig {
    /// Built-in defaults, then `config/default` and `config/local`, then an
    /// optional explicit file, then `DROPWATCH__*` environment variables.
    pub fn load(explicit_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("scraper.max_concurrent_checks", 10)?
            .set_default("scraper.request_timeout", 5)?
            .set_default("scraper.user_agent", DEFAULT_USER_AGENT)?
            .set_default("tiers.low", 45.0)?
            .set_default("tiers.medium", 80.0)?
            .set_default("tiers.high", 90.0)?
            .set_default("notifications.request_timeout", 10)?
            .set_default("notifications.currency_symbol", "₹")?
            .set_default("notifications.telegram.api_base", "https://api.telegram.org")?
            .set_default("notifications.telegram.parse_mode", "Markdown")?
            .set_default("scheduler.cron", "0 0/30 * * * *")?
            .set_default("logging.level", "info")?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.port", 9001)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = explicit_file {
            builder = builder.add_source(File::with_name(path));
        }

        let s = builder
            .add_source(Environment::with_prefix("DROPWATCH").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;
        config.apply_legacy_telegram_env();
        config.validate()?;
        Ok(config)
    }

    /// Fill unset channels from `TELEGRAM_{LOW,MEDIUM,HIGH}_TOKEN` and the
    /// shared `TELEGRAM_CHAT_ID`.
    fn apply_legacy_telegram_env(&mut self) {
        let chat_id = env::var("TELEGRAM_CHAT_ID").ok();
        let telegram = &mut self.notifications.telegram;

        for (channel, token_var) in [
            (&mut telegram.low, "TELEGRAM_LOW_TOKEN"),
            (&mut telegram.medium, "TELEGRAM_MEDIUM_TOKEN"),
            (&mut telegram.high, "TELEGRAM_HIGH_TOKEN"),
        ] {
            if channel.token.is_none() {
                channel.token = env::var(token_var).ok();
            }
            if channel.chat_id.is_none() {
                channel.chat_id = chat_id.clone();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate scraper configuration
        if self.scraper.max_concurrent_checks == 0 {
            return Err(ConfigError::Message("Scraper max_concurrent_checks must be greater than 0".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        // Validate tier thresholds
        let tiers = &self.tiers;
        if !(tiers.low >= 0.0 && tiers.low < tiers.medium && tiers.medium <= tiers.high) {
            return Err(ConfigError::Message("Tier thresholds must satisfy 0 <= low < medium <= high".into()));
        }

        // Validate notification configuration
        if self.notifications.request_timeout == 0 {
            return Err(ConfigError::Message("Notification request_timeout must be greater than 0".into()));
        }

        if Url::parse(&self.notifications.telegram.api_base).is_err() {
            return Err(ConfigError::Message("Invalid Telegram api_base URL".into()));
        }

        // Validate scheduler configuration
        if !Self::is_valid_cron(&self.scheduler.cron) {
            return Err(ConfigError::Message("Invalid cron expression in scheduler.cron".into()));
        }

        // Validate metrics configuration
        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::Message("Metrics port must be greater than 0".into()));
        }

        Ok(())
    }

    pub fn is_valid_cron(cron_expr: &str) -> bool {
        // sec min hour day month weekday [year]
        let parts: Vec<&str> = cron_expr.split_whitespace().collect();
        if parts.len() != 6 && parts.len() != 7 {
            return false;
        }

        parts.iter().all(|part| {
            part.chars().all(|c| {
                c.is_ascii_alphanumeric() || matches!(c, '*' | '-' | ',' | '/' | '?')
            })
        })
    }
}
