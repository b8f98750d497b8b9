use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Product list error: {0}")]
    Load(String),

    #[error("Notification error: {channel}: {message}")]
    Notification { channel: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Reasons a single product leaves the pipeline without an alert being
/// delivered. None of these are fatal to the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("fetch failed for {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    #[error("product is currently unavailable")]
    UnavailableProduct,

    #[error("no price found on page")]
    PriceUnavailable,

    #[error("no usable baseline price")]
    MissingBaseline,

    #[error("price or coupon out of range")]
    PriceOutOfRange,

    #[error("notification failed: {0}")]
    NotificationFailure(String),
}

impl CheckError {
    /// Short label used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::FetchFailure { .. } => "fetch_failure",
            CheckError::UnavailableProduct => "unavailable",
            CheckError::PriceUnavailable => "price_unavailable",
            CheckError::MissingBaseline => "missing_baseline",
            CheckError::PriceOutOfRange => "price_out_of_range",
            CheckError::NotificationFailure(_) => "notification_failure",
        }
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
