pub mod cli;
pub mod config;
pub mod loader;
pub mod models;
pub mod plugins;
pub mod product_manager;
pub mod scheduler;
pub mod scraper;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::{AppError, CheckError};

pub type Result<T> = std::result::Result<T, AppError>;
