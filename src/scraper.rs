use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use url::Url;

use crate::config::ScraperConfig;
use crate::models::PageSnapshot;
use crate::utils::error::{AppError, CheckError};

/// Plain HTTP fetcher for product pages.
///
/// Every request carries the configured browser-like user agent and is
/// bounded by the request timeout, so a hung connection cannot hold a worker
/// slot indefinitely.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self { client })
    }

    /// Only a `200 OK` counts as a usable page.
    pub async fn fetch(&self, url: &Url) -> Result<PageSnapshot, CheckError> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CheckError::FetchFailure {
                url: url.to_string(),
                reason: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.without_url().to_string()
                },
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CheckError::FetchFailure {
                url: url.to_string(),
                reason: format!("unexpected status {}", status),
            });
        }

        let body = response.text().await.map_err(|e| CheckError::FetchFailure {
            url: url.to_string(),
            reason: format!("failed to read body: {}", e.without_url()),
        })?;

        tracing::debug!(
            url = %url,
            bytes = body.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Fetched product page"
        );

        Ok(PageSnapshot::new(body))
    }
}
