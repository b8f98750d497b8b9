// Shared fixtures for the dropwatch integration tests.
// Product pages and the Telegram Bot API are both served by wiremock.

pub mod pipeline_tests;

use std::sync::Arc;

use dropwatch::config::{
    ChannelConfig, NotificationsConfig, ScraperConfig, TelegramConfig, DEFAULT_USER_AGENT,
};
use dropwatch::models::ProductRecord;
use dropwatch::plugins::notifiers::TelegramNotifier;
use dropwatch::plugins::trackers::TierThresholds;
use dropwatch::product_manager::ProductManager;
use dropwatch::scheduler::BatchScheduler;
use dropwatch::scraper::PageFetcher;
use rust_decimal::Decimal;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LOW_TOKEN: &str = "low-token";
pub const MEDIUM_TOKEN: &str = "medium-token";
pub const HIGH_TOKEN: &str = "high-token";
pub const CHAT_ID: &str = "-100200300";

pub fn get_scraper_config() -> ScraperConfig {
    ScraperConfig {
        max_concurrent_checks: 2,
        request_timeout: 2,
        user_agent: DEFAULT_USER_AGENT.to_string(),
    }
}

pub fn get_notifications_config(api_base: &str) -> NotificationsConfig {
    let channel = |token: &str| ChannelConfig {
        token: Some(token.to_string()),
        chat_id: Some(CHAT_ID.to_string()),
    };

    NotificationsConfig {
        request_timeout: 2,
        currency_symbol: "₹".to_string(),
        telegram: TelegramConfig {
            api_base: api_base.to_string(),
            parse_mode: "Markdown".to_string(),
            low: channel(LOW_TOKEN),
            medium: channel(MEDIUM_TOKEN),
            high: channel(HIGH_TOKEN),
        },
    }
}

pub fn create_product_manager(server: &MockServer) -> Arc<ProductManager> {
    let fetcher = PageFetcher::new(&get_scraper_config()).expect("fetcher");
    let notifier = TelegramNotifier::new(&get_notifications_config(&server.uri())).expect("notifier");
    Arc::new(ProductManager::new(fetcher, TierThresholds::default(), Arc::new(notifier)))
}

pub fn create_batch_scheduler(server: &MockServer, concurrency_limit: usize) -> BatchScheduler {
    BatchScheduler::new(create_product_manager(server), concurrency_limit)
}

pub fn product(server: &MockServer, name: &str, previous: Option<i64>, page_path: &str) -> ProductRecord {
    ProductRecord::new(
        name,
        previous.map(Decimal::from),
        Url::parse(&format!("{}{}", server.uri(), page_path)).expect("product url"),
    )
}

/// A listing page in the layout the extractor reads.
pub fn product_page(whole: &str, fraction: &str, extra: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>Listing</title></head>
  <body>
    <div id="availability"><span>In stock</span></div>
    <div id="corePriceDisplay_desktop_feature_div">
      <span class="a-price"><span class="a-price-symbol">₹</span><span class="a-price-whole">{}<span class="a-price-decimal">.</span></span><span class="a-price-fraction">{}</span></span>
    </div>
    {}
  </body>
</html>"#,
        whole, fraction, extra
    )
}

pub fn unavailable_page() -> String {
    r#"<html><body>
        <div id="availability"><span class="a-size-medium">Currently unavailable.</span></div>
        <div id="corePriceDisplay_desktop_feature_div"><span class="a-price-whole">100</span></div>
        <span class="couponLabelText">Save ₹50</span>
    </body></html>"#
        .to_string()
}

pub async fn mount_page(server: &MockServer, page_path: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

/// Accepts `sendMessage` for `token` and expects exactly `times` calls.
pub async fn mount_telegram(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", token)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": { "message_id": 42 }
        })))
        .expect(times)
        .mount(server)
        .await;
}

/// Bodies of every `sendMessage` call received for `token`.
pub async fn sent_messages(server: &MockServer, token: &str) -> Vec<serde_json::Value> {
    let expected_path = format!("/bot{}/sendMessage", token);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == expected_path)
        .map(|request| request.body_json::<serde_json::Value>().expect("json body"))
        .collect()
}
