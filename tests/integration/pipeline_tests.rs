// End-to-end checks of a single product: page fetch, extraction, discount,
// tier routing and delivery to the Telegram endpoint for that tier.

use super::*;
use dropwatch::models::AlertTier;
use dropwatch::product_manager::CheckOutcome;
use dropwatch::CheckError;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[tokio::test]
async fn test_plain_drop_alerts_low_tier() {
    let server = MockServer::start().await;
    mount_page(&server, "/dp/plain", product_page("400", "00", "")).await;
    mount_telegram(&server, LOW_TOKEN, 1).await;
    mount_telegram(&server, MEDIUM_TOKEN, 0).await;
    mount_telegram(&server, HIGH_TOKEN, 0).await;

    let manager = create_product_manager(&server);
    let result = manager
        .check_product(&product(&server, "Plain Kettle", Some(1000), "/dp/plain"))
        .await;

    assert_eq!(
        result.outcome,
        CheckOutcome::Alerted {
            tier: AlertTier::Low,
            message_id: Some("42".to_string())
        }
    );
    let evaluation = result.evaluation.unwrap();
    assert_eq!(evaluation.effective_price, d("400.00"));
    assert_eq!(evaluation.discount_percent, d("60.00"));

    let messages = sent_messages(&server, LOW_TOKEN).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["chat_id"], CHAT_ID);
    assert_eq!(messages[0]["parse_mode"], "Markdown");
    let text = messages[0]["text"].as_str().unwrap();
    assert!(text.contains("*Plain Kettle*"));
    assert!(text.contains("New Price: ₹400.00"));
    assert!(text.contains("Discount: 60.00%"));
    assert!(!text.contains("Coupon"));
    assert!(text.contains(&format!("[Buy Now]({}/dp/plain)", server.uri())));
}

#[tokio::test]
async fn test_flat_coupon_included_in_alert() {
    let server = MockServer::start().await;
    let coupon = r#"<span class="couponLabelText">Save ₹100</span>"#;
    mount_page(&server, "/dp/flat", product_page("500", "00", coupon)).await;
    mount_telegram(&server, LOW_TOKEN, 1).await;

    let manager = create_product_manager(&server);
    let result = manager
        .check_product(&product(&server, "Coupon Toaster", Some(1000), "/dp/flat"))
        .await;

    assert!(matches!(result.outcome, CheckOutcome::Alerted { tier: AlertTier::Low, .. }));
    assert_eq!(result.evaluation.unwrap().effective_price, d("400.00"));

    let messages = sent_messages(&server, LOW_TOKEN).await;
    assert!(messages[0]["text"].as_str().unwrap().contains("Coupon: ₹100 off"));
}

#[tokio::test]
async fn test_percent_coupon_routes_to_high_tier() {
    let server = MockServer::start().await;
    mount_page(&server, "/dp/percent", product_page("50", "00", "<span>Save 10%</span>")).await;
    mount_telegram(&server, LOW_TOKEN, 0).await;
    mount_telegram(&server, HIGH_TOKEN, 1).await;

    let manager = create_product_manager(&server);
    let result = manager
        .check_product(&product(&server, "Percent Lamp", Some(1000), "/dp/percent"))
        .await;

    assert!(matches!(result.outcome, CheckOutcome::Alerted { tier: AlertTier::High, .. }));
    let evaluation = result.evaluation.unwrap();
    assert_eq!(evaluation.effective_price, d("45.00"));
    assert_eq!(evaluation.discount_percent, d("95.50"));
}

#[tokio::test]
async fn test_medium_tier_boundary() {
    let server = MockServer::start().await;
    mount_page(&server, "/dp/medium", product_page("100", "00", "")).await;
    mount_telegram(&server, MEDIUM_TOKEN, 1).await;

    let manager = create_product_manager(&server);
    let result = manager
        .check_product(&product(&server, "Boundary Fan", Some(1000), "/dp/medium"))
        .await;

    // 90.00% sits inside the closed Medium interval.
    assert!(matches!(result.outcome, CheckOutcome::Alerted { tier: AlertTier::Medium, .. }));
}

#[tokio::test]
async fn test_small_drop_sends_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/dp/small", product_page("600", "00", "")).await;
    mount_telegram(&server, LOW_TOKEN, 0).await;
    mount_telegram(&server, MEDIUM_TOKEN, 0).await;
    mount_telegram(&server, HIGH_TOKEN, 0).await;

    let manager = create_product_manager(&server);
    let result = manager
        .check_product(&product(&server, "Small Drop Iron", Some(1000), "/dp/small"))
        .await;

    assert_eq!(
        result.outcome,
        CheckOutcome::BelowThreshold {
            discount_percent: d("40.00")
        }
    );
}

#[tokio::test]
async fn test_unavailable_product_aborts() {
    let server = MockServer::start().await;
    mount_page(&server, "/dp/gone", unavailable_page()).await;
    mount_telegram(&server, LOW_TOKEN, 0).await;
    mount_telegram(&server, HIGH_TOKEN, 0).await;

    let manager = create_product_manager(&server);
    let result = manager
        .check_product(&product(&server, "Gone Mixer", Some(1000), "/dp/gone"))
        .await;

    assert_eq!(result.outcome, CheckOutcome::Skipped(CheckError::UnavailableProduct));
    assert!(result.evaluation.is_none());
}

#[tokio::test]
async fn test_http_error_page_aborts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dp/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let manager = create_product_manager(&server);
    let result = manager
        .check_product(&product(&server, "Missing Page", Some(1000), "/dp/missing"))
        .await;

    assert!(matches!(result.outcome, CheckOutcome::Skipped(CheckError::FetchFailure { .. })));
}

#[tokio::test]
async fn test_missing_baseline_aborts() {
    let server = MockServer::start().await;
    mount_page(&server, "/dp/new", product_page("10", "00", "")).await;
    mount_telegram(&server, HIGH_TOKEN, 0).await;

    let manager = create_product_manager(&server);
    let result = manager
        .check_product(&product(&server, "No Baseline", None, "/dp/new"))
        .await;

    assert_eq!(result.outcome, CheckOutcome::Skipped(CheckError::MissingBaseline));
}

#[tokio::test]
async fn test_telegram_rejection_is_reported() {
    let server = MockServer::start().await;
    mount_page(&server, "/dp/reject", product_page("400", "00", "")).await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", LOW_TOKEN)))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let manager = create_product_manager(&server);
    let result = manager
        .check_product(&product(&server, "Rejected", Some(1000), "/dp/reject"))
        .await;

    match result.outcome {
        CheckOutcome::Skipped(CheckError::NotificationFailure(message)) => {
            assert!(message.contains("401"));
            assert!(!message.contains(LOW_TOKEN));
        }
        other => panic!("expected notification failure, got {:?}", other),
    }
}
