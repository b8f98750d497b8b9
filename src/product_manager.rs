use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::time::Instant;

use crate::models::{Alert, AlertTier, ProductRecord};
use crate::plugins::traits::Notifier;
use crate::plugins::trackers::{DiscountEngine, PageExtractor, PriceEvaluation, TierThresholds};
use crate::scraper::PageFetcher;
use crate::utils::error::CheckError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Alerted {
        tier: AlertTier,
        message_id: Option<String>,
    },
    BelowThreshold {
        discount_percent: Decimal,
    },
    Skipped(CheckError),
}

#[derive(Debug, Clone)]
pub struct ProductCheckResult {
    pub product_name: String,
    pub outcome: CheckOutcome,
    pub evaluation: Option<PriceEvaluation>,
    pub total_time_ms: u64,
}

/// Runs one product through fetch, extraction, discount evaluation,
/// classification and notification.
pub struct ProductManager {
    fetcher: PageFetcher,
    extractor: PageExtractor,
    engine: DiscountEngine,
    thresholds: TierThresholds,
    notifier: Arc<dyn Notifier>,
}

impl ProductManager {
    pub fn new(fetcher: PageFetcher, thresholds: TierThresholds, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            fetcher,
            extractor: PageExtractor::new(),
            engine: DiscountEngine::new(),
            thresholds,
            notifier,
        }
    }

    /// Never fails: every abort reason ends up in the returned outcome.
    pub async fn check_product(&self, record: &ProductRecord) -> ProductCheckResult {
        let start_time = Instant::now();
        metrics::counter!("dropwatch_products_checked_total").increment(1);

        let (outcome, evaluation) = match self.fetcher.fetch(&record.link).await {
            Ok(snapshot) => self.process_page(record, &snapshot.raw_content).await,
            Err(e) => (CheckOutcome::Skipped(e), None),
        };

        if let CheckOutcome::Skipped(reason) = &outcome {
            metrics::counter!("dropwatch_products_skipped_total", "reason" => reason.kind()).increment(1);
            if reports_skip(reason) {
                tracing::warn!(product = %record.name, url = %record.link, "Skipping product: {}", reason);
            }
        }

        ProductCheckResult {
            product_name: record.name.clone(),
            outcome,
            evaluation,
            total_time_ms: start_time.elapsed().as_millis() as u64,
        }
    }

    /// Everything after the fetch, given the page body.
    pub async fn process_page(
        &self,
        record: &ProductRecord,
        raw_content: &str,
    ) -> (CheckOutcome, Option<PriceEvaluation>) {
        let (evaluation, previous_price) = match self.evaluate_page(record, raw_content) {
            Ok(evaluated) => evaluated,
            Err(e) => return (CheckOutcome::Skipped(e), None),
        };

        tracing::info!(
            product = %record.name,
            previous = %previous_price,
            effective = %format!("{:.2}", evaluation.effective_price),
            discount = %evaluation.discount_percent,
            "Evaluated price"
        );

        let tier = self.thresholds.classify(evaluation.discount_percent);
        let Some(alert) = Alert::new(tier, record, previous_price, &evaluation) else {
            tracing::debug!(product = %record.name, "Discount below alert threshold");
            return (
                CheckOutcome::BelowThreshold {
                    discount_percent: evaluation.discount_percent,
                },
                Some(evaluation),
            );
        };

        let outcome = match self.notifier.notify(&alert).await {
            Ok(result) if result.success => {
                metrics::counter!("dropwatch_alerts_sent_total", "tier" => tier.as_str()).increment(1);
                tracing::info!(product = %record.name, tier = %tier, "Alert sent");
                CheckOutcome::Alerted {
                    tier,
                    message_id: result.message_id,
                }
            }
            Ok(_) => self.notification_failed(record, tier, "notifier reported failure".to_string()),
            Err(e) => self.notification_failed(record, tier, e.to_string()),
        };

        (outcome, Some(evaluation))
    }

    /// Steps that need no I/O: extraction, baseline check and discount maths.
    fn evaluate_page(
        &self,
        record: &ProductRecord,
        raw_content: &str,
    ) -> Result<(PriceEvaluation, Decimal), CheckError> {
        let extraction = self.extractor.extract(raw_content);
        if !extraction.available {
            return Err(CheckError::UnavailableProduct);
        }
        let live_price = extraction.price.ok_or(CheckError::PriceUnavailable)?;
        let previous_price = record.baseline().ok_or(CheckError::MissingBaseline)?;

        let evaluation = self
            .engine
            .evaluate(previous_price, live_price, extraction.coupon_text.as_deref())?;
        Ok((evaluation, previous_price))
    }

    fn notification_failed(&self, record: &ProductRecord, tier: AlertTier, message: String) -> CheckOutcome {
        metrics::counter!("dropwatch_alerts_failed_total", "tier" => tier.as_str()).increment(1);
        tracing::warn!(product = %record.name, tier = %tier, "Alert delivery failed: {}", message);
        CheckOutcome::Skipped(CheckError::NotificationFailure(message))
    }
}

/// Delivery failures are already logged where they happen.
fn reports_skip(reason: &CheckError) -> bool {
    !matches!(reason, CheckError::NotificationFailure(_))
}
