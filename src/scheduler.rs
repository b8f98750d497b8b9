use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::models::ProductRecord;
use crate::product_manager::{CheckOutcome, ProductCheckResult, ProductManager};
use crate::utils::error::{AppError, CheckError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub alerted: usize,
    pub below_threshold: usize,
    pub skipped: usize,
    pub failed_notifications: usize,
}

impl BatchSummary {
    fn record(&mut self, result: &ProductCheckResult) {
        match &result.outcome {
            CheckOutcome::Alerted { .. } => self.alerted += 1,
            CheckOutcome::BelowThreshold { .. } => self.below_threshold += 1,
            CheckOutcome::Skipped(CheckError::NotificationFailure(_)) => self.failed_notifications += 1,
            CheckOutcome::Skipped(_) => self.skipped += 1,
        }
    }
}

/// Runs product checks over a batch with a fixed number of workers.
///
/// The worker slots belong to the scheduler, not to a single run, so batches
/// that overlap (a slow watch tick running into the next one) share the same
/// limit.
pub struct BatchScheduler {
    product_manager: Arc<ProductManager>,
    slots: Arc<Semaphore>,
    concurrency_limit: usize,
}

impl BatchScheduler {
    /// A limit of 0 is treated as 1.
    pub fn new(product_manager: Arc<ProductManager>, concurrency_limit: usize) -> Self {
        let concurrency_limit = concurrency_limit.max(1);
        Self {
            product_manager,
            slots: Arc::new(Semaphore::new(concurrency_limit)),
            concurrency_limit,
        }
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Check every record, with at most `concurrency_limit` checks in flight.
    ///
    /// Dispatch waits for a free slot before spawning the next check, so the
    /// number of live tasks never exceeds the limit. Returns once every
    /// record has been attempted.
    pub async fn run(&self, records: Vec<ProductRecord>) -> BatchSummary {
        let product_manager = Arc::clone(&self.product_manager);
        run_bounded(records, &self.slots, move |record| {
            let product_manager = Arc::clone(&product_manager);
            async move { product_manager.check_product(&record).await }
        })
        .await
    }
}

async fn run_bounded<F, Fut>(records: Vec<ProductRecord>, slots: &Arc<Semaphore>, check: F) -> BatchSummary
where
    F: Fn(ProductRecord) -> Fut,
    Fut: Future<Output = ProductCheckResult> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    let mut summary = BatchSummary {
        total: records.len(),
        ..Default::default()
    };

    tracing::info!(products = records.len(), free_slots = slots.available_permits(), "Starting batch");

    for record in records {
        // The semaphore is never closed, so acquisition only waits.
        let Ok(permit) = Arc::clone(slots).acquire_owned().await else {
            break;
        };
        let check = check(record);
        tasks.spawn(async move {
            let result = check.await;
            drop(permit);
            result
        });

        // Reap whatever already finished so the set stays small.
        while let Some(joined) = tasks.try_join_next() {
            collect(&mut summary, joined);
        }
    }

    while let Some(joined) = tasks.join_next().await {
        collect(&mut summary, joined);
    }

    tracing::info!(
        total = summary.total,
        alerted = summary.alerted,
        below_threshold = summary.below_threshold,
        skipped = summary.skipped,
        failed_notifications = summary.failed_notifications,
        "Batch finished"
    );

    summary
}

fn collect(
    summary: &mut BatchSummary,
    joined: std::result::Result<ProductCheckResult, tokio::task::JoinError>,
) {
    match joined {
        Ok(result) => summary.record(&result),
        Err(e) => {
            tracing::error!("Product check task ended abnormally: {}", e);
            summary.skipped += 1;
        }
    }
}

/// Re-runs the batch on a cron schedule until shut down.
pub struct WatchScheduler {
    scheduler: JobScheduler,
}

impl WatchScheduler {
    pub async fn new() -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::Scheduler(format!("{:?}", e)))?;
        Ok(Self { scheduler })
    }

    /// Registers a job that loads a fresh product list and runs it through
    /// the batch scheduler on every tick.
    pub async fn schedule<L>(
        &self,
        cron_expression: &str,
        batch: Arc<BatchScheduler>,
        load_records: L,
    ) -> Result<()>
    where
        L: Fn() -> Result<Vec<ProductRecord>> + Send + Sync + 'static,
    {
        let load_records = Arc::new(load_records);

        let job = Job::new_async(cron_expression, move |_uuid, _l| {
            let batch = Arc::clone(&batch);
            let load_records = Arc::clone(&load_records);

            Box::pin(async move {
                match load_records() {
                    Ok(records) => {
                        batch.run(records).await;
                    }
                    Err(e) => tracing::error!("Skipping scheduled batch, product list unavailable: {}", e),
                }
            })
        })
        .map_err(|e| AppError::Scheduler(format!("{:?}", e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::Scheduler(format!("{:?}", e)))?;

        tracing::info!(cron = cron_expression, "Scheduled batch");
        Ok(())
    }

    pub async fn start(&self) -> Result<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::Scheduler(format!("{:?}", e)))?;
        tracing::info!("Watch scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::Scheduler(format!("{:?}", e)))?;
        tracing::info!("Watch scheduler shutdown");
        Ok(())
    }
}
