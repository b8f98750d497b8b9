use anyhow::{bail, Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use dropwatch::cli::{BatchArgs, Cli, Command};
use dropwatch::config::{AppConfig, LoggingConfig};
use dropwatch::loader::load_products;
use dropwatch::plugins::notifiers::{LogNotifier, TelegramNotifier};
use dropwatch::plugins::trackers::{PageExtractor, TierThresholds};
use dropwatch::plugins::Notifier;
use dropwatch::product_manager::ProductManager;
use dropwatch::scheduler::{BatchScheduler, WatchScheduler};
use dropwatch::scraper::PageFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Initialize tracing
    let _guard = init_tracing(&config.logging)?;

    if config.metrics.enabled {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], config.metrics.port))
            .install()
            .context("failed to start metrics exporter")?;
        info!(port = config.metrics.port, "Metrics exporter listening");
    }

    match cli.command {
        Command::Run(args) => {
            let scheduler = build_scheduler(&config, &args)?;
            let records = load_products(&args.products)?;
            scheduler.run(records).await;
        }
        Command::Watch { batch: args, cron } => {
            let cron = cron.unwrap_or_else(|| config.scheduler.cron.clone());
            if !AppConfig::is_valid_cron(&cron) {
                bail!("invalid cron expression: {}", cron);
            }

            let scheduler = Arc::new(build_scheduler(&config, &args)?);

            // First pass right away, then on every tick.
            scheduler.run(load_products(&args.products)?).await;

            let mut watch = WatchScheduler::new().await?;
            let products = args.products.clone();
            watch
                .schedule(&cron, Arc::clone(&scheduler), move || load_products(&products))
                .await?;
            watch.start().await?;

            tokio::signal::ctrl_c().await?;
            info!("Shutting down...");
            watch.shutdown().await?;
        }
        Command::Extract { page } => {
            let content = std::fs::read_to_string(&page)
                .with_context(|| format!("failed to read {}", page.display()))?;
            let result = PageExtractor::new().extract(&content);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("dropwatch={}", logging.level).parse()?);

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "dropwatch.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

fn build_scheduler(config: &AppConfig, args: &BatchArgs) -> Result<BatchScheduler> {
    let notifier: Arc<dyn Notifier> = if args.dry_run {
        Arc::new(LogNotifier::new(config.notifications.currency_symbol.clone()))
    } else {
        Arc::new(TelegramNotifier::new(&config.notifications)?)
    };
    info!(notifier = notifier.name(), "Using notifier");

    let fetcher = PageFetcher::new(&config.scraper)?;
    let thresholds = TierThresholds::from_config(&config.tiers)?;
    let product_manager = Arc::new(ProductManager::new(fetcher, thresholds, notifier));

    let concurrency = args.concurrency.unwrap_or(config.scraper.max_concurrent_checks);
    Ok(BatchScheduler::new(product_manager, concurrency))
}
