use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use link_refresher::application::services::RefreshService;
use link_refresher::application::ConsumerLoop;
use link_refresher::config::Config;
use link_refresher::infrastructure::messaging::AmqpConsumer;
use link_refresher::infrastructure::persistence::PgLinkRepository;
use link_refresher::infrastructure::scrape::HttpScraper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    let repository = Arc::new(PgLinkRepository::new(Arc::new(pool)));
    let scraper = Arc::new(HttpScraper::new(Duration::from_secs(
        config.scrape_timeout_seconds,
    ))?);
    let consumer = Arc::new(AmqpConsumer::connect(&config.amqp_url).await?);

    let service = Arc::new(RefreshService::new(repository, scraper));
    let consumer_loop = ConsumerLoop::new(consumer, service, config.queue_name.clone());

    let cancel = CancellationToken::new();
    let handle = consumer_loop.start(cancel.clone()).await?;

    tracing::info!(queue = %config.queue_name, "link refresher running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    // Let any in-flight delivery finish before exiting.
    tracing::info!("shutting down");
    cancel.cancel();
    handle.await?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    if config.log_format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
