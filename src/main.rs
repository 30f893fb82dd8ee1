//! Healthy
//!
//! Run with: healthy <interval> [--es-host host] [--es-search json] [--from mail]
//!           [--to mail] [--smtp-host host]
//!
//! Every flag can also come from the environment (HEALTHY_ES_HOST,
//! HEALTHY_ES_SEARCH, HEALTHY_FROM, HEALTHY_TO, HEALTHY_SMTP_HOST, ...).
//! RUST_LOG sets the log level (default: healthy=info).

use healthy::cli::{get_matches, CliArgs};
use healthy::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "healthy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::from_matches(&get_matches());
    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!("Healthy configuration:");
    tracing::info!("  Interval: {} ({:?})", config.interval_text, config.interval);
    tracing::info!("  ElasticSearch: {}:{}", config.es_host, config.es_port);
    match &config.search_template {
        Some(path) => tracing::info!("  Search template: {}", path.display()),
        None => tracing::info!("  Search: default URI query"),
    }
    tracing::info!("  Mail: {} -> {}", config.from, config.to);
    tracing::info!("  SMTP relay: {}:{}", config.smtp_host, config.smtp_port);
    tracing::info!("  On failure: {:?}", config.failure_policy);

    if let Err(e) = healthy::run(&config).await {
        tracing::error!(error = %e, "Exiting");
        std::process::exit(1);
    }
}
