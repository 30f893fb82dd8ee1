//! Healthy: mail alerts for failing services
//!
//! Polls the daily logstash index of an Elasticsearch server on a fixed
//! interval and sends a mail listing the matched log messages whenever the
//! search finds any.
//!
//! # Features
//!
//! - **Default search**: URI query for 5xx response codes (`response:5*`)
//! - **Custom search**: JSON template file with an `{{.Interval}}` placeholder
//! - **Daily indices**: `logstash-YYYY.MM.DD` chosen at every tick
//! - **Mail**: one plaintext mail per cycle with hits, through an SMTP relay
//! - **Failure policy**: exit on the first failed check, or keep polling
//!
//! # Example
//!
//! ```no_run
//! use healthy::alerts::{HealthChecker, SmtpNotifier};
//! use healthy::clock::SystemClock;
//! use healthy::search::{QueryBuilder, SearchClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = QueryBuilder::new("5m").build(None)?;
//! let backend = SearchClient::new("localhost", 9200)?;
//! let notifier = SmtpNotifier::new("localhost", 25, "healthy@web-1", "ops@web-1", None)?;
//!
//! let checker = HealthChecker::new(
//!     backend,
//!     notifier,
//!     SystemClock,
//!     request,
//!     Duration::from_secs(300),
//! );
//! let outcome = checker.run_cycle().await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod search;

pub use alerts::{FailurePolicy, HealthChecker};
pub use config::Config;
pub use error::{Error, Result};

use alerts::SmtpNotifier;
use clock::SystemClock;
use search::{QueryBuilder, SearchClient};

/// Build a checker from configuration
///
/// The search request is rendered here, once, so template problems surface
/// before the first tick.
pub fn build_checker(config: &Config) -> Result<HealthChecker> {
    let request =
        QueryBuilder::new(&config.interval_text).build(config.search_template.as_deref())?;

    let backend = SearchClient::with_timeout(&config.es_host, config.es_port, config.timeout)?;
    let notifier = SmtpNotifier::new(
        &config.smtp_host,
        config.smtp_port,
        &config.from,
        &config.to,
        config.timeout,
    )?;

    Ok(
        HealthChecker::new(backend, notifier, SystemClock, request, config.interval)
            .with_policy(config.failure_policy),
    )
}

/// Run the checker until Ctrl-C or, under [`FailurePolicy::Exit`], the first
/// failed check
pub async fn run(config: &Config) -> Result<()> {
    let mut checker = build_checker(config)?;
    let mut handle = checker.start();

    tokio::select! {
        result = &mut handle => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C");
            checker.stop().await;
            handle.await??;
        }
    }

    Ok(())
}
