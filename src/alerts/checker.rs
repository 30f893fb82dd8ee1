//! Background health checker

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::notifier::{Notification, Notifier, NotifierError};
use crate::clock::Clock;
use crate::search::{SearchBackend, SearchError, SearchRequest};

/// What the loop does after a failed cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the loop and hand the error to the caller
    #[default]
    Exit,
    /// Log the error and wait for the next tick
    Continue,
}

/// Outcome of a successful cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing matched
    Clear,
    /// Matches found and a mail was sent
    Notified(Notification),
}

/// Polls the search backend and mails a summary when failures show up
pub struct HealthChecker {
    inner: Arc<CheckerInner>,
    policy: FailurePolicy,
    /// Shutdown signal sender
    shutdown_tx: Option<mpsc::Sender<()>>,
}

struct CheckerInner {
    backend: Box<dyn SearchBackend>,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
    request: SearchRequest,
    interval: Duration,
}

impl HealthChecker {
    /// Create a checker; `request` is built once and reused for every tick
    pub fn new(
        backend: impl SearchBackend + 'static,
        notifier: impl Notifier + 'static,
        clock: impl Clock + 'static,
        request: SearchRequest,
        interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(CheckerInner {
                backend: Box::new(backend),
                notifier: Box::new(notifier),
                clock: Box::new(clock),
                request,
                interval,
            }),
            policy: FailurePolicy::default(),
            shutdown_tx: None,
        }
    }

    /// Set the failure policy applied by the background loop
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run a single search-and-notify attempt
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        self.inner.run_cycle().await
    }

    /// Start the background loop
    ///
    /// The handle resolves to `Ok(())` after `stop`, or to the first cycle
    /// error under [`FailurePolicy::Exit`].
    pub fn start(&mut self) -> tokio::task::JoinHandle<Result<(), CycleError>> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);

        let inner = Arc::clone(&self.inner);
        let policy = self.policy;
        tokio::spawn(async move { inner.run_loop(policy, shutdown_rx).await })
    }

    /// Stop the background loop
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }
}

impl CheckerInner {
    async fn run_loop(
        &self,
        policy: FailurePolicy,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> Result<(), CycleError> {
        loop {
            tracing::info!("Waiting {:?}", self.interval);

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_rx.recv() => {
                    tracing::info!("Health checker shutting down");
                    return Ok(());
                }
            }

            if let Err(e) = self.run_cycle().await {
                tracing::error!(error = %e, "Health check failed");
                if policy == FailurePolicy::Exit {
                    return Err(e);
                }
            }
        }
    }

    async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        let date = self.clock.today();
        let result = self.backend.search(&self.request, date).await?;

        let Some(notification) = Notification::from_result(&result) else {
            return Ok(CycleOutcome::Clear);
        };

        tracing::info!(
            total = notification.total,
            messages = %notification.messages,
            "Services unavailable"
        );
        self.notifier.notify(&notification).await?;

        Ok(CycleOutcome::Notified(notification))
    }
}

/// Health check cycle errors
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Notify(#[from] NotifierError),
}
