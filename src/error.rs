use crate::alerts::{CycleError, NotifierError};
use crate::config::ConfigError;
use crate::search::{SearchError, TemplateError};

/// Top-level error, one variant per failure stage
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("search template error: {0}")]
    Template(#[from] TemplateError),

    #[error("search client error: {0}")]
    Search(#[from] SearchError),

    #[error("notifier error: {0}")]
    Notifier(#[from] NotifierError),

    #[error("health check failed: {0}")]
    Cycle(#[from] CycleError),

    #[error("health checker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
