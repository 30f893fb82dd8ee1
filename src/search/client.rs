//! HTTP client for the log search backend

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;

use super::query::{SearchRequest, DEFAULT_QUERY};
use super::response::SearchResult;

/// Default Elasticsearch HTTP port
pub const DEFAULT_PORT: u16 = 9200;

/// Prefix of the daily logstash indices
pub const INDEX_PREFIX: &str = "logstash-";

/// Something that can answer a search for a given day
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        request: &SearchRequest,
        date: NaiveDate,
    ) -> Result<SearchResult, SearchError>;
}

/// Elasticsearch `_search` client
#[derive(Debug, Clone)]
pub struct SearchClient {
    http_client: reqwest::Client,
    host: String,
    port: u16,
}

impl SearchClient {
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, SearchError> {
        Self::with_timeout(host, port, None)
    }

    /// Build a client whose requests give up after `timeout`
    pub fn with_timeout(
        host: impl Into<String>,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<Self, SearchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            host: host.into(),
            port,
        })
    }

    /// `_search` endpoint of the index for `date`
    pub fn search_url(&self, date: NaiveDate) -> String {
        format!(
            "http://{}:{}/{}/_search",
            self.host,
            self.port,
            index_name(date)
        )
    }
}

/// Daily index name, e.g. `logstash-2024.03.07`
pub fn index_name(date: NaiveDate) -> String {
    format!("{}{}", INDEX_PREFIX, date.format("%Y.%m.%d"))
}

#[async_trait]
impl SearchBackend for SearchClient {
    async fn search(
        &self,
        request: &SearchRequest,
        date: NaiveDate,
    ) -> Result<SearchResult, SearchError> {
        let url = self.search_url(date);

        let pending = match request {
            SearchRequest::Body(body) => {
                tracing::info!(url = %url, "Searching with request body");
                self.http_client
                    .post(&url)
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(body.clone())
            }
            SearchRequest::Default => {
                let url = format!("{}?{}", url, DEFAULT_QUERY);
                tracing::info!(url = %url, "Searching with URI query");
                self.http_client.get(url)
            }
        };

        let response = pending
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body: text });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let result =
            SearchResult::from_slice(&body).map_err(|e| SearchError::Decode(e.to_string()))?;

        tracing::info!(total = result.total, returned = result.messages.len(), "Found hits");

        Ok(result)
    }
}

/// Search errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(String),

    #[error("search returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode search response: {0}")]
    Decode(String),
}
