//! Log search backend access
//!
//! Builds the per-process search request and runs it against the daily
//! logstash index.

pub mod client;
pub mod query;
pub mod response;

pub use client::{index_name, SearchBackend, SearchClient, SearchError};
pub use query::{QueryBuilder, SearchRequest, TemplateError};
pub use response::SearchResult;
