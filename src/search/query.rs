//! Search request construction
//!
//! A request is either a rendered JSON body (POSTed to the backend) or the
//! default `response:5*` URI search. The shape is decided once at startup and
//! reused for every tick.

use std::path::Path;

use regex::Regex;

/// URI query selecting documents with a 5xx response code
pub const DEFAULT_QUERY: &str = "q=response:5*";

/// Placeholder names accepted in a search template
const INTERVAL_PLACEHOLDERS: [&str; 2] = [".Interval", "interval"];

/// Request issued against the search backend on every tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    /// Rendered JSON body, sent with POST
    Body(Vec<u8>),
    /// No body, GET with [`DEFAULT_QUERY`]
    Default,
}

impl SearchRequest {
    /// Wrap a rendered body; an empty buffer means "use the default query"
    pub fn from_body(body: Vec<u8>) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            SearchRequest::Default
        } else {
            SearchRequest::Body(body)
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, SearchRequest::Default)
    }
}

/// Renders search templates for a fixed polling interval
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    interval: String,
}

impl QueryBuilder {
    /// `interval` is substituted verbatim, e.g. `5m` for `now-{{.Interval}}`
    pub fn new(interval: impl Into<String>) -> Self {
        Self {
            interval: interval.into(),
        }
    }

    /// Build the request from an optional template file
    pub fn build(&self, template_path: Option<&Path>) -> Result<SearchRequest, TemplateError> {
        let Some(path) = template_path else {
            return Ok(SearchRequest::Default);
        };

        let source = std::fs::read_to_string(path).map_err(|e| TemplateError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), "Loaded search template");
        self.build_from_source(&source)
    }

    /// Build the request from template text already in memory
    pub fn build_from_source(&self, source: &str) -> Result<SearchRequest, TemplateError> {
        let rendered = self.render(source)?;

        if rendered.trim().is_empty() {
            return Ok(SearchRequest::Default);
        }

        serde_json::from_str::<serde_json::Value>(&rendered)
            .map_err(|e| TemplateError::InvalidJson(e.to_string()))?;

        Ok(SearchRequest::from_body(rendered.into_bytes()))
    }

    /// Substitute the interval into every placeholder of `source`
    ///
    /// `{{- ` and ` -}}` trim markers drop the whitespace before and after
    /// the placeholder.
    pub fn render(&self, source: &str) -> Result<String, TemplateError> {
        let placeholder = Regex::new(r"\{\{(-\s)?\s*([^{}]*?)\s*(\s-)?\}\}")?;

        let mut output = String::with_capacity(source.len());
        let mut last = 0;
        let mut trim_next = false;

        for caps in placeholder.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
                continue;
            };

            let literal = &source[last..whole.start()];
            check_literal(literal, last)?;
            push_literal(&mut output, literal, trim_next);
            if caps.get(1).is_some() {
                output.truncate(output.trim_end().len());
            }

            if !INTERVAL_PLACEHOLDERS.contains(&name.as_str()) {
                return Err(TemplateError::UnknownPlaceholder(name.as_str().to_string()));
            }
            output.push_str(&self.interval);
            trim_next = caps.get(3).is_some();
            last = whole.end();
        }

        let tail = &source[last..];
        check_literal(tail, last)?;
        push_literal(&mut output, tail, trim_next);

        Ok(output)
    }
}

fn push_literal(output: &mut String, literal: &str, trim_start: bool) {
    if trim_start {
        output.push_str(literal.trim_start());
    } else {
        output.push_str(literal);
    }
}

/// Text between placeholders must not open another one
fn check_literal(literal: &str, offset: usize) -> Result<(), TemplateError> {
    match literal.find("{{") {
        Some(pos) => Err(TemplateError::Unterminated(offset + pos)),
        None => Ok(()),
    }
}

/// Search template errors
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to read template {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown template placeholder: {{{{{0}}}}}")]
    UnknownPlaceholder(String),

    #[error("unterminated placeholder at byte {0}")]
    Unterminated(usize),

    #[error("rendered template is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("placeholder pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
