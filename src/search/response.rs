//! Search response decoding

use serde::{Deserialize, Deserializer};

/// Decoded outcome of one search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Aggregate match count reported by the backend
    pub total: u64,
    /// `_source.message` of each returned hit, in response order
    pub messages: Vec<String>,
}

impl SearchResult {
    /// Decode a raw `_search` response body
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let response: SearchResponse = serde_json::from_slice(body)?;
        Ok(response.into())
    }

    pub fn has_hits(&self) -> bool {
        self.total > 0
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    hits: Hits,
}

#[derive(Debug, Default, Deserialize)]
struct Hits {
    #[serde(default, deserialize_with = "null_as_default")]
    total: Total,
    #[serde(default, deserialize_with = "null_as_default")]
    hits: Vec<serde_json::Value>,
}

/// Missing and `null` fields both decode to the default value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `hits.total` is a bare integer before Elasticsearch 7, an object after
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Total {
    Count(u64),
    Object { value: u64 },
}

impl Default for Total {
    fn default() -> Self {
        Total::Count(0)
    }
}

impl Total {
    fn value(&self) -> u64 {
        match self {
            Total::Count(n) | Total::Object { value: n } => *n,
        }
    }
}

impl From<SearchResponse> for SearchResult {
    fn from(response: SearchResponse) -> Self {
        let messages = response
            .hits
            .hits
            .iter()
            .map(|hit| {
                hit.pointer("/_source/message")
                    .and_then(|m| m.as_str())
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();

        Self {
            total: response.hits.total.value(),
            messages,
        }
    }
}
