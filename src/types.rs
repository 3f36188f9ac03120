//! Core types and traits for the keyword export pipeline

use crate::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Field added to every record to identify the query that produced it
pub const KEYWORD_FIELD: &str = "keyword";

/// Columns kept by projection, in output order
pub const PROJECTED_COLUMNS: [&str; 7] = [
    "keyword",
    "position",
    "page",
    "domain",
    "link",
    "title",
    "description",
];

/// A single search query, trimmed and guaranteed non-empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Keyword(String);

impl Keyword {
    /// Trim `raw` and reject it if nothing is left
    pub fn new(raw: &str) -> SearchResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SearchError::InvalidInput(
                "A keyword must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Keyword {
    type Error = SearchError;

    fn try_from(value: String) -> SearchResult<Self> {
        Keyword::new(&value)
    }
}

impl From<Keyword> for String {
    fn from(keyword: Keyword) -> Self {
        keyword.0
    }
}

/// One organic result as returned by the API, plus the `keyword` tag
///
/// All fields the API sent are kept; projection decides what is exported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord {
    fields: Map<String, Value>,
}

impl ResultRecord {
    /// Wrap a JSON value, which must be an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    /// Tag the record with the keyword that produced it
    pub fn set_keyword(&mut self, keyword: &Keyword) {
        self.insert(KEYWORD_FIELD, Value::String(keyword.as_str().to_string()));
    }

    pub fn keyword(&self) -> Option<&str> {
        self.fields.get(KEYWORD_FIELD).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Records accumulated over one run, in keyword order then API order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    records: Vec<ResultRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }
}

impl FromIterator<ResultRecord> for ResultTable {
    fn from_iter<I: IntoIterator<Item = ResultRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a ResultRecord;
    type IntoIter = std::slice::Iter<'a, ResultRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Debug options for fetchers
#[derive(Debug, Clone, Default)]
pub struct DebugOptions {
    /// Enable verbose logging
    pub enabled: bool,
    /// Log request details (URLs with the API key masked)
    pub log_requests: bool,
    /// Log full responses
    pub log_responses: bool,
}

/// Query parameters a run may override
///
/// The response format and result block are not configurable: the fetcher
/// always asks for JSON organic results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchParams {
    /// Geographic location the search is run from
    pub location: String,
    /// Search engine domain
    pub domain: String,
    /// Country code (`gl`)
    pub country: String,
    /// Interface language (`hl`)
    pub language: String,
    /// Number of results per request
    pub page_size: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            location: "Houston,Texas,United States".to_string(),
            domain: "google.com".to_string(),
            country: "us".to_string(),
            language: "en".to_string(),
            page_size: 100,
        }
    }
}

/// Anything that can turn one keyword into a list of result records
#[async_trait::async_trait]
pub trait ResultFetcher: Send + Sync + std::fmt::Debug {
    /// Name of the fetcher
    fn name(&self) -> &str;

    /// Fetch the organic results for one keyword
    async fn fetch(&self, keyword: &Keyword) -> SearchResult<Vec<ResultRecord>>;

    /// Get fetcher configuration (for debugging/logging)
    fn config(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}
