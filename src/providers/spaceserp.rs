//! SpaceSerp Google search provider

use crate::{
    error::{SearchError, SearchResult},
    types::{DebugOptions, Keyword, ResultFetcher, ResultRecord, SearchParams},
    utils::{
        debug,
        http::{build_url, mask_query_param, HttpClient},
    },
};
use serde_json::Value;
use std::collections::HashMap;

/// Default SpaceSerp endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.spaceserp.com/google/search";

/// Top-level response key holding the organic results
pub const RESULTS_KEY: &str = "organic_results";

/// Response encoding requested from the API
const RESULT_FORMAT: &str = "json";

#[derive(Debug)]
pub struct SpaceSerpProvider {
    api_key: String,
    base_url: String,
    params: SearchParams,
    http: HttpClient,
    debug: Option<DebugOptions>,
}

impl SpaceSerpProvider {
    pub fn new(api_key: &str) -> SearchResult<Self> {
        if api_key.trim().is_empty() {
            return Err(SearchError::ConfigError(
                "SpaceSerp API key is required".to_string(),
            ));
        }

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            params: SearchParams::default(),
            http: HttpClient::new()?,
            debug: None,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> SearchResult<Self> {
        self.http = HttpClient::with_timeout(timeout_ms)?;
        Ok(self)
    }

    pub fn with_debug(mut self, debug: DebugOptions) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Query string for one keyword, in the order the API documents it
    fn query_params(&self, keyword: &Keyword) -> Vec<(&'static str, String)> {
        vec![
            ("apiKey", self.api_key.clone()),
            ("q", keyword.as_str().to_string()),
            ("location", self.params.location.clone()),
            ("domain", self.params.domain.clone()),
            ("gl", self.params.country.clone()),
            ("hl", self.params.language.clone()),
            ("resultFormat", RESULT_FORMAT.to_string()),
            ("resultBlocks", RESULTS_KEY.to_string()),
            ("pageSize", self.params.page_size.to_string()),
        ]
    }
}

#[async_trait::async_trait]
impl ResultFetcher for SpaceSerpProvider {
    fn name(&self) -> &str {
        "spaceserp"
    }

    async fn fetch(&self, keyword: &Keyword) -> SearchResult<Vec<ResultRecord>> {
        let url = build_url(&self.base_url, &self.query_params(keyword))?;
        debug::log_request(&self.debug, "GET", &mask_query_param(&url, "apiKey"));

        let body = self.http.get_text(&url).await?;
        debug::log_response(&self.debug, &response_log_line(keyword, &body));

        let records = extract_organic_results(keyword, &body);
        debug::log(
            &self.debug,
            "Parsed response",
            &format!("{} organic results for '{keyword}'", records.len()),
        );
        Ok(records)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("api_key".to_string(), "***".to_string());
        config.insert("base_url".to_string(), self.base_url.clone());
        config.insert("location".to_string(), self.params.location.clone());
        config.insert("domain".to_string(), self.params.domain.clone());
        config.insert("gl".to_string(), self.params.country.clone());
        config.insert("hl".to_string(), self.params.language.clone());
        config.insert("page_size".to_string(), self.params.page_size.to_string());
        config.insert("timeout_ms".to_string(), self.http.timeout_ms().to_string());
        config
    }
}

fn response_log_line(keyword: &Keyword, body: &str) -> String {
    format!("'{keyword}' ({} bytes): {body}", body.len())
}

/// Pull the organic results out of a response body
///
/// A body that is not JSON, or that lacks a list under [`RESULTS_KEY`], is
/// logged as a warning and yields no records. Non-object list entries are
/// dropped.
pub fn extract_organic_results(keyword: &Keyword, body: &str) -> Vec<ResultRecord> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Malformed JSON in API response for keyword '{keyword}': {e}");
            return Vec::new();
        }
    };

    let Value::Object(mut fields) = value else {
        log::warn!("API response for keyword '{keyword}' is not a JSON object.");
        return Vec::new();
    };

    match fields.remove(RESULTS_KEY) {
        Some(Value::Array(items)) => {
            let total = items.len();
            let records: Vec<ResultRecord> =
                items.into_iter().filter_map(ResultRecord::from_value).collect();
            if records.len() < total {
                log::warn!(
                    "Dropped {} non-object entries from '{RESULTS_KEY}' for keyword '{keyword}'.",
                    total - records.len()
                );
            }
            records
        }
        Some(_) => {
            log::warn!("'{RESULTS_KEY}' is not a list in API response for keyword '{keyword}'.");
            Vec::new()
        }
        None => {
            match fields.get("error").and_then(Value::as_str) {
                Some(error) => log::warn!(
                    "'{RESULTS_KEY}' not found in API response for keyword '{keyword}' (API error: {error})."
                ),
                None => log::warn!(
                    "'{RESULTS_KEY}' not found in API response for keyword '{keyword}'."
                ),
            }
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keyword(text: &str) -> Keyword {
        Keyword::new(text).unwrap()
    }

    #[test]
    fn test_response_log_line_includes_body() {
        let body = r#"{"organic_results":[]}"#;
        let line = response_log_line(&keyword("roofer"), body);

        assert!(line.contains("'roofer'"));
        assert!(line.contains("22 bytes"));
        assert!(line.ends_with(body));
    }

    #[test]
    fn test_requires_api_key() {
        match SpaceSerpProvider::new("  ") {
            Err(SearchError::ConfigError(msg)) => assert!(msg.contains("API key")),
            other => panic!("Expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn test_query_params_are_fixed() {
        let provider = SpaceSerpProvider::new("test_key").unwrap();
        let params = provider.query_params(&keyword("plumber houston"));
        let names: Vec<&str> = params.iter().map(|(k, _)| *k).collect();

        assert_eq!(
            names,
            vec![
                "apiKey",
                "q",
                "location",
                "domain",
                "gl",
                "hl",
                "resultFormat",
                "resultBlocks",
                "pageSize"
            ]
        );
        assert_eq!(params[0].1, "test_key");
        assert_eq!(params[1].1, "plumber houston");
        assert_eq!(params[8].1, "100");
    }

    #[test]
    fn test_config_masks_api_key() {
        let provider = SpaceSerpProvider::new("secret").unwrap();
        let config = provider.config();
        assert_eq!(config.get("api_key"), Some(&"***".to_string()));
        assert_eq!(config.get("base_url"), Some(&DEFAULT_BASE_URL.to_string()));
        assert!(!config.values().any(|v| v == "secret"));
    }

    #[test]
    fn test_extract_keeps_api_order() {
        let body = json!({
            "organic_results": [
                {"position": 1, "title": "First"},
                {"position": 2, "title": "Second"}
            ]
        })
        .to_string();

        let records = extract_organic_results(&keyword("roofer"), &body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("title"), Some(&json!("First")));
        assert_eq!(records[1].get("title"), Some(&json!("Second")));
    }

    #[test]
    fn test_extract_missing_key_is_empty() {
        let body = json!({"search_information": {"total": 0}}).to_string();
        assert!(extract_organic_results(&keyword("roofer"), &body).is_empty());
    }

    #[test]
    fn test_extract_malformed_json_is_empty() {
        assert!(extract_organic_results(&keyword("roofer"), "<html>oops</html>").is_empty());
        assert!(extract_organic_results(&keyword("roofer"), "[1, 2]").is_empty());
    }

    #[test]
    fn test_extract_non_list_and_non_object_entries() {
        let body = json!({"organic_results": "none"}).to_string();
        assert!(extract_organic_results(&keyword("roofer"), &body).is_empty());

        let body = json!({"organic_results": [{"position": 1}, 7, null]}).to_string();
        assert_eq!(extract_organic_results(&keyword("roofer"), &body).len(), 1);
    }
}
