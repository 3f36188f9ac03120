//! HTTP utilities for calling the search-results API

use crate::error::{SearchError, SearchResult};
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

const USER_AGENT: &str = concat!("serp-export/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper with an explicit per-request timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with the default timeout
    pub fn new() -> SearchResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_MS)
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout_ms: u64) -> SearchResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| SearchError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            default_timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn timeout_ms(&self) -> u64 {
        self.default_timeout.as_millis() as u64
    }

    /// Make a GET request and return the response as text
    pub async fn get_text(&self, url: &str) -> SearchResult<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.default_timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.handle_response_text(response).await
    }

    fn map_send_error(&self, error: reqwest::Error) -> SearchError {
        if error.is_timeout() {
            SearchError::Timeout {
                timeout_ms: self.timeout_ms(),
            }
        } else {
            SearchError::HttpError {
                message: format!("Failed to send request: {error}"),
                status_code: None,
                response_body: None,
            }
        }
    }

    /// Handle HTTP response and return as text
    async fn handle_response_text(&self, response: Response) -> SearchResult<String> {
        let status = response.status();

        if status.is_success() {
            let text = response.text().await.map_err(|e| self.map_send_error(e))?;
            Ok(text)
        } else {
            let status_code = status.as_u16();
            let response_body = response.text().await.ok();

            match status_code {
                401 | 403 => Err(SearchError::AuthenticationError(format!(
                    "Request rejected with status: {status}"
                ))),
                429 => Err(SearchError::RateLimit(format!(
                    "Request rejected with status: {status}"
                ))),
                _ => Err(SearchError::HttpError {
                    message: format!("Request failed with status: {status}"),
                    status_code: Some(status_code),
                    response_body,
                }),
            }
        }
    }
}

/// Build a URL with query parameters, preserving their order
pub fn build_url(base_url: &str, params: &[(&str, String)]) -> SearchResult<String> {
    let mut url = Url::parse(base_url)?;

    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    Ok(url.to_string())
}

/// Replace the value of `param` in a URL's query string with `***`
pub fn mask_query_param(url: &str, param: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            if k == param {
                (k.into_owned(), "***".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}
