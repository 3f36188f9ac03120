//! Error types for the keyword export pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Comprehensive error types for fetching, aggregating and exporting results
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// HTTP request failed
    #[error("HTTP request failed: {message}")]
    HttpError {
        message: String,
        status_code: Option<u16>,
        response_body: Option<String>,
    },

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Timeout error
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// The API rejected the request credentials
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// The password gate refused to open
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Writing the CSV output failed
    #[error("Export failed: {0}")]
    ExportError(String),

    /// A keyword's fetch failed and the run was aborted
    #[error("Keyword #{position} '{keyword}' failed: {source}")]
    KeywordFailed {
        keyword: String,
        position: usize,
        #[source]
        source: Box<SearchError>,
    },

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(String),
}

impl SearchError {
    /// Status code of the underlying HTTP failure, looking through `KeywordFailed`
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SearchError::HttpError { status_code, .. } => *status_code,
            SearchError::KeywordFailed { source, .. } => source.status_code(),
            _ => None,
        }
    }
}

impl From<url::ParseError> for SearchError {
    fn from(error: url::ParseError) -> Self {
        SearchError::InvalidInput(format!("Invalid URL: {error}"))
    }
}

impl From<csv::Error> for SearchError {
    fn from(error: csv::Error) -> Self {
        SearchError::ExportError(format!("CSV error: {error}"))
    }
}

impl From<toml::de::Error> for SearchError {
    fn from(error: toml::de::Error) -> Self {
        SearchError::ConfigError(format!("Invalid secrets file: {error}"))
    }
}

impl From<std::io::Error> for SearchError {
    fn from(error: std::io::Error) -> Self {
        SearchError::Io(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_failed_display_names_keyword() {
        let error = SearchError::KeywordFailed {
            keyword: "plumber houston".to_string(),
            position: 3,
            source: Box::new(SearchError::Timeout { timeout_ms: 500 }),
        };

        let message = error.to_string();
        assert!(message.contains("#3"));
        assert!(message.contains("plumber houston"));
        assert!(message.contains("500ms"));
    }

    #[test]
    fn test_status_code_looks_through_keyword_failure() {
        let error = SearchError::KeywordFailed {
            keyword: "roofer".to_string(),
            position: 1,
            source: Box::new(SearchError::HttpError {
                message: "Bad Gateway".to_string(),
                status_code: Some(502),
                response_body: None,
            }),
        };

        assert_eq!(error.status_code(), Some(502));
        assert_eq!(SearchError::InvalidInput("x".to_string()).status_code(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt");
        match SearchError::from(io) {
            SearchError::Io(msg) => assert!(msg.contains("missing.txt")),
            other => panic!("Expected Io error, got {other:?}"),
        }
    }
}
