//! # serp-export
//!
//! Run a list of keywords through the SpaceSerp Google search API, collect the
//! organic results of every keyword into one table, and export it as CSV.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serp_export::{
//!     aggregator::Aggregator, export, keywords, providers::SpaceSerpProvider, run_keywords,
//!     RunOutcome,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = SpaceSerpProvider::new("YOUR_API_KEY")?;
//!     let mut aggregator = Aggregator::new(Box::new(provider));
//!
//!     let keywords = keywords::load_keywords("keywords.txt")?;
//!     match run_keywords(&mut aggregator, &keywords).await? {
//!         RunOutcome::Table { table, .. } => {
//!             export::export_to_path(&table, "search_results.csv")?;
//!         }
//!         other => println!("{}", other.message()),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod keywords;
pub mod progress;
pub mod projection;
pub mod providers;
pub mod rate_limit;
pub mod types;
pub mod utils;

// Re-export common types
pub use error::{SearchError, SearchResult as Result};
pub use projection::{project, ProjectedRow, ProjectedTable};
pub use types::{Keyword, ResultFetcher, ResultRecord, ResultTable, SearchParams};

use aggregator::{AggregateReport, Aggregator};

/// Terminal state of one run
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The keyword list was empty; nothing was fetched
    NoKeywords,
    /// Every keyword was processed but none returned results
    NoResults { report: AggregateReport },
    /// Results are available for display and export
    Table {
        table: ProjectedTable,
        report: AggregateReport,
    },
}

impl RunOutcome {
    /// Message shown to the user for this outcome
    pub fn message(&self) -> String {
        match self {
            RunOutcome::NoKeywords => "No valid keywords found in the file.".to_string(),
            RunOutcome::NoResults { .. } => "No results found for the given keywords.".to_string(),
            RunOutcome::Table { table, .. } => format!("{} results", table.len()),
        }
    }

    pub fn report(&self) -> Option<&AggregateReport> {
        match self {
            RunOutcome::NoKeywords => None,
            RunOutcome::NoResults { report } | RunOutcome::Table { report, .. } => Some(report),
        }
    }
}

/// Aggregate `keywords` and project the result
///
/// An empty keyword list or an empty result table is an outcome, not an
/// error. Fetch failures follow the aggregator's failure policy.
pub async fn run_keywords(aggregator: &mut Aggregator, keywords: &[Keyword]) -> Result<RunOutcome> {
    if keywords.is_empty() {
        log::warn!("No valid keywords to run");
        return Ok(RunOutcome::NoKeywords);
    }

    log::info!(
        "Running {} keywords through {}",
        keywords.len(),
        aggregator.fetcher().name()
    );

    let report = aggregator.aggregate(keywords).await?;
    if report.table.is_empty() {
        return Ok(RunOutcome::NoResults { report });
    }

    let table = project(&report.table);
    Ok(RunOutcome::Table { table, report })
}

/// Hints for a failed run, based on the underlying error
pub fn troubleshooting_info(error: &SearchError) -> String {
    match error {
        SearchError::KeywordFailed { source, .. } => troubleshooting_info(source),
        SearchError::AuthenticationError(_)
        | SearchError::HttpError {
            status_code: Some(401 | 403),
            ..
        } => "This is likely an authentication issue. Check that your SpaceSerp API key is valid and has credits remaining.".to_string(),
        SearchError::HttpError {
            status_code: Some(400),
            ..
        } => "This is likely due to invalid request parameters. Check the location, domain and page size settings.".to_string(),
        SearchError::RateLimit(_)
        | SearchError::HttpError {
            status_code: Some(429),
            ..
        } => "You've exceeded the rate limit for this API. Increase the delay between keywords or try again later.".to_string(),
        SearchError::HttpError {
            status_code: Some(500..=599),
            ..
        } => "The search API is experiencing server issues. Try again later, or rerun with --skip-failed.".to_string(),
        SearchError::Timeout { timeout_ms } => format!(
            "No response within {timeout_ms}ms. Raise the request timeout or check your network connection."
        ),
        SearchError::HttpError { .. } => {
            "Could not reach the search API. Check your network connection and the configured base URL.".to_string()
        }
        SearchError::ConfigError(_) => {
            "Check your secrets file and environment variables.".to_string()
        }
        SearchError::AccessDenied(_) => {
            "Enter the gate password from your secrets file or SERP_EXPORT_PASSWORD.".to_string()
        }
        _ => "Check your SpaceSerp API credentials and make sure your keyword file is valid.".to_string(),
    }
}
