//! Sequential keyword-to-table aggregation

use crate::{
    error::{SearchError, SearchResult as Result},
    progress::{LogReporter, ProgressReporter},
    rate_limit::{NoDelay, RateLimiter},
    types::{Keyword, ResultFetcher, ResultTable},
};

/// What to do when fetching one keyword fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run and return the error
    #[default]
    Abort,
    /// Record the failure and continue with the next keyword
    Skip,
}

/// Lifecycle of an aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No run in progress and no table available
    Idle,
    /// Iterating keywords
    Running { completed: usize, total: usize },
    /// Last run finished; its table was returned to the caller
    Done,
}

/// A keyword whose fetch failed under [`FailurePolicy::Skip`]
#[derive(Debug, Clone)]
pub struct KeywordFailure {
    pub position: usize,
    pub keyword: Keyword,
    pub error: SearchError,
}

/// Outcome of one aggregation run
#[derive(Debug, Clone, Default)]
pub struct AggregateReport {
    pub table: ResultTable,
    /// Keywords for which the fetcher was invoked
    pub keywords_processed: usize,
    pub failures: Vec<KeywordFailure>,
}

impl AggregateReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Drives a fetcher over a keyword list, one keyword at a time
pub struct Aggregator {
    fetcher: Box<dyn ResultFetcher>,
    rate_limiter: Box<dyn RateLimiter>,
    reporter: Box<dyn ProgressReporter>,
    policy: FailurePolicy,
    state: RunState,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("fetcher", &self.fetcher.name())
            .field("rate_limiter", &self.rate_limiter)
            .field("policy", &self.policy)
            .field("state", &self.state)
            .finish()
    }
}

impl Aggregator {
    pub fn new(fetcher: Box<dyn ResultFetcher>) -> Self {
        Self {
            fetcher,
            rate_limiter: Box::new(NoDelay),
            reporter: Box::new(LogReporter),
            policy: FailurePolicy::default(),
            state: RunState::Idle,
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Box<dyn RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn fetcher(&self) -> &dyn ResultFetcher {
        &*self.fetcher
    }

    /// Fetch every keyword in order and concatenate the tagged results
    ///
    /// The rate limiter runs between keywords, never after the last one.
    /// Under [`FailurePolicy::Abort`] the first fetch error ends the run with
    /// [`SearchError::KeywordFailed`] and the aggregator returns to
    /// [`RunState::Idle`].
    pub async fn aggregate(&mut self, keywords: &[Keyword]) -> Result<AggregateReport> {
        let total = keywords.len();
        let mut report = AggregateReport::default();

        if keywords.is_empty() {
            self.set_state(RunState::Done);
            return Ok(report);
        }

        self.set_state(RunState::Running {
            completed: 0,
            total,
        });

        for (offset, keyword) in keywords.iter().enumerate() {
            let position = offset + 1;
            self.reporter.keyword_started(position, total, keyword);

            let fetched = self.fetcher.fetch(keyword).await;
            report.keywords_processed += 1;

            match fetched {
                Ok(records) => {
                    let rows = records.len();
                    for mut record in records {
                        record.set_keyword(keyword);
                        report.table.push(record);
                    }
                    self.reporter.keyword_completed(position, total, keyword, rows);
                }
                Err(error) => {
                    self.reporter.keyword_failed(position, total, keyword, &error);
                    match self.policy {
                        FailurePolicy::Abort => {
                            self.set_state(RunState::Idle);
                            return Err(SearchError::KeywordFailed {
                                keyword: keyword.to_string(),
                                position,
                                source: Box::new(error),
                            });
                        }
                        FailurePolicy::Skip => report.failures.push(KeywordFailure {
                            position,
                            keyword: keyword.clone(),
                            error,
                        }),
                    }
                }
            }

            self.set_state(RunState::Running {
                completed: position,
                total,
            });

            if position < total {
                self.rate_limiter.pause().await;
            }
        }

        log::info!(
            "Aggregated {} results from {} keywords ({} failed)",
            report.table.len(),
            report.keywords_processed,
            report.failures.len()
        );
        self.set_state(RunState::Done);
        Ok(report)
    }

    fn set_state(&mut self, state: RunState) {
        self.state = state;
        self.reporter.state_changed(state);
    }
}
