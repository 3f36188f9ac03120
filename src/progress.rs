//! Per-keyword progress notifications

use crate::{aggregator::RunState, error::SearchError, types::Keyword};

/// Receives progress events from the aggregator
///
/// `index` is 1-based; `total` is the number of keywords in the run.
pub trait ProgressReporter: Send + Sync {
    /// Called on every aggregator state transition
    fn state_changed(&self, _state: RunState) {}

    fn keyword_started(&self, _index: usize, _total: usize, _keyword: &Keyword) {}

    fn keyword_completed(&self, _index: usize, _total: usize, _keyword: &Keyword, _rows: usize) {}

    fn keyword_failed(
        &self,
        _index: usize,
        _total: usize,
        _keyword: &Keyword,
        _error: &SearchError,
    ) {
    }
}

/// Reports through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn keyword_started(&self, index: usize, total: usize, keyword: &Keyword) {
        log::info!("Keyword #{index}/{total} being run: {keyword}");
    }

    fn keyword_completed(&self, index: usize, total: usize, keyword: &Keyword, rows: usize) {
        log::info!("Keyword #{index}/{total} '{keyword}' returned {rows} results");
    }

    fn keyword_failed(&self, index: usize, total: usize, keyword: &Keyword, error: &SearchError) {
        log::error!("Keyword #{index}/{total} '{keyword}' failed: {error}");
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
