//! In-memory memoization of fetch results per keyword

use crate::{
    error::SearchResult,
    types::{Keyword, ResultFetcher, ResultRecord},
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Wraps a fetcher and remembers each keyword's successful result list
///
/// Empty results are cached like any other; errors are not.
#[derive(Debug)]
pub struct CachedFetcher<F> {
    inner: F,
    entries: Mutex<HashMap<String, Vec<ResultRecord>>>,
}

impl<F: ResultFetcher> CachedFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, keyword: &Keyword) -> bool {
        self.lock().contains_key(keyword.as_str())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<ResultRecord>>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl<F: ResultFetcher> ResultFetcher for CachedFetcher<F> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, keyword: &Keyword) -> SearchResult<Vec<ResultRecord>> {
        let hit = self.lock().get(keyword.as_str()).cloned();
        if let Some(records) = hit {
            log::debug!("Cache hit for keyword '{keyword}'");
            return Ok(records);
        }

        let records = self.inner.fetch(keyword).await?;
        self.lock()
            .insert(keyword.as_str().to_string(), records.clone());
        Ok(records)
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = self.inner.config();
        config.insert("cache".to_string(), "enabled".to_string());
        config
    }
}
