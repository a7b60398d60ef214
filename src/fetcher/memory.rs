use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{FeedError, Result};
use crate::domain::Model;
use crate::fetcher::{Api, Parameters, PAGE_PARAMETER};

/// In-memory paged collection.
///
/// Page `n` holds items `[n * page_size, (n + 1) * page_size)`; pages past
/// the end are empty. Every request is recorded so callers can inspect what
/// was asked for.
pub struct MemoryApi<T> {
    items: Vec<T>,
    page_size: usize,
    latency: Option<Duration>,
    failing_pages: HashSet<usize>,
    hang_from_page: Option<usize>,
    calls: Mutex<Vec<Parameters>>,
}

impl<T: Model> MemoryApi<T> {
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            latency: None,
            failing_pages: HashSet::new(),
            hang_from_page: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer requests for `page` with [`FeedError::Unavailable`].
    pub fn failing_page(mut self, page: usize) -> Self {
        self.failing_pages.insert(page);
        self
    }

    /// Never answer requests for `page` or any later page.
    pub fn hanging_from(mut self, page: usize) -> Self {
        self.hang_from_page = Some(page);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Parameters of every request received so far, oldest first.
    pub fn calls(&self) -> Vec<Parameters> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Pages requested so far, oldest first.
    pub fn requested_pages(&self) -> Vec<usize> {
        self.calls()
            .iter()
            .filter_map(|p| p.get(PAGE_PARAMETER).and_then(|v| v.parse().ok()))
            .collect()
    }

    fn page(&self, page: usize) -> Vec<T> {
        let start = page.saturating_mul(self.page_size);
        if start >= self.items.len() {
            return Vec::new();
        }
        let end = (start + self.page_size).min(self.items.len());
        self.items[start..end].to_vec()
    }

    fn record(&self, parameters: &Parameters) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(parameters.clone());
        }
    }
}

#[async_trait]
impl<T: Model> Api<T> for MemoryApi<T> {
    async fn fetch_rows(&self, url: &str, parameters: &Parameters) -> Result<Vec<T>> {
        self.record(parameters);

        let raw = parameters
            .get(PAGE_PARAMETER)
            .ok_or_else(|| FeedError::InvalidPage(format!("no page parameter for {}", url)))?;
        let page: usize = raw
            .parse()
            .map_err(|_| FeedError::InvalidPage(raw.clone()))?;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.hang_from_page.is_some_and(|from| page >= from) {
            tracing::debug!("Holding request for page {} of {} forever", page, url);
            futures::future::pending::<()>().await;
        }

        if self.failing_pages.contains(&page) {
            return Err(FeedError::Unavailable(format!("{} page {}", url, page)));
        }

        Ok(self.page(page))
    }
}
