use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::{FeedConfig, DEFAULT_LOAD_MORE_THRESHOLD};
use crate::domain::{ArrayMutation, FeedState, Model};
use crate::feed::FeedSource;
use crate::fetcher::{paging, Api};

/// Options for [`FeedController::fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub animated: bool,
    pub mutation: ArrayMutation,
    /// Go back to page 0 before fetching.
    pub reset_page: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            animated: true,
            mutation: ArrayMutation::Append,
            reset_page: false,
        }
    }
}

impl FetchOptions {
    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    pub fn mutation(mut self, mutation: ArrayMutation) -> Self {
        self.mutation = mutation;
        self
    }

    pub fn reset_page(mut self, reset_page: bool) -> Self {
        self.reset_page = reset_page;
        self
    }
}

/// What a fetch operation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Another request was in flight, or the row did not trigger a load.
    Skipped,
    /// The API answered with `received` rows.
    Fetched { received: usize },
    /// The API answered with an error; rows were left untouched.
    Unavailable,
}

/// Owns the rows of a paginated feed and the flags describing what it is
/// currently doing.
///
/// State lives in a [`watch`] channel: every change notifies receivers
/// obtained from [`FeedController::subscribe`]. Guard checks and the flag
/// changes that follow them happen in a single transition, so two callers
/// can never both start a request.
pub struct FeedController<T: Model, A: Api<T>> {
    api: A,
    source: FeedSource,
    load_more_threshold: usize,
    state: watch::Sender<FeedState<T>>,
}

impl<T: Model, A: Api<T>> FeedController<T, A> {
    pub fn new(api: A, source: FeedSource) -> Self {
        Self {
            api,
            source,
            load_more_threshold: DEFAULT_LOAD_MORE_THRESHOLD,
            state: watch::Sender::new(FeedState::new()),
        }
    }

    pub fn with_config(api: A, source: FeedSource, config: &FeedConfig) -> Self {
        let mut controller = Self::new(api, source);
        controller.load_more_threshold = config.load_more_threshold;
        controller
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn source(&self) -> &FeedSource {
        &self.source
    }

    pub fn load_more_threshold(&self) -> usize {
        self.load_more_threshold
    }

    /// Borrow the current state. Do not hold the guard across an `.await`.
    pub fn state(&self) -> watch::Ref<'_, FeedState<T>> {
        self.state.borrow()
    }

    pub fn snapshot(&self) -> FeedState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<T>> {
        self.state.subscribe()
    }

    pub fn rows(&self) -> Vec<T> {
        self.state.borrow().rows.clone()
    }

    pub fn page(&self) -> usize {
        self.state.borrow().page
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn is_fetching(&self) -> bool {
        self.state.borrow().is_fetching
    }

    pub fn is_fetching_more(&self) -> bool {
        self.state.borrow().is_fetching_more
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.borrow().is_refreshing
    }

    /// Fetches the current page and merges it into the rows.
    pub async fn fetch(&self, options: FetchOptions) -> FetchOutcome {
        self.fetch_with(options, || {}).await
    }

    /// Like [`FeedController::fetch`]; `on_done` runs once the result has
    /// been applied, before `is_fetching` is cleared.
    pub async fn fetch_with<F: FnOnce()>(&self, options: FetchOptions, on_done: F) -> FetchOutcome {
        let started = self.state.send_if_modified(|state| {
            if state.is_fetching {
                return false;
            }
            if options.reset_page {
                state.page = 0;
            }
            state.is_fetching = true;
            state.animated = options.animated;
            true
        });

        if !started {
            debug!("Fetch of {} skipped, a request is in flight", self.source.url);
            return FetchOutcome::Skipped;
        }

        self.run_fetch(options.mutation, options.animated, on_done)
            .await
    }

    /// Loads the next page and appends it.
    pub async fn fetch_more(&self, animated: bool) -> FetchOutcome {
        self.fetch_more_with(animated, || {}).await
    }

    pub async fn fetch_more_with<F: FnOnce()>(&self, animated: bool, on_done: F) -> FetchOutcome {
        let started = self.state.send_if_modified(|state| {
            if state.is_fetching || state.is_fetching_more {
                return false;
            }
            // The request below must see the next page
            state.page += 1;
            state.is_fetching_more = true;
            state.is_fetching = true;
            state.animated = animated;
            true
        });

        if !started {
            debug!("Fetch more of {} skipped, a request is in flight", self.source.url);
            return FetchOutcome::Skipped;
        }

        self.run_fetch(ArrayMutation::Append, animated, || {
            on_done();
            self.state.send_modify(|state| {
                state.is_fetching_more = false;
                state.animated = animated;
            });
        })
        .await
    }

    /// Reloads page 0 and replaces all rows with it.
    pub async fn refresh(&self, animated: bool) -> FetchOutcome {
        self.refresh_with(animated, || {}).await
    }

    pub async fn refresh_with<F: FnOnce()>(&self, animated: bool, on_done: F) -> FetchOutcome {
        let started = self.state.send_if_modified(|state| {
            if state.is_fetching {
                return false;
            }
            state.is_refreshing = true;
            state.page = 0;
            state.is_fetching = true;
            state.animated = animated;
            true
        });

        if !started {
            debug!("Refresh of {} skipped, a request is in flight", self.source.url);
            return FetchOutcome::Skipped;
        }

        self.run_fetch(ArrayMutation::Replace, animated, || {
            on_done();
            self.state.send_modify(|state| {
                state.is_refreshing = false;
                state.animated = animated;
            });
        })
        .await
    }

    /// Must be called whenever a row is drawn. Loads the next page once the
    /// row `load_more_threshold` positions before the end shows up.
    ///
    /// Rows that are not in the feed count as position 0.
    pub async fn row_did_appear(&self, row: &T, animated: bool) -> FetchOutcome {
        let should_load = {
            let state = self.state.borrow();
            state.is_idle()
                && state.rows.len().checked_sub(self.load_more_threshold)
                    == Some(state.visible_index(row))
        };

        if !should_load {
            return FetchOutcome::Skipped;
        }

        debug!("Row {:?} reached the load-more threshold", row.id());
        self.fetch_more(animated).await
    }

    /// Removes the rows at `offsets`, ignoring offsets past the end.
    /// Returns how many rows were removed.
    pub fn remove_rows(&self, offsets: &[usize]) -> usize {
        let mut offsets = offsets.to_vec();
        offsets.sort_unstable();
        offsets.dedup();

        let mut removed = 0;
        self.state.send_if_modified(|state| {
            for &offset in offsets.iter().rev() {
                if offset < state.rows.len() {
                    state.rows.remove(offset);
                    removed += 1;
                }
            }
            removed > 0
        });
        removed
    }

    /// Edits a copy of the row with `id` and writes it back. `edit` runs
    /// without the state lock held, so it may read the controller.
    ///
    /// Returns false when no row has that id, or when `edit` changed the id.
    pub fn update_row<F: FnOnce(&mut T)>(&self, id: &T::Id, edit: F) -> bool {
        let Some(mut edited) = self
            .state
            .borrow()
            .rows
            .iter()
            .find(|row| row.id() == id)
            .cloned()
        else {
            return false;
        };

        edit(&mut edited);
        if edited.id() != id {
            warn!("Edit of row {:?} changed its id to {:?}, discarded", id, edited.id());
            return false;
        }

        // The row may have been removed while `edit` ran
        self.state.send_if_modified(|state| {
            match state.rows.iter_mut().find(|row| row.id() == id) {
                Some(row) => {
                    *row = edited;
                    true
                }
                None => false,
            }
        })
    }

    async fn run_fetch<F: FnOnce()>(
        &self,
        mutation: ArrayMutation,
        animated: bool,
        on_done: F,
    ) -> FetchOutcome {
        let page = self.state.borrow().page;
        let parameters = paging(&self.source.parameters, page);
        debug!("Fetching page {} of {}", page, self.source.url);

        let outcome = match self.api.fetch_rows(&self.source.url, &parameters).await {
            Ok(rows) => {
                let received = rows.len();
                let mut added = 0;
                self.state.send_modify(|state| {
                    added = state.apply(mutation, rows);
                    state.animated = animated;
                });
                info!(
                    "Page {} of {}: {} rows received, {} applied ({:?})",
                    page, self.source.url, received, added, mutation
                );
                FetchOutcome::Fetched { received }
            }
            Err(e) => {
                warn!("Page {} of {} unavailable: {}", page, self.source.url, e);
                FetchOutcome::Unavailable
            }
        };

        on_done();

        self.state.send_modify(|state| {
            state.is_fetching = false;
            state.is_loading = false;
            state.animated = animated;
            state.last_fetched_at = Some(Utc::now());
        });

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Result;
    use crate::fetcher::{Callbacks, CallbackApi, MemoryApi, Parameters, RowsCallback};
    use async_trait::async_trait;
    use std::cell::Cell;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::assert_pending;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        id: u32,
        title: String,
    }

    impl Model for Entry {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    fn entry(id: u32) -> Entry {
        Entry {
            id,
            title: format!("Entry {}", id),
        }
    }

    fn entries(n: u32) -> Vec<Entry> {
        (1..=n).map(entry).collect()
    }

    fn ids(rows: &[Entry]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    type MemoryFeed = FeedController<Entry, Arc<MemoryApi<Entry>>>;

    fn memory_feed(api: MemoryApi<Entry>) -> (Arc<MemoryApi<Entry>>, MemoryFeed) {
        let api = Arc::new(api);
        let controller = FeedController::new(api.clone(), FeedSource::new("https://example.com/entries"));
        (api, controller)
    }

    /// Page `n` holds ids `3n + 1 ..= 3n + 5`, so neighbouring pages overlap.
    struct OverlappingApi;

    #[async_trait]
    impl Api<Entry> for OverlappingApi {
        async fn fetch_rows(&self, _url: &str, parameters: &Parameters) -> Result<Vec<Entry>> {
            let page: u32 = parameters["page"].parse().unwrap();
            Ok((3 * page + 1..=3 * page + 5).map(entry).collect())
        }
    }

    #[test]
    fn test_initial_state() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(3), 3));
        let state = feed.snapshot();
        assert!(state.rows.is_empty());
        assert_eq!(state.page, 0);
        assert!(state.is_loading);
        assert!(!state.is_fetching);
        assert!(!state.is_fetching_more);
        assert!(!state.is_refreshing);
        assert_eq!(feed.load_more_threshold(), 2);
    }

    #[test]
    fn test_with_config_threshold() {
        let config = FeedConfig {
            load_more_threshold: 5,
            ..Default::default()
        };
        let feed = FeedController::with_config(
            MemoryApi::new(entries(3), 3),
            FeedSource::new("mem"),
            &config,
        );
        assert_eq!(feed.load_more_threshold(), 5);
    }

    #[tokio::test]
    async fn test_first_page_then_empty_next_page() {
        let (api, feed) = memory_feed(MemoryApi::new(entries(9), 9));

        let outcome = feed.fetch(FetchOptions::default()).await;
        assert_eq!(outcome, FetchOutcome::Fetched { received: 9 });
        assert_eq!(feed.rows().len(), 9);
        assert!(!feed.is_loading());
        assert!(!feed.is_fetching());

        let rows = feed.rows();
        let outcome = feed.row_did_appear(&rows[7], true).await;

        assert_eq!(outcome, FetchOutcome::Fetched { received: 0 });
        assert_eq!(feed.page(), 1);
        assert_eq!(feed.rows().len(), 9);
        assert!(!feed.is_fetching_more());
        assert!(!feed.is_fetching());
        assert_eq!(api.requested_pages(), vec![0, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_hit_api_once() {
        let (api, feed) =
            memory_feed(MemoryApi::new(entries(9), 9).with_latency(Duration::from_millis(50)));

        let (first, second) = tokio::join!(
            feed.fetch(FetchOptions::default()),
            feed.fetch(FetchOptions::default())
        );

        assert_eq!(first, FetchOutcome::Fetched { received: 9 });
        assert_eq!(second, FetchOutcome::Skipped);
        assert_eq!(api.call_count(), 1);
        assert_eq!(feed.rows().len(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_while_fetching_is_noop() {
        let (api, feed) =
            memory_feed(MemoryApi::new(entries(9), 9).with_latency(Duration::from_millis(50)));

        let (fetched, refreshed) = tokio::join!(
            feed.fetch(FetchOptions::default()),
            feed.refresh(true)
        );

        assert_eq!(fetched, FetchOutcome::Fetched { received: 9 });
        assert_eq!(refreshed, FetchOutcome::Skipped);
        assert!(!feed.is_refreshing());
        assert_eq!(api.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_more_while_fetching_keeps_page() {
        let (api, feed) =
            memory_feed(MemoryApi::new(entries(20), 9).with_latency(Duration::from_millis(50)));

        let (_, more) = tokio::join!(feed.fetch(FetchOptions::default()), feed.fetch_more(true));

        assert_eq!(more, FetchOutcome::Skipped);
        assert_eq!(feed.page(), 0);
        assert_eq!(api.requested_pages(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_more_while_fetching_more_keeps_page() {
        let (api, feed) =
            memory_feed(MemoryApi::new(entries(30), 9).with_latency(Duration::from_millis(50)));
        feed.fetch(FetchOptions::default()).await;

        let (first, second) = tokio::join!(feed.fetch_more(true), feed.fetch_more(true));

        assert_eq!(first, FetchOutcome::Fetched { received: 9 });
        assert_eq!(second, FetchOutcome::Skipped);
        assert_eq!(feed.page(), 1);
        assert_eq!(feed.rows().len(), 18);
        assert_eq!(api.requested_pages(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_fetch_more_requests_incremented_page() {
        let api = Arc::new(MemoryApi::new(entries(20), 9));
        let source = FeedSource::new("https://example.com/entries")
            .with_parameter("sort", "new")
            .with_parameter("page", "7");
        let feed = FeedController::new(api.clone(), source);

        feed.fetch(FetchOptions::default()).await;
        feed.fetch_more(false).await;

        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0]["page"], "0");
        assert_eq!(calls[1]["page"], "1");
        assert_eq!(calls[1]["sort"], "new");
        assert_eq!(ids(&feed.rows()), (1..=18).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_refresh_resets_page_and_replaces_rows() {
        let (api, feed) = memory_feed(MemoryApi::new(entries(20), 9));
        feed.fetch(FetchOptions::default()).await;
        feed.fetch_more(true).await;
        assert_eq!(feed.page(), 1);
        assert_eq!(feed.rows().len(), 18);

        let outcome = feed.refresh(true).await;

        assert_eq!(outcome, FetchOutcome::Fetched { received: 9 });
        assert_eq!(feed.page(), 0);
        assert_eq!(ids(&feed.rows()), (1..=9).collect::<Vec<_>>());
        assert!(!feed.is_refreshing());
        assert_eq!(api.requested_pages(), vec![0, 1, 0]);
    }

    #[tokio::test]
    async fn test_reset_page_fetch() {
        let (api, feed) = memory_feed(MemoryApi::new(entries(20), 9));
        feed.fetch(FetchOptions::default()).await;
        feed.fetch_more(true).await;

        feed.fetch(FetchOptions::default().reset_page(true)).await;

        assert_eq!(feed.page(), 0);
        // Page 0 is already present, nothing is added twice
        assert_eq!(feed.rows().len(), 18);
        assert_eq!(api.requested_pages(), vec![0, 1, 0]);
    }

    #[tokio::test]
    async fn test_loading_latch_flips_once() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(20), 9));
        let mut rx = feed.subscribe();
        let initial = rx.borrow_and_update().is_loading;
        let watcher = tokio::spawn(async move {
            let mut history = vec![initial];
            while rx.changed().await.is_ok() {
                let loading = rx.borrow_and_update().is_loading;
                if history.last() != Some(&loading) {
                    history.push(loading);
                }
            }
            history
        });

        feed.refresh(true).await;
        feed.fetch_more(true).await;
        feed.fetch(FetchOptions::default()).await;
        feed.refresh(false).await;
        drop(feed);

        assert_eq!(watcher.await.unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_failed_first_fetch_still_finishes_loading() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(9), 9).failing_page(0));
        let done = Cell::new(false);

        let outcome = feed
            .fetch_with(FetchOptions::default(), || done.set(true))
            .await;

        assert_eq!(outcome, FetchOutcome::Unavailable);
        assert!(done.get());
        assert!(feed.rows().is_empty());
        assert!(!feed.is_loading());
        assert!(!feed.is_fetching());
        assert!(feed.state().last_fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_fetch_more_keeps_rows() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(20), 9).failing_page(1));
        feed.fetch(FetchOptions::default()).await;

        let outcome = feed.fetch_more(true).await;

        assert_eq!(outcome, FetchOutcome::Unavailable);
        assert_eq!(ids(&feed.rows()), (1..=9).collect::<Vec<_>>());
        assert!(!feed.is_fetching_more());
        assert!(!feed.is_fetching());
        // The cursor is not rolled back
        assert_eq!(feed.page(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_rows() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(9), 9).failing_page(0));
        feed.state.send_modify(|state| {
            state.rows = entries(9);
            state.page = 3;
            state.is_loading = false;
        });

        assert_eq!(feed.refresh(true).await, FetchOutcome::Unavailable);
        assert_eq!(feed.rows().len(), 9);
        assert_eq!(feed.page(), 0);
        assert!(!feed.is_refreshing());
        assert!(!feed.is_fetching());
    }

    #[tokio::test]
    async fn test_empty_replace_clears_rows() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(9), 9));
        feed.fetch(FetchOptions::default()).await;
        feed.fetch_more(true).await;

        let outcome = feed
            .fetch(FetchOptions::default().mutation(ArrayMutation::Replace))
            .await;

        assert_eq!(outcome, FetchOutcome::Fetched { received: 0 });
        assert!(feed.rows().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_pages_stay_unique_and_ordered() {
        let feed = FeedController::new(OverlappingApi, FeedSource::new("overlap"));

        feed.fetch(FetchOptions::default()).await;
        assert_eq!(ids(&feed.rows()), vec![1, 2, 3, 4, 5]);

        feed.fetch_more(true).await;
        feed.fetch_more(true).await;

        assert_eq!(ids(&feed.rows()), (1..=11).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_on_done_runs_before_flags_clear() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(20), 9));
        let seen = Cell::new((false, false, false));

        feed.fetch_with(FetchOptions::default(), || {
            let state = feed.state();
            seen.set((state.is_fetching, state.is_loading, state.rows.len() == 9));
        })
        .await;
        assert_eq!(seen.get(), (true, true, true));

        feed.fetch_more_with(true, || {
            let state = feed.state();
            seen.set((state.is_fetching, state.is_fetching_more, state.rows.len() == 18));
        })
        .await;
        assert_eq!(seen.get(), (true, true, true));
        assert!(!feed.is_fetching_more());

        feed.refresh_with(true, || {
            let state = feed.state();
            seen.set((state.is_fetching, state.is_refreshing, state.page == 0));
        })
        .await;
        assert_eq!(seen.get(), (true, true, true));
        assert!(!feed.is_refreshing());
    }

    #[tokio::test]
    async fn test_skipped_operations_do_not_call_on_done() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(9), 9));
        feed.state.send_modify(|state| state.is_fetching = true);
        let called = Cell::new(0);

        feed.fetch_with(FetchOptions::default(), || called.set(called.get() + 1))
            .await;
        feed.fetch_more_with(true, || called.set(called.get() + 1)).await;
        feed.refresh_with(true, || called.set(called.get() + 1)).await;

        assert_eq!(called.get(), 0);
        assert_eq!(feed.page(), 0);
    }

    #[tokio::test]
    async fn test_row_did_appear_only_at_threshold() {
        let (api, feed) = memory_feed(MemoryApi::new(entries(20), 9));
        feed.fetch(FetchOptions::default()).await;
        let rows = feed.rows();

        for index in [0, 6, 8] {
            assert_eq!(feed.row_did_appear(&rows[index], true).await, FetchOutcome::Skipped);
        }
        assert_eq!(api.call_count(), 1);

        let outcome = feed.row_did_appear(&rows[7], true).await;
        assert_eq!(outcome, FetchOutcome::Fetched { received: 9 });
        assert_eq!(api.requested_pages(), vec![0, 1]);

        // Row 7 is no longer near the end
        assert_eq!(feed.row_did_appear(&rows[7], true).await, FetchOutcome::Skipped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_row_did_appear_triggers_exactly_once() {
        let (api, feed) =
            memory_feed(MemoryApi::new(entries(20), 9).with_latency(Duration::from_millis(10)));
        feed.fetch(FetchOptions::default()).await;
        let row = feed.rows()[7].clone();

        let (a, b, c) = tokio::join!(
            feed.row_did_appear(&row, true),
            feed.row_did_appear(&row, true),
            feed.row_did_appear(&row, true)
        );

        let fetched = [a, b, c]
            .iter()
            .filter(|o| matches!(o, FetchOutcome::Fetched { .. }))
            .count();
        assert_eq!(fetched, 1);
        assert_eq!(api.requested_pages(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_row_did_appear_ignored_while_loading() {
        let (api, feed) = memory_feed(MemoryApi::new(entries(20), 9));
        // Two rows present but the first load never completed
        feed.state.send_modify(|state| state.rows = entries(2));

        assert_eq!(feed.row_did_appear(&entry(1), true).await, FetchOutcome::Skipped);
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_row_did_appear_ignored_while_refreshing() {
        let (api, feed) = memory_feed(MemoryApi::new(entries(20), 9));
        feed.fetch(FetchOptions::default()).await;
        let row = feed.rows()[7].clone();

        feed.refresh_with(true, || {
            // Still fetching here
            let fut = feed.row_did_appear(&row, true);
            let mut task = tokio_test::task::spawn(fut);
            assert!(matches!(
                task.poll(),
                std::task::Poll::Ready(FetchOutcome::Skipped)
            ));
        })
        .await;

        assert_eq!(api.requested_pages(), vec![0, 0]);
    }

    #[tokio::test]
    async fn test_unknown_row_counts_as_first_position() {
        let (api, feed) = memory_feed(MemoryApi::new(entries(4), 2));
        feed.fetch(FetchOptions::default()).await;
        assert_eq!(feed.rows().len(), 2);

        // Not in the feed, looked up as position 0 == 2 - 2
        let outcome = feed.row_did_appear(&entry(99), true).await;

        assert_eq!(outcome, FetchOutcome::Fetched { received: 2 });
        assert_eq!(api.requested_pages(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_short_feed_never_triggers() {
        let (api, feed) = memory_feed(MemoryApi::new(entries(1), 9));
        feed.fetch(FetchOptions::default()).await;

        let outcome = feed.row_did_appear(&entry(1), true).await;

        assert_eq!(outcome, FetchOutcome::Skipped);
        assert_eq!(api.call_count(), 1);
    }

    #[tokio::test]
    async fn test_hung_fetch_more_keeps_flags_set() {
        let (api, feed) = memory_feed(MemoryApi::new(entries(20), 9).hanging_from(1));
        feed.fetch(FetchOptions::default()).await;

        let mut more = tokio_test::task::spawn(feed.fetch_more(true));
        assert_pending!(more.poll());
        assert_pending!(more.poll());

        assert!(feed.is_fetching_more());
        assert!(feed.is_fetching());
        assert_eq!(feed.page(), 1);

        // Nothing else can start while the request hangs
        assert_eq!(feed.fetch(FetchOptions::default()).await, FetchOutcome::Skipped);
        assert_eq!(feed.refresh(true).await, FetchOutcome::Skipped);
        assert_eq!(feed.fetch_more(true).await, FetchOutcome::Skipped);
        assert_eq!(api.requested_pages(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_remove_rows() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(9), 9));
        feed.fetch(FetchOptions::default()).await;
        let mut rx = feed.subscribe();
        rx.borrow_and_update();

        let removed = feed.remove_rows(&[3, 0, 3, 42]);

        assert_eq!(removed, 2);
        assert_eq!(ids(&feed.rows()), vec![2, 3, 5, 6, 7, 8, 9]);
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_remove_nothing_does_not_notify() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(9), 9));
        feed.fetch(FetchOptions::default()).await;
        let mut rx = feed.subscribe();
        rx.borrow_and_update();

        assert_eq!(feed.remove_rows(&[9, 10]), 0);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_update_row() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(9), 9));
        feed.fetch(FetchOptions::default()).await;

        assert!(feed.update_row(&4, |row| row.title = "Edited".into()));
        assert!(!feed.update_row(&40, |row| row.title = "Nope".into()));

        let rows = feed.rows();
        assert_eq!(rows[3].title, "Edited");
        assert_eq!(rows.len(), 9);
    }

    #[tokio::test]
    async fn test_update_row_keeps_id() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(9), 9));
        feed.fetch(FetchOptions::default()).await;

        assert!(!feed.update_row(&4, |row| {
            row.id = 5;
            row.title = "Moved".into();
        }));

        let rows = feed.rows();
        assert_eq!(ids(&rows), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(rows[3].title, "Entry 4");
    }

    #[tokio::test]
    async fn test_update_row_can_read_feed() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(9), 9));
        feed.fetch(FetchOptions::default()).await;

        let updated = feed.update_row(&4, |row| {
            row.title = format!("{} of {} on page {}", row.title, feed.rows().len(), feed.page());
        });

        assert!(updated);
        assert_eq!(feed.rows()[3].title, "Entry 4 of 9 on page 0");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_sets_animated_when_started() {
        let (_, feed) =
            memory_feed(MemoryApi::new(entries(9), 9).with_latency(Duration::from_millis(50)));
        feed.fetch(FetchOptions::default().animated(true)).await;

        let (_, in_flight) = tokio::join!(
            feed.fetch(FetchOptions::default().animated(false)),
            async { feed.state().animated }
        );

        assert!(!in_flight);
    }

    #[tokio::test]
    async fn test_animated_hint_is_forwarded() {
        let (_, feed) = memory_feed(MemoryApi::new(entries(20), 9));

        feed.fetch(FetchOptions::default().animated(false)).await;
        assert!(!feed.state().animated);

        feed.fetch_more(true).await;
        assert!(feed.state().animated);
    }

    struct InstantZoo;

    impl CallbackApi<Entry> for InstantZoo {
        fn fetch_rows_with(&self, _url: &str, parameters: &Parameters, callback: RowsCallback<Entry>) {
            let page: u32 = parameters["page"].parse().unwrap();
            callback(Ok(vec![entry(page * 10 + 1), entry(page * 10 + 2)]));
        }
    }

    #[tokio::test]
    async fn test_controller_over_callback_api() {
        let feed = FeedController::new(Callbacks(InstantZoo), FeedSource::new("zoo"));

        feed.fetch(FetchOptions::default()).await;
        let rows = feed.rows();
        feed.row_did_appear(&rows[0], true).await;

        assert_eq!(ids(&feed.rows()), vec![1, 2, 11, 12]);
        assert_eq!(feed.page(), 1);
    }
}
