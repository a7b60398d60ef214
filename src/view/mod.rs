//! Text rendering of a feed.
//!
//! [`FeedList`] is the presentation side of a [`FeedController`]: it keeps a
//! viewport over the rows, draws the visible ones and tells the controller
//! about every row it draws so the next page loads on time.

use std::ops::Range;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::Model;
use crate::feed::{FeedController, FetchOptions, FetchOutcome};
use crate::fetcher::Api;

/// How rows are decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    #[default]
    Plain,
    Inset,
    Grouped,
    #[value(name = "inset_grouped")]
    InsetGrouped,
}

impl ListStyle {
    fn indent(self) -> &'static str {
        match self {
            ListStyle::Plain | ListStyle::Grouped => "",
            ListStyle::Inset | ListStyle::InsetGrouped => "  ",
        }
    }

    fn is_grouped(self) -> bool {
        matches!(self, ListStyle::Grouped | ListStyle::InsetGrouped)
    }
}

const GROUP_RULE: &str = "────────────────────";

pub struct FeedList<'a, T: Model, A: Api<T>> {
    feed: &'a FeedController<T, A>,
    height: usize,
    offset: usize,
    style: ListStyle,
    refreshable: bool,
    animated: bool,
    start_at_id: Option<T::Id>,
    loading_text: String,
    no_data_text: String,
    did_load: bool,
}

impl<'a, T: Model, A: Api<T>> FeedList<'a, T, A> {
    pub fn new(feed: &'a FeedController<T, A>, height: usize) -> Self {
        Self {
            feed,
            height: height.max(1),
            offset: 0,
            style: ListStyle::Plain,
            refreshable: true,
            animated: true,
            start_at_id: None,
            loading_text: "Loading...".to_string(),
            no_data_text: "Nothing here yet".to_string(),
            did_load: false,
        }
    }

    pub fn style(mut self, style: ListStyle) -> Self {
        self.style = style;
        self
    }

    pub fn refreshable(mut self, refreshable: bool) -> Self {
        self.refreshable = refreshable;
        self
    }

    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    /// Scroll to the row with `id` once the first page is in.
    pub fn start_at(mut self, id: T::Id) -> Self {
        self.start_at_id = Some(id);
        self
    }

    pub fn loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = text.into();
        self
    }

    pub fn no_data_text(mut self, text: impl Into<String>) -> Self {
        self.no_data_text = text.into();
        self
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Loads the first page. Only the first call does anything.
    pub async fn mount(&mut self) -> FetchOutcome {
        if self.did_load {
            return FetchOutcome::Skipped;
        }
        self.did_load = true;

        let outcome = self
            .feed
            .fetch(FetchOptions::default().animated(self.animated))
            .await;

        if let Some(id) = &self.start_at_id {
            let position = self.feed.state().rows.iter().position(|row| row.id() == id);
            match position {
                Some(position) => self.offset = position.min(self.max_offset()),
                None => tracing::debug!("Start row {:?} not in the first page", id),
            }
        }

        outcome
    }

    /// Rows currently inside the viewport.
    pub fn visible_range(&self) -> Range<usize> {
        let len = self.feed.state().rows.len();
        let start = self.offset.min(len);
        start..(start + self.height).min(len)
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let target = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta as usize)
        };
        self.offset = target.min(self.max_offset());
    }

    /// Whether the viewport shows the last row.
    pub fn at_end(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Draws the current frame, one line per entry, and reports every drawn
    /// row to the controller.
    pub async fn render<F: Fn(&T) -> String>(&mut self, format: F) -> Vec<String> {
        let (is_loading, visible) = {
            let state = self.feed.state();
            let len = state.rows.len();
            let start = self.offset.min(len);
            let end = (start + self.height).min(len);
            (state.is_loading, state.rows[start..end].to_vec())
        };

        if is_loading {
            return vec![self.loading_text.clone()];
        }
        if visible.is_empty() {
            return vec![self.no_data_text.clone()];
        }

        let indent = self.style.indent();
        let grouped = self.style.is_grouped();
        let mut lines = Vec::with_capacity(visible.len() + 2);

        if grouped {
            lines.push(format!("{}┌{}", indent, GROUP_RULE));
        }
        for row in &visible {
            if grouped {
                lines.push(format!("{}│ {}", indent, format(row)));
            } else {
                lines.push(format!("{}{}", indent, format(row)));
            }
        }
        if grouped {
            lines.push(format!("{}└{}", indent, GROUP_RULE));
        }

        for row in &visible {
            self.feed.row_did_appear(row, self.animated).await;
        }

        lines
    }

    /// Pull-to-refresh gesture.
    pub async fn pull_to_refresh(&mut self) -> FetchOutcome {
        if !self.refreshable {
            return FetchOutcome::Skipped;
        }
        let outcome = self.feed.refresh(self.animated).await;
        self.offset = 0;
        outcome
    }

    /// Swipe-to-delete gesture; `offsets` index into the feed rows.
    pub fn delete(&mut self, offsets: &[usize]) -> usize {
        let removed = self.feed.remove_rows(offsets);
        self.offset = self.offset.min(self.max_offset());
        removed
    }

    fn max_offset(&self) -> usize {
        self.feed.state().rows.len().saturating_sub(self.height)
    }
}
