use chrono::{DateTime, Utc};

use crate::domain::Model;

/// How fetched rows are merged into the current rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayMutation {
    /// Discard the current rows and use the fetched ones.
    Replace,
    /// Append fetched rows whose id is not already present.
    #[default]
    Append,
}

/// Everything a presentation layer needs to draw a feed.
#[derive(Debug, Clone)]
pub struct FeedState<T> {
    pub rows: Vec<T>,
    pub page: usize,
    /// True until the first fetch of any kind completes, never again after.
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_fetching_more: bool,
    pub is_refreshing: bool,
    /// Presentation hint of the latest change.
    pub animated: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            page: 0,
            is_loading: true,
            is_fetching: false,
            is_fetching_more: false,
            is_refreshing: false,
            animated: true,
            last_fetched_at: None,
        }
    }
}

impl<T: Model> FeedState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if `rows` contains a row with the same id as `row`.
    pub fn contains(&self, row: &T) -> bool {
        self.rows.iter().any(|r| r.same_item(row))
    }

    /// Position of the row with the same id as `row`.
    pub fn position(&self, row: &T) -> Option<usize> {
        self.rows.iter().position(|r| r.same_item(row))
    }

    /// Position used for the load-more check. Rows that are not present
    /// count as position 0.
    pub fn visible_index(&self, row: &T) -> usize {
        self.position(row).unwrap_or(0)
    }

    /// Merge `fetched` into `rows`, returning how many rows were added.
    pub fn apply(&mut self, mutation: ArrayMutation, fetched: Vec<T>) -> usize {
        match mutation {
            ArrayMutation::Replace => {
                self.rows = fetched;
                self.rows.len()
            }
            ArrayMutation::Append => {
                let before = self.rows.len();
                for row in fetched {
                    if !self.contains(&row) {
                        self.rows.push(row);
                    }
                }
                self.rows.len() - before
            }
        }
    }

    /// Whether none of the busy flags are set and the first load is done.
    pub fn is_idle(&self) -> bool {
        !self.is_fetching_more && !self.is_fetching && !self.is_loading
    }
}
