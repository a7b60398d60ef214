//! Controller tuning.

use serde::{Deserialize, Serialize};

/// Default distance from the end of the rows at which the next page loads.
pub const DEFAULT_LOAD_MORE_THRESHOLD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// A row this many positions before the end triggers the next page (default: 2)
    pub load_more_threshold: usize,

    /// Whether state changes should be animated by the presentation layer (default: true)
    pub animated: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            load_more_threshold: DEFAULT_LOAD_MORE_THRESHOLD,
            animated: true,
        }
    }
}
