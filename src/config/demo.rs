//! Settings for the `feedlist demo` command.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::view::ListStyle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of rows served by the in-memory API (default: 25)
    pub items: usize,

    /// Rows per page (default: 9)
    pub page_size: usize,

    /// Simulated latency per request in milliseconds (default: 150)
    pub latency_ms: u64,

    /// Number of rows visible at once (default: 5)
    pub viewport: usize,

    /// List decoration (default: plain)
    pub style: ListStyle,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            items: 25,
            page_size: 9,
            latency_ms: 150,
            viewport: 5,
            style: ListStyle::Plain,
        }
    }
}

impl DemoConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}
