//! Paginated feed state.
//!
//! [`FeedController`] owns the rows of one remote collection and decides
//! when to load the first page, append the next one or replace everything
//! on refresh. At most one request is in flight at any time.
//!
//! ```rust,ignore
//! use feedlist::feed::{FeedController, FeedSource, FetchOptions};
//!
//! let feed = FeedController::new(api, FeedSource::new("https://example.com/animals"));
//! feed.fetch(FetchOptions::default()).await;
//!
//! // For every row the list draws
//! feed.row_did_appear(&row, true).await;
//! ```

mod controller;
mod source;

pub use controller::{FeedController, FetchOptions, FetchOutcome};
pub use source::FeedSource;
