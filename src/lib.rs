//! # feedlist
//!
//! State and pagination for infinite feed lists.
//!
//! ## Architecture
//!
//! ```text
//! List view → FeedController → Api → FeedController → List view
//! ```
//!
//! The list tells the controller which rows it draws; the controller decides
//! when to load the first page, append the next one or replace everything on
//! refresh, and publishes its state for the list to redraw from.
//!
//! ## Quick Start
//!
//! ```bash
//! # Scroll through an in-memory feed
//! feedlist demo --items 40 --page-size 9
//!
//! # Show the configuration in use
//! feedlist config
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration
//! - [`domain`]: Row identity and feed state
//! - [`feed`]: The feed controller
//! - [`fetcher`]: The fetch capability and its adapters
//! - [`view`]: Text list rendering

/// Application context and error handling.
pub mod app;

/// Command-line interface using clap.
///
/// - `demo` - Scroll through an in-memory feed
/// - `config` - Print the configuration in use
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/feedlist/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Model`](domain::Model): Rows identified by a stable id
/// - [`FeedState`](domain::FeedState): Rows, page cursor and busy flags
pub mod domain;

/// Paginated feed controller.
///
/// - [`FeedController`](feed::FeedController): fetch, fetch more, refresh
/// - [`FeedSource`](feed::FeedSource): URL and parameters of a feed
pub mod feed;

/// Fetching pages of rows.
///
/// - [`Api`](fetcher::Api): Async trait for page fetching
/// - [`CallbackApi`](fetcher::CallbackApi): Callback-style fetching, bridged by [`Callbacks`](fetcher::Callbacks)
/// - [`MemoryApi`](fetcher::MemoryApi): In-memory pages
pub mod fetcher;

/// Text list rendering on top of a feed controller.
pub mod view;
