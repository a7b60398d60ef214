pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DemoConfig;
use crate::view::ListStyle;

#[derive(Parser)]
#[command(name = "feedlist")]
#[command(about = "Drive a paginated feed from the terminal", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.config/feedlist/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scroll through an in-memory feed, printing every frame
    Demo(DemoArgs),
    /// Show the configuration in use
    Config,
}

/// Overrides for the `[demo]` configuration section.
#[derive(Args, Debug, Default)]
pub struct DemoArgs {
    /// Number of rows served
    #[arg(long)]
    pub items: Option<usize>,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Simulated latency per request in milliseconds
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Number of rows visible at once
    #[arg(long)]
    pub viewport: Option<usize>,

    /// List decoration
    #[arg(long, value_enum)]
    pub style: Option<ListStyle>,

    /// Make requests for this page fail (repeatable)
    #[arg(long = "fail-page")]
    pub fail_pages: Vec<usize>,

    /// Pull to refresh once the end is reached
    #[arg(long)]
    pub refresh: bool,
}

impl DemoArgs {
    /// The configured demo settings with command-line overrides applied.
    pub fn settings(&self, config: &DemoConfig) -> DemoConfig {
        DemoConfig {
            items: self.items.unwrap_or(config.items),
            page_size: self.page_size.unwrap_or(config.page_size),
            latency_ms: self.latency_ms.unwrap_or(config.latency_ms),
            viewport: self.viewport.unwrap_or(config.viewport),
            style: self.style.unwrap_or(config.style),
        }
    }
}
