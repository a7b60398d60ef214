use std::ops::Range;

use crate::app::{AppContext, FeedError, Result};
use crate::cli::DemoArgs;
use crate::config::DemoConfig;
use crate::domain::Model;
use crate::feed::{FeedController, FeedSource, FetchOutcome};
use crate::fetcher::{Api, MemoryApi};
use crate::view::FeedList;

const DEMO_URL: &str = "memory://animals";

const ANIMALS: [&str; 9] = [
    "Lion",
    "Dog",
    "Chicken",
    "Giraffe",
    "Cow",
    "Cat",
    "Bird",
    "Ape",
    "Crocodile",
];

#[derive(Debug, Clone)]
pub struct Animal {
    pub id: String,
    pub name: String,
}

impl Model for Animal {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

pub fn demo_rows(count: usize) -> Vec<Animal> {
    (1..=count)
        .map(|i| Animal {
            id: i.to_string(),
            name: format!("{} #{}", ANIMALS[(i - 1) % ANIMALS.len()], i),
        })
        .collect()
}

/// One rendered screen.
#[derive(Debug, Clone)]
pub struct Frame {
    pub range: Range<usize>,
    pub total: usize,
    pub page: usize,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DemoReport {
    pub frames: Vec<Frame>,
    pub rows: usize,
    pub page: usize,
    pub refreshed: Option<FetchOutcome>,
}

/// Mounts a list over `feed` and scrolls it one screen at a time until the
/// last row is visible and no more rows arrive.
pub async fn play<A: Api<Animal>>(
    feed: &FeedController<Animal, A>,
    settings: &DemoConfig,
    animated: bool,
    refresh: bool,
) -> DemoReport {
    let mut list = FeedList::new(feed, settings.viewport)
        .style(settings.style)
        .animated(animated)
        .loading_text("Loading...")
        .no_data_text("No animals found!");

    let mut frames = vec![capture(&mut list, feed).await];
    list.mount().await;

    loop {
        frames.push(capture(&mut list, feed).await);
        if list.at_end() {
            break;
        }
        let step = list.height() as isize;
        list.scroll_by(step);
    }

    let refreshed = if refresh {
        let outcome = list.pull_to_refresh().await;
        frames.push(capture(&mut list, feed).await);
        Some(outcome)
    } else {
        None
    };

    let (rows, page) = tally(feed);
    DemoReport {
        frames,
        rows,
        page,
        refreshed,
    }
}

async fn capture<A: Api<Animal>>(
    list: &mut FeedList<'_, Animal, A>,
    feed: &FeedController<Animal, A>,
) -> Frame {
    let range = list.visible_range();
    let lines = list.render(|animal| animal.name.clone()).await;
    let (total, page) = tally(feed);
    Frame {
        range,
        total,
        page,
        lines,
    }
}

/// Row count and page, read under a single borrow.
fn tally<A: Api<Animal>>(feed: &FeedController<Animal, A>) -> (usize, usize) {
    let state = feed.state();
    (state.rows.len(), state.page)
}

pub async fn run_demo(ctx: &AppContext, args: &DemoArgs) -> Result<()> {
    let settings = args.settings(&ctx.config.demo);

    let mut api = MemoryApi::new(demo_rows(settings.items), settings.page_size)
        .with_latency(settings.latency());
    for &page in &args.fail_pages {
        api = api.failing_page(page);
    }

    let feed = FeedController::with_config(api, FeedSource::new(DEMO_URL), &ctx.config.feed);
    let report = play(&feed, &settings, ctx.config.feed.animated, args.refresh).await;

    for (i, frame) in report.frames.iter().enumerate() {
        if frame.range.is_empty() {
            println!("── frame {} · page {}", i + 1, frame.page);
        } else {
            println!(
                "── frame {} · rows {}-{} of {} · page {}",
                i + 1,
                frame.range.start + 1,
                frame.range.end,
                frame.total,
                frame.page
            );
        }
        for line in &frame.lines {
            println!("{}", line);
        }
        println!();
    }

    if let Some(outcome) = report.refreshed {
        println!("Refresh: {:?}", outcome);
    }
    println!(
        "Done: {} rows loaded, last page requested {}",
        report.rows, report.page
    );
    Ok(())
}

pub fn show_config(ctx: &AppContext) -> Result<()> {
    let rendered =
        toml::to_string_pretty(&ctx.config).map_err(|e| FeedError::Other(e.to_string()))?;

    println!("# {}", ctx.config_path.display());
    print!("{}", rendered);
    Ok(())
}
