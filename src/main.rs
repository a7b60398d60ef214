use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedlist::app::AppContext;
use feedlist::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(cli.config)?;

    match cli.command {
        Commands::Demo(args) => {
            commands::run_demo(&ctx, &args).await?;
        }
        Commands::Config => {
            commands::show_config(&ctx)?;
        }
    }

    Ok(())
}
