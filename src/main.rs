use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pricewatch::app;
use pricewatch::config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Zalando.nl price monitor Telegram bot")]
struct Args {
    /// Seconds between two full check cycles
    #[arg(long)]
    check_interval: Option<u64>,

    /// Seconds to wait before the first cycle
    #[arg(long)]
    initial_delay: Option<u64>,

    /// Lower bound of the per-product random delay, in seconds
    #[arg(long)]
    random_delay_min: Option<u64>,

    /// Upper bound of the per-product random delay, in seconds
    #[arg(long)]
    random_delay_max: Option<u64>,

    /// Path to the products data file
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Verbose logging (same as DEBUG_MODE=true)
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = Config::from_env()?;

    // CLI args take priority over the environment
    if let Some(secs) = args.check_interval {
        config.check_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = args.initial_delay {
        config.initial_delay = Duration::from_secs(secs);
    }
    if let Some(secs) = args.random_delay_min {
        config.random_delay_min = Duration::from_secs(secs);
    }
    if let Some(secs) = args.random_delay_max {
        config.random_delay_max = Duration::from_secs(secs);
    }
    if let Some(path) = args.data_file {
        config.data_file = path;
    }
    if args.debug {
        config.debug_mode = true;
    }
    config.validate()?;

    let default_filter = if config.debug_mode {
        "pricewatch=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    app::run(config).await
}
