use clap::Parser;
use std::path::PathBuf;
use stockwatch::api::SinaClient;
use stockwatch::clock::SystemClock;
use stockwatch::config::{self, Settings};
use stockwatch::driver;
use stockwatch::tracker::StockTracker;
use stockwatch::Result;

/// Threshold-alert stock quote poller
#[derive(Debug, Parser)]
#[command(name = "stockwatch", version)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory for the time-sliced observation logs
    #[arg(long, default_value = config::DEFAULT_LOG_DIR)]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)?;
    config::ensure_log_dir(&cli.log_dir)?;

    let clock = SystemClock;
    let source = SinaClient::new();

    let mut trackers = Vec::with_capacity(settings.stocks.len());
    for entry in &settings.stocks {
        trackers.push(StockTracker::new(entry, &cli.log_dir, &clock)?);
    }

    tracing::info!(
        "Watching {} stocks (poll {}s, flush {}s, rotate {}s)",
        trackers.len(),
        settings.interval,
        settings.write_interval,
        settings.file_interval
    );
    for entry in &settings.stocks {
        tracing::info!(
            "  - {} (buy <= {:.2}, sell >= {:.2})",
            entry.code,
            entry.buy_price,
            entry.sell_price
        );
    }

    tokio::select! {
        _ = driver::run(&mut trackers, &source, &settings, &clock, None) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
    }

    // Flush whatever is still buffered before the handles close.
    driver::shutdown(&mut trackers, &clock);

    tracing::info!("stockwatch stopped");
    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("stockwatch=info")),
        )
        .init();
}
