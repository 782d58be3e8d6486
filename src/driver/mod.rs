use crate::api::QuoteSource;
use crate::clock::Clock;
use crate::config::Settings;
use crate::tracker::StockTracker;
use tokio::time::{sleep, Duration};

/// Run the polling loop: one sequential pass over every tracker per
/// cycle, then sleep for the configured poll interval.
///
/// `max_cycles` bounds the loop so tests can run a fixed number of
/// cycles; `None` runs until the surrounding task is cancelled.
pub async fn run(
    trackers: &mut [StockTracker],
    source: &dyn QuoteSource,
    settings: &Settings,
    clock: &dyn Clock,
    max_cycles: Option<u64>,
) {
    let mut cycle = 0u64;

    loop {
        run_cycle(trackers, source, settings, clock).await;

        cycle += 1;
        if let Some(max) = max_cycles {
            if cycle >= max {
                break;
            }
        }

        sleep(Duration::from_secs(settings.interval)).await;
    }
}

/// One pass over all trackers. A failure in one tracker is logged and
/// never blocks the rest of the pass.
pub async fn run_cycle(
    trackers: &mut [StockTracker],
    source: &dyn QuoteSource,
    settings: &Settings,
    clock: &dyn Clock,
) {
    for tracker in trackers.iter_mut() {
        if let Err(e) = tick_tracker(tracker, source, settings, clock).await {
            tracing::error!("[{}] cycle error: {:#}", tracker.code(), e);
        }
    }
}

async fn tick_tracker(
    tracker: &mut StockTracker,
    source: &dyn QuoteSource,
    settings: &Settings,
    clock: &dyn Clock,
) -> anyhow::Result<()> {
    tracker.update(source).await;

    tracker
        .maybe_write_log(settings.write_interval, clock)
        .map_err(|e| anyhow::anyhow!("flush failed: {}", e))?;

    tracker
        .maybe_rotate_file(settings.file_interval, clock)
        .map_err(|e| anyhow::anyhow!("rotation failed: {}", e))?;

    Ok(())
}

/// Final pass at shutdown: force-flush every tracker so nothing still
/// buffered is lost when the file handles close.
pub fn shutdown(trackers: &mut [StockTracker], clock: &dyn Clock) {
    for tracker in trackers.iter_mut() {
        if let Err(e) = tracker.flush_now(clock) {
            tracing::error!("[{}] final flush failed: {}", tracker.code(), e);
        }
    }
}
