// Per-security tracking state machine
mod logfile;

pub use logfile::LogFile;

use crate::api::QuoteSource;
use crate::clock::Clock;
use crate::config::StockEntry;
use crate::models::{log_time, Observation, Quote};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Tracks one security across poll cycles: running extrema, a simulated
/// position driven by the configured thresholds, the observation buffer,
/// and the currently open log slice.
///
/// Created once at startup and alive for the process lifetime. Each
/// tracker owns its buffer and file handle exclusively, so the driver
/// can walk trackers sequentially without any locking.
pub struct StockTracker {
    code: String,
    buy_price: f64,
    sell_price: f64,
    highest: Option<f64>,
    lowest: Option<f64>,
    has_position: bool,
    entry_price: f64,
    buffer: Vec<Observation>,
    log_dir: PathBuf,
    file: LogFile,
    file_start: DateTime<Local>,
    last_write: DateTime<Local>,
}

impl StockTracker {
    /// Create a tracker and open its first log slice.
    pub fn new(
        entry: &StockEntry,
        log_dir: impl Into<PathBuf>,
        clock: &dyn Clock,
    ) -> crate::Result<Self> {
        let log_dir = log_dir.into();
        let now = clock.now();
        let file = LogFile::open(&log_dir, &entry.code, now)?;

        Ok(Self {
            code: entry.code.clone(),
            buy_price: entry.buy_price,
            sell_price: entry.sell_price,
            highest: None,
            lowest: None,
            has_position: false,
            entry_price: 0.0,
            buffer: Vec::new(),
            log_dir,
            file,
            file_start: now,
            last_write: now,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn highest(&self) -> Option<f64> {
        self.highest
    }

    pub fn lowest(&self) -> Option<f64> {
        self.lowest
    }

    pub fn has_position(&self) -> bool {
        self.has_position
    }

    /// Observations accumulated since the last flush, in arrival order.
    pub fn buffer(&self) -> &[Observation] {
        &self.buffer
    }

    pub fn last_write(&self) -> DateTime<Local> {
        self.last_write
    }

    /// Path of the currently open log slice.
    pub fn current_log_path(&self) -> &Path {
        self.file.path()
    }

    /// One polling tick: fetch a quote for this code, buffer whatever
    /// came back, and run the threshold checks against a fresh price.
    ///
    /// A tick without usable data (`Quote::NoData`) records nothing at
    /// all: no buffer entry, no extrema update.
    pub async fn update(&mut self, source: &dyn QuoteSource) {
        match source.fetch(&self.code).await {
            Quote::Price {
                time,
                curr,
                high,
                low,
            } => {
                self.buffer.push(Observation::price(time, curr, high, low));
                self.apply_price(time, curr);
            }
            Quote::Error { time, message } => {
                tracing::warn!("[{}] fetch error: {}", self.code, message);
                self.buffer.push(Observation::error(time, message));
            }
            Quote::NoData => {
                tracing::debug!("[{}] no data this tick", self.code);
            }
        }
    }

    fn apply_price(&mut self, time: DateTime<Local>, curr: f64) {
        self.highest = Some(self.highest.map_or(curr, |h| h.max(curr)));
        self.lowest = Some(self.lowest.map_or(curr, |l| l.min(curr)));

        // Buy check first; the sell check reads the flag this call may
        // have just set.
        if !self.has_position && curr <= self.buy_price {
            self.has_position = true;
            self.entry_price = curr;
            tracing::info!(
                "{} [{}] buy signal at {:.2}",
                time.format(log_time::FORMAT),
                self.code,
                curr
            );
        }

        if self.has_position && curr >= self.sell_price {
            let profit = curr - self.entry_price;
            self.has_position = false;
            tracing::info!(
                "{} [{}] sell signal at {:.2}, profit {:.2}",
                time.format(log_time::FORMAT),
                self.code,
                curr,
                profit
            );
        }
    }

    /// Flush the buffer to the current log slice once `write_interval`
    /// seconds have elapsed since the last write.
    ///
    /// `last_write` only advances on an actual write: an empty buffer
    /// never resets the timer, so once observations resume a flush
    /// happens immediately if the interval already elapsed. A failed
    /// write leaves the buffer intact for the next cycle.
    pub fn maybe_write_log(&mut self, write_interval: u64, clock: &dyn Clock) -> crate::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let now = clock.now();
        if (now - self.last_write).num_seconds() < write_interval as i64 {
            return Ok(());
        }

        self.flush(now)
    }

    /// Force the buffer out regardless of the write interval. Used by
    /// the graceful-shutdown path; no-op when there is nothing buffered.
    pub fn flush_now(&mut self, clock: &dyn Clock) -> crate::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.flush(clock.now())
    }

    fn flush(&mut self, now: DateTime<Local>) -> crate::Result<()> {
        // Serialize the whole batch before touching the file, then write
        // it in one call: a failure anywhere leaves the buffer untouched.
        let mut batch = String::new();
        for observation in &self.buffer {
            batch.push_str(&serde_json::to_string(observation)?);
            batch.push('\n');
        }

        self.file.append(&batch)?;
        self.file.sync()?;

        self.buffer.clear();
        self.last_write = now;

        tracing::debug!("[{}] flushed to {}", self.code, self.file.path().display());
        Ok(())
    }

    /// Start a new log slice once `file_interval` seconds have elapsed
    /// since the current one was opened.
    ///
    /// Rotation does not flush: a pending buffer lands in whichever
    /// slice is open at the next flush.
    pub fn maybe_rotate_file(&mut self, file_interval: u64, clock: &dyn Clock) -> crate::Result<()> {
        let now = clock.now();
        if (now - self.file_start).num_seconds() < file_interval as i64 {
            return Ok(());
        }

        // Swapping in the new slice drops, and thereby closes, the old
        // handle.
        self.file = LogFile::open(&self.log_dir, &self.code, now)?;
        self.file_start = now;

        tracing::info!("[{}] rotated log to {}", self.code, self.file.path().display());
        Ok(())
    }
}
