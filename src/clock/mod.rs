use chrono::{DateTime, Duration, Local};
use std::sync::{Arc, Mutex};

/// Wall-clock access behind a trait so the flush and rotation interval
/// logic can be driven in tests without real sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A manually stepped clock for tests.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward by `secs` seconds.
    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now = *now + Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }
}
