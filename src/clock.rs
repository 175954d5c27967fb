//! Time source for the scheduler. Timer arithmetic never reads the wall clock directly.

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same time, so a test can
/// keep one handle and give another to the scheduler.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: DateTime<Utc>,
    offset_ms: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            offset_ms: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Milliseconds elapsed since the origin.
    pub fn elapsed_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::SeqCst)
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }

    /// Jump to `secs` seconds after the origin.
    pub fn set_secs(&self, secs: i64) {
        self.offset_ms.store(secs * 1000, Ordering::SeqCst);
    }

    /// The instant `secs` seconds after the origin.
    pub fn at_secs(&self, secs: i64) -> DateTime<Utc> {
        self.origin + Duration::seconds(secs)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.origin + Duration::milliseconds(self.elapsed_ms())
    }
}
