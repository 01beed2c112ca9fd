use chrono::{DateTime, FixedOffset, TimeZone};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Starting point of every scenario: 2014-05-13 17:46:40 UTC.
const EPOCH: i64 = 1_400_003_200;

/// Controllable time for deterministic comment timestamps.
///
/// This clock can be passed to CommentRepo via `with_time_provider()` so
/// create and amend times are predictable and strictly ordered.
#[derive(Clone)]
pub struct MockClock {
    current: Arc<AtomicI64>,
}

impl MockClock {
    /// Creates a time provider function suitable for passing to CommentRepo.
    pub fn as_provider(&self) -> impl Fn() -> DateTime<FixedOffset> + Send + Sync + 'static {
        let current = self.current.clone();
        move || to_datetime(current.load(Ordering::SeqCst))
    }
}

impl MockClock {
    /// Create a new mock clock at the scenario epoch
    pub fn new() -> Self {
        Self {
            current: Arc::new(AtomicI64::new(EPOCH)),
        }
    }

    /// Get current time
    pub fn now(&self) -> DateTime<FixedOffset> {
        to_datetime(self.current.load(Ordering::SeqCst))
    }

    /// Advance time by duration
    pub fn advance(&self, duration: Duration) {
        let seconds = duration.as_secs() as i64;
        self.current.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Advance time by minutes
    pub fn advance_minutes(&self, minutes: u64) {
        self.advance(Duration::from_secs(minutes * 60));
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

fn to_datetime(seconds: i64) -> DateTime<FixedOffset> {
    let utc = FixedOffset::east_opt(0).expect("zero offset is valid");
    utc.timestamp_opt(seconds, 0)
        .single()
        .expect("scenario clock stays in range")
}
