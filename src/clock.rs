//! Timestamp source for snapshot names.
use std::sync::Mutex;

use chrono::{Duration, Local, NaiveDateTime};

/// Source of snapshot-name timestamps, injectable for testing.
pub trait Clock: Send + Sync {
    /// The current local time.
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock source that is strictly increasing within one process.
///
/// Two reads at the same microsecond would otherwise produce colliding
/// snapshot names; the second read is bumped by one microsecond instead.
/// Collisions across separate invocations remain possible if the scheduler
/// fires faster than the timestamp resolution.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: Mutex<Option<NaiveDateTime>>,
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let mut now = Local::now().naive_local();
        if let Ok(mut guard) = self.last.lock() {
            if let Some(last) = *guard {
                if now <= last {
                    now = last + Duration::microseconds(1);
                }
            }
            *guard = Some(now);
        }
        now
    }
}
