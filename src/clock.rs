//! Wall-clock source for cooldown arithmetic.
//!
//! Circuit rows store epoch seconds, so the reader and writer need wall time
//! rather than `Instant`. Both take a [`Clock`] so tests can move time
//! explicitly with [`MockClock`].

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;

    /// Whole epoch seconds, rounded down.
    fn epoch_secs(&self) -> u64 {
        self.now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    /// Epoch seconds of `now + ttl`, rounded up so a cooldown never ends early.
    ///
    /// `None` when the result does not fit in a `u64`.
    fn epoch_secs_after(&self, ttl: Duration) -> Option<u64> {
        let at = self
            .now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .checked_add(ttl)?;
        if at.subsec_nanos() > 0 {
            at.as_secs().checked_add(1)
        } else {
            Some(at.as_secs())
        }
    }
}

/// System clock implementation using `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock whose time only moves when told to.
///
/// Clones share the same time value.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<SystemTime>>,
}

impl MockClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// A clock starting at `secs` after the epoch.
    pub fn at_epoch_secs(secs: u64) -> Self {
        Self::new(UNIX_EPOCH + Duration::from_secs(secs))
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().expect("MockClock mutex poisoned");
        *current += by;
    }

    pub fn set(&self, to: SystemTime) {
        *self.current.lock().expect("MockClock mutex poisoned") = to;
    }
}

impl Clock for MockClock {
    fn now(&self) -> SystemTime {
        *self.current.lock().expect("MockClock mutex poisoned")
    }
}
