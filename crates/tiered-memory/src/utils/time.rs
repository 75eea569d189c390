//! Time Utilities
//!
//! Every tier reads the current time through a [`Clock`] so TTL expiry and
//! recency scoring can be driven deterministically in tests.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Source of the current time
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock handle shared between a coordinator and its tiers
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        now_utc()
    }
}

/// Shared handle to the wall clock
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

/// Manually advanced clock.
///
/// Clones share the same instant, so a test can keep one handle and hand
/// another to the tiers.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock frozen at the given instant
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Create a clock frozen at the current wall-clock time
    pub fn starting_now() -> Self {
        Self::at(now_utc())
    }

    /// Current frozen instant
    pub fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move time forward. Negative durations are ignored.
    pub fn advance(&self, by: Duration) -> DateTime<Utc> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if by > Duration::zero() {
            *current += by;
        }
        *current
    }

    /// Move time forward by whole seconds
    pub fn advance_secs(&self, secs: i64) -> DateTime<Utc> {
        self.advance(Duration::seconds(secs))
    }

    /// Shared handle for passing to tiers
    pub fn shared(&self) -> SharedClock {
        Arc::new(self.clone())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        ManualClock::now(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_utc() {
        let now = now_utc();
        assert!(now.timestamp() > 0);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = system_clock();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_is_frozen_until_advanced() {
        let start = now_utc();
        let clock = ManualClock::at(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);

        let later = clock.advance_secs(90);
        assert_eq!(later - start, Duration::seconds(90));
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::starting_now();
        let shared = clock.shared();
        let before = shared.now();

        clock.advance(Duration::days(2));
        assert_eq!(shared.now() - before, Duration::days(2));
    }

    #[test]
    fn test_manual_clock_ignores_negative_advance() {
        let clock = ManualClock::starting_now();
        let before = clock.now();
        clock.advance(Duration::seconds(-30));
        assert_eq!(clock.now(), before);
    }
}
