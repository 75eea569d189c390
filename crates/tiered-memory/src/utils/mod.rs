//! Utilities
//!
//! Common utilities for the memory tiers.

mod time;

pub use time::{Clock, ManualClock, SharedClock, SystemClock, now_utc, system_clock};
