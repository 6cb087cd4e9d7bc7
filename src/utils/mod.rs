//! Utility Module
//!
//! - [`time`]: clocks (system, manual) and a per-frame delta timer

pub mod time;

pub use time::{Clock, FrameTimer, ManualClock, SystemClock};
