//! Frame timing for context statistics.
//!
//! One `FrameClock` lives in each context; `Context::frame` ticks it once per
//! sealed frame and reports the measured CPU time through `Stats`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
