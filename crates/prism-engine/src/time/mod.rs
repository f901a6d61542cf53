//! Frame timing.
//!
//! One `FrameClock` per render loop; call `tick()` once per rendered frame and
//! feed the delta into `FrameStats` for periodic reporting.

mod frame_clock;
mod stats;

pub use frame_clock::{FrameClock, FrameTime};
pub use stats::{FrameReport, FrameStats};
