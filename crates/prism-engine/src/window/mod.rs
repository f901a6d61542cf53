//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and drives the render context with
//! the cooperative cadence in [`RenderCadence`].

mod cadence;
mod runtime;

pub use cadence::{LoopState, RenderCadence};
pub use runtime::Runtime;
