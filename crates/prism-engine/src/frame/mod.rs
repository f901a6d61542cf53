//! Per-frame command sequence and its execution.
//!
//! A frame is a fixed list of [`FrameCommand`]s. [`FramePlan`] builds the list
//! and feeds it to a [`FrameSink`]; [`GpuFrameExecutor`] is the sink that
//! records and presents real GPU work.

mod command;
mod error;
mod executor;

pub use command::{CLEAR_DEPTH, CLEAR_STENCIL, FrameCommand, FramePlan, FrameSink, Topology};
pub use error::FrameError;
pub use executor::{FrameResources, GpuFrameExecutor};
