//! World, view and projection transforms and their per-frame upload.

mod camera;
mod constants;
mod state;

pub use camera::{Camera, ProjectionParams, aspect_ratio};
pub use constants::{ConstantBuffer, FrameConstants};
pub use state::{FrameConstantUpdater, TransformState};
