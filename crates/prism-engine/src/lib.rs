//! Prism engine crate.
//!
//! A cube renderer with a vertex stage, a geometry stage whose output is
//! captured to a GPU buffer, and a pixel stage. This crate owns the device,
//! the pipeline and the render loop; binaries only configure and run it.

pub mod config;
pub mod context;
pub mod depth;
pub mod device;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod logging;
pub mod shader;
pub mod time;
pub mod transform;
pub mod window;

pub use config::RenderConfig;
pub use context::{FrameStatus, RenderContext};
pub use error::{RenderError, Result};
pub use window::Runtime;
