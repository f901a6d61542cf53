//! Startup error taxonomy.
//!
//! Every step of the startup sequence returns [`Result`]. The first failure
//! short-circuits the sequence; nothing created before it is ever handed to the
//! render loop.

use thiserror::Error;

use crate::shader::ShaderStage;

/// Errors raised while building the render pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Window or surface dimensions that cannot back a render target.
    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Adapter, device, queue or surface could not be created.
    #[error("device creation failed: {0}")]
    DeviceCreation(String),

    /// The presentation surface cannot provide a usable render-target view.
    #[error("render-target view creation failed: {0}")]
    ViewCreation(String),

    /// Depth-stencil texture or view could not be created.
    #[error("depth-stencil resource creation failed: {0}")]
    DepthResource(String),

    /// A GPU buffer could not be allocated.
    #[error("buffer creation failed for {label}: {reason}")]
    BufferCreation { label: &'static str, reason: String },

    /// A shader program failed to load, parse or validate.
    #[error(
        "{stage} program failed to compile: {}",
        .diagnostic.as_deref().unwrap_or("no diagnostic available")
    )]
    ShaderCompile {
        stage: ShaderStage,
        diagnostic: Option<String>,
    },

    /// Input layout and vertex program input signature disagree.
    #[error("input layout does not match the vertex program: {0}")]
    LayoutMismatch(String),

    /// Stream-output declaration and geometry program output disagree.
    #[error("stream-output declaration does not match the geometry program: {0}")]
    StreamOutputMismatch(String),

    /// Capture buffer is smaller than the worst-case emission of one frame.
    #[error(
        "stream-output capacity of {capacity} bytes is below the worst-case frame emission of {required} bytes"
    )]
    StreamOutputOverflow { capacity: u64, required: u64 },
}

impl RenderError {
    /// Shorthand for a compile failure with a diagnostic message.
    pub(crate) fn compile(stage: ShaderStage, diagnostic: impl Into<String>) -> Self {
        Self::ShaderCompile {
            stage,
            diagnostic: Some(diagnostic.into()),
        }
    }

    /// Returns the failing stage for compile errors.
    pub fn shader_stage(&self) -> Option<ShaderStage> {
        match self {
            Self::ShaderCompile { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result alias used by the startup sequence.
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_names_stage_and_diagnostic() {
        let err = RenderError::compile(ShaderStage::Geometry, "missing file");
        let text = err.to_string();
        assert!(text.contains("geometry"));
        assert!(text.contains("missing file"));
        assert_eq!(err.shader_stage(), Some(ShaderStage::Geometry));
    }

    #[test]
    fn compile_error_without_diagnostic() {
        let err = RenderError::ShaderCompile {
            stage: ShaderStage::Pixel,
            diagnostic: None,
        };
        assert!(err.to_string().contains("no diagnostic available"));
    }

    #[test]
    fn non_compile_errors_have_no_stage() {
        let err = RenderError::InvalidDimensions { width: 0, height: 0 };
        assert_eq!(err.shader_stage(), None);
    }
}
