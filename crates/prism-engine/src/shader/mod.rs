//! Shader programs and the linked pipeline.
//!
//! This module is responsible for:
//! - loading and compiling the vertex, geometry and pixel programs
//! - checking the input layout and stream-output declaration against them
//! - creating the device-side pipeline objects in stage order

mod compiler;
mod layout;
mod pipeline;
mod program;
mod signature;
mod stream_output;

pub use compiler::{BUILTIN_GEOMETRY, BUILTIN_PIXEL, BUILTIN_VERTEX, ProgramCompiler, WgslCompiler};
pub use layout::{InputElement, InputLayout};
pub use pipeline::{GEOMETRY_WORKGROUP_SIZE, GpuPipeline, PipelineBindings, ShaderSet};
pub use program::{CompiledProgram, ProgramDesc, ProgramSet, ShaderStage};
pub use signature::{CaptureRecord, SignatureElement, semantic_matches};
pub use stream_output::{MAX_COMPONENTS, StreamOutputDeclaration, StreamOutputEntry};
