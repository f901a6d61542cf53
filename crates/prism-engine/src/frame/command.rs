use crate::geometry::CUBE_INDEX_COUNT;
use crate::transform::FrameConstants;

use super::error::FrameError;

pub const CLEAR_DEPTH: f32 = 1.0;
pub const CLEAR_STENCIL: u32 = 0;

/// Primitive topology of the indexed draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
}

impl Topology {
    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

/// One step of a frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FrameCommand {
    /// Acquire the back buffer and clear it to an RGBA color.
    ClearColor([f32; 4]),
    ClearDepth { depth: f32, stencil: u32 },
    SetTopology(Topology),
    /// Replace the whole constant buffer and bind it to every stage.
    UpdateConstants(FrameConstants),
    /// Bind the vertex, geometry and pixel programs.
    BindPrograms,
    DrawIndexed {
        index_count: u32,
        first_index: u32,
        base_vertex: i32,
    },
    /// Present without waiting for vertical blank.
    Present,
}

impl FrameCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClearColor(_) => "clear color",
            Self::ClearDepth { .. } => "clear depth",
            Self::SetTopology(_) => "set topology",
            Self::UpdateConstants(_) => "update constants",
            Self::BindPrograms => "bind programs",
            Self::DrawIndexed { .. } => "draw indexed",
            Self::Present => "present",
        }
    }
}

/// Receives the commands of one frame in order.
pub trait FrameSink {
    fn submit(&mut self, command: FrameCommand) -> Result<(), FrameError>;
}

impl FrameSink for Vec<FrameCommand> {
    fn submit(&mut self, command: FrameCommand) -> Result<(), FrameError> {
        self.push(command);
        Ok(())
    }
}

/// The fixed command sequence of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    commands: [FrameCommand; 7],
}

impl FramePlan {
    /// Clear, set state, upload constants, draw the cube, present.
    pub fn new(clear_color: [f32; 4], constants: FrameConstants) -> Self {
        Self {
            commands: [
                FrameCommand::ClearColor(clear_color),
                FrameCommand::ClearDepth {
                    depth: CLEAR_DEPTH,
                    stencil: CLEAR_STENCIL,
                },
                FrameCommand::SetTopology(Topology::TriangleList),
                FrameCommand::UpdateConstants(constants),
                FrameCommand::BindPrograms,
                FrameCommand::DrawIndexed {
                    index_count: CUBE_INDEX_COUNT,
                    first_index: 0,
                    base_vertex: 0,
                },
                FrameCommand::Present,
            ],
        }
    }

    pub fn commands(&self) -> &[FrameCommand] {
        &self.commands
    }

    /// Feeds every command to `sink`, stopping at the first error.
    pub fn execute(&self, sink: &mut impl FrameSink) -> Result<(), FrameError> {
        self.commands.iter().try_for_each(|&cmd| sink.submit(cmd))
    }
}
