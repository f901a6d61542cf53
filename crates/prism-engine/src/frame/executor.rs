use crate::depth::{DepthTarget, OutputClear, OutputTargets};
use crate::device::{Gpu, GpuFrame, Viewport};
use crate::geometry::{CubeBuffers, StreamOutputTarget};
use crate::shader::{GEOMETRY_WORKGROUP_SIZE, GpuPipeline, PipelineBindings};
use crate::transform::ConstantBuffer;

use super::command::{FrameCommand, FrameSink, Topology};
use super::error::FrameError;

/// Long-lived objects a frame draws with.
#[derive(Copy, Clone)]
pub struct FrameResources<'a> {
    pub depth: &'a DepthTarget,
    pub geometry: &'a CubeBuffers,
    pub capture: &'a StreamOutputTarget,
    pub pipeline: &'a GpuPipeline,
    pub bindings: &'a PipelineBindings,
    pub constants: &'a ConstantBuffer,
    pub viewport: Viewport,
}

/// Records one frame of GPU work from a [`FrameCommand`] stream.
///
/// Clears and state changes are collected until the draw, which encodes the
/// geometry-stage capture and the render pass in one go. Nothing is
/// submitted before `Present`; dropping the executor mid-frame discards the
/// acquired back buffer.
pub struct GpuFrameExecutor<'a, 'w> {
    gpu: &'a Gpu<'w>,
    res: FrameResources<'a>,
    frame: Option<GpuFrame>,
    clear_color: Option<wgpu::Color>,
    clear_depth: Option<(f32, u32)>,
    topology_set: bool,
    constants_bound: bool,
    programs_bound: bool,
    drawn: bool,
}

impl<'a, 'w> GpuFrameExecutor<'a, 'w> {
    pub fn new(gpu: &'a Gpu<'w>, res: FrameResources<'a>) -> Self {
        Self {
            gpu,
            res,
            frame: None,
            clear_color: None,
            clear_depth: None,
            topology_set: false,
            constants_bound: false,
            programs_bound: false,
            drawn: false,
        }
    }

    fn draw(
        &mut self,
        index_count: u32,
        first_index: u32,
        base_vertex: i32,
    ) -> Result<(), FrameError> {
        const CMD: &str = "draw indexed";

        let available = self.res.geometry.index_binding().count;
        if first_index
            .checked_add(index_count)
            .is_none_or(|end| end > available)
        {
            return Err(FrameError::DrawOutOfRange {
                first: first_index,
                count: index_count,
                available,
            });
        }
        if !self.topology_set {
            return Err(FrameError::out_of_order(CMD, "topology was never set"));
        }
        if !self.constants_bound {
            return Err(FrameError::out_of_order(CMD, "constants were never uploaded"));
        }
        if !self.programs_bound {
            return Err(FrameError::out_of_order(CMD, "programs were never bound"));
        }
        let (Some(color), Some((depth, stencil))) = (self.clear_color, self.clear_depth) else {
            return Err(FrameError::out_of_order(CMD, "targets were never cleared"));
        };
        let Some(frame) = self.frame.as_mut() else {
            return Err(FrameError::out_of_order(CMD, "no back buffer acquired"));
        };

        let res = self.res;
        let encoder = &mut frame.encoder;

        // Geometry stage: expand primitives into the capture buffer.
        encoder.clear_buffer(res.capture.counters(), 0, None);
        {
            let primitives = index_count / 3;
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("prism geometry stage"),
                timestamp_writes: None,
            });
            pass.set_pipeline(res.pipeline.capture());
            pass.set_bind_group(0, res.bindings.capture(), &[]);
            pass.dispatch_workgroups(primitives.div_ceil(GEOMETRY_WORKGROUP_SIZE), 1, 1);
        }

        let targets = OutputTargets::new(&frame.view, res.depth);
        let clear = OutputClear {
            color,
            depth,
            stencil,
        };
        let mut pass = targets.begin_pass(encoder, &clear);

        res.viewport.apply(&mut pass);
        pass.set_pipeline(res.pipeline.render());
        pass.set_bind_group(ConstantBuffer::SLOT, res.bindings.constants(), &[]);

        let vb = res.geometry.vertex_binding();
        pass.set_vertex_buffer(vb.slot, res.geometry.vertex_buffer().slice(vb.offset..));
        let ib = res.geometry.index_binding();
        pass.set_index_buffer(res.geometry.index_buffer().slice(..), ib.format);
        pass.draw_indexed(first_index..first_index + index_count, base_vertex, 0..1);

        Ok(())
    }
}

impl FrameSink for GpuFrameExecutor<'_, '_> {
    fn submit(&mut self, command: FrameCommand) -> Result<(), FrameError> {
        let name = command.name();
        if self.drawn && command != FrameCommand::Present {
            return Err(FrameError::out_of_order(name, "frame already drawn"));
        }

        match command {
            FrameCommand::ClearColor([r, g, b, a]) => {
                if self.frame.is_some() {
                    return Err(FrameError::out_of_order(name, "back buffer already acquired"));
                }
                self.frame = Some(self.gpu.begin_frame()?);
                self.clear_color = Some(wgpu::Color {
                    r: f64::from(r),
                    g: f64::from(g),
                    b: f64::from(b),
                    a: f64::from(a),
                });
            }
            FrameCommand::ClearDepth { depth, stencil } => {
                if self.frame.is_none() {
                    return Err(FrameError::out_of_order(name, "no back buffer acquired"));
                }
                self.clear_depth = Some((depth, stencil));
            }
            // The render pipeline is linked for its topology up front.
            FrameCommand::SetTopology(Topology::TriangleList) => {
                self.topology_set = true;
            }
            FrameCommand::UpdateConstants(record) => {
                self.res.constants.write(self.gpu.queue(), &record);
                self.constants_bound = true;
            }
            FrameCommand::BindPrograms => {
                self.programs_bound = true;
            }
            FrameCommand::DrawIndexed {
                index_count,
                first_index,
                base_vertex,
            } => {
                self.draw(index_count, first_index, base_vertex)?;
                self.drawn = true;
            }
            FrameCommand::Present => {
                if !self.drawn {
                    return Err(FrameError::out_of_order(name, "nothing was drawn"));
                }
                let Some(frame) = self.frame.take() else {
                    return Err(FrameError::out_of_order(name, "no back buffer acquired"));
                };
                self.gpu.present(frame);
            }
        }

        Ok(())
    }
}
