//! The render context: sole owner of every GPU object.
//!
//! Built by one ordered startup sequence and borrowed by the render loop for
//! the rest of the process. Nothing else holds device, queue, swap chain,
//! views, buffers or pipeline objects.

use crate::config::RenderConfig;
use crate::depth::DepthTarget;
use crate::device::{Gpu, SurfaceErrorAction, SwapChainSpec, Viewport};
use crate::error::{RenderError, Result};
use crate::frame::{FrameError, FramePlan, FrameResources, GpuFrameExecutor};
use crate::geometry::{
    CUBE_PRIMITIVE_COUNT, CaptureBudget, CubeBuffers, StreamOutputTarget, Vertex,
};
use crate::shader::{GpuPipeline, InputLayout, PipelineBindings, ShaderSet};
use crate::transform::{ConstantBuffer, FrameConstantUpdater};
use winit::window::Window;

/// Outcome of one render attempt.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    Presented,
    /// No frame this tick; try again on the next one.
    Skipped,
    /// The loop must end.
    Fatal,
}

/// Every GPU object of the renderer.
///
/// Fields drop in declaration order, which is the reverse of creation order.
pub struct RenderContext<'w> {
    transforms: FrameConstantUpdater,
    bindings: PipelineBindings,
    constants: ConstantBuffer,
    pipeline: GpuPipeline,
    capture: StreamOutputTarget,
    geometry: CubeBuffers,
    depth: DepthTarget,
    gpu: Gpu<'w>,

    viewport: Viewport,
    clear_color: [f32; 4],
}

impl<'w> RenderContext<'w> {
    /// Runs the startup sequence against `window`.
    ///
    /// Order: swap chain, depth target, cube buffers, capture buffer,
    /// programs, pipeline, constants. The first failure is returned and every
    /// object created before it is released on the way out.
    pub fn new(window: &'w Window, config: &RenderConfig) -> Result<Self> {
        let spec = SwapChainSpec::new(config.width, config.height)?;
        let gpu = pollster::block_on(Gpu::new(window, &spec, &config.device))?;
        let device = gpu.device();

        let depth = DepthTarget::new(device, spec.width, spec.height)?;
        let geometry = CubeBuffers::upload(device)?;

        let so = &config.stream_output;
        let budget = CaptureBudget::plan(
            so.capacity_bytes,
            so.declaration.record_stride(),
            CUBE_PRIMITIVE_COUNT,
            3,
            so.overflow,
        )?;
        let capture = StreamOutputTarget::allocate(device, budget, Vertex::STRIDE_FLOATS)?;

        let compiler = config.shader_source.compiler();
        let shaders = ShaderSet::build(
            &compiler,
            &config.programs,
            InputLayout::for_vertex(),
            so.declaration.clone(),
        )?;
        let pipeline = GpuPipeline::new(device, &shaders, gpu.surface_format())?;

        let transforms =
            FrameConstantUpdater::new(spec.width, spec.height, &config.camera, &config.projection)?;
        let constants = ConstantBuffer::allocate(device)?;
        constants.upload(gpu.queue(), transforms.state());

        let bindings = pipeline.bind(device, &constants, &geometry, &capture)?;

        // Viewport, swap chain and depth target share one size.
        let viewport = gpu.spec().viewport();
        if !viewport.is_valid() || depth.size() != (spec.width, spec.height) {
            return Err(RenderError::InvalidDimensions {
                width: spec.width,
                height: spec.height,
            });
        }

        log::info!("render context ready");

        Ok(Self {
            transforms,
            bindings,
            constants,
            pipeline,
            capture,
            geometry,
            depth,
            viewport,
            gpu,
            clear_color: config.clear_color,
        })
    }

    /// Renders and presents one frame.
    ///
    /// Failures are never retried within the call.
    pub fn render_frame(&mut self) -> FrameStatus {
        let plan = FramePlan::new(self.clear_color, self.transforms.next_constants());

        let mut executor = GpuFrameExecutor::new(
            &self.gpu,
            FrameResources {
                depth: &self.depth,
                geometry: &self.geometry,
                capture: &self.capture,
                pipeline: &self.pipeline,
                bindings: &self.bindings,
                constants: &self.constants,
                viewport: self.viewport,
            },
        );

        match plan.execute(&mut executor) {
            Ok(()) => FrameStatus::Presented,
            Err(FrameError::Surface(err)) => {
                // Release the partial frame before touching the surface.
                drop(executor);
                match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        FrameStatus::Skipped
                    }
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface lost for good, leaving the render loop");
                        FrameStatus::Fatal
                    }
                }
            }
            Err(err) => {
                log::error!("frame aborted: {err}");
                FrameStatus::Fatal
            }
        }
    }
}

impl Drop for RenderContext<'_> {
    fn drop(&mut self) {
        log::info!("releasing render context");
    }
}
