use crate::depth::DEPTH_FORMAT;
use crate::error::{RenderError, Result};
use crate::frame::Topology;
use crate::geometry::{CubeBuffers, StreamOutputTarget};
use crate::transform::ConstantBuffer;

use super::compiler::ProgramCompiler;
use super::layout::InputLayout;
use super::program::{CompiledProgram, ProgramDesc, ProgramSet, ShaderStage};
use super::signature::{capture_record, vertex_inputs};
use super::stream_output::StreamOutputDeclaration;

/// Invocations per workgroup of the geometry stage.
pub const GEOMETRY_WORKGROUP_SIZE: u32 = 64;

/// The three compiled programs, checked against each other.
///
/// Building one is pure CPU work; nothing touches the device until
/// [`GpuPipeline::new`].
#[derive(Debug)]
pub struct ShaderSet {
    vertex: CompiledProgram,
    geometry: CompiledProgram,
    pixel: CompiledProgram,
    layout: InputLayout,
    stream_output: StreamOutputDeclaration,
}

impl ShaderSet {
    /// Compiles and checks the programs in stage order.
    ///
    /// Order: vertex, input layout, geometry, stream-output declaration,
    /// pixel. The first failure is returned and later stages are never
    /// compiled.
    pub fn build(
        compiler: &dyn ProgramCompiler,
        programs: &ProgramSet,
        layout: InputLayout,
        stream_output: StreamOutputDeclaration,
    ) -> Result<Self> {
        expect_stage(&programs.vertex, ShaderStage::Vertex)?;
        expect_stage(&programs.geometry, ShaderStage::Geometry)?;
        expect_stage(&programs.pixel, ShaderStage::Pixel)?;

        let vertex = compiler.compile(&programs.vertex)?;
        layout.validate(&vertex_inputs(&vertex))?;

        let geometry = compiler.compile(&programs.geometry)?;
        let record = capture_record(&geometry).ok_or_else(|| {
            RenderError::StreamOutputMismatch(format!(
                "{} declares no capture buffer",
                programs.geometry
            ))
        })?;
        stream_output.validate(&record)?;

        let pixel = compiler.compile(&programs.pixel)?;

        Ok(Self {
            vertex,
            geometry,
            pixel,
            layout,
            stream_output,
        })
    }

    pub fn vertex(&self) -> &CompiledProgram {
        &self.vertex
    }

    pub fn geometry(&self) -> &CompiledProgram {
        &self.geometry
    }

    pub fn pixel(&self) -> &CompiledProgram {
        &self.pixel
    }

    pub fn layout(&self) -> &InputLayout {
        &self.layout
    }

    pub fn stream_output(&self) -> &StreamOutputDeclaration {
        &self.stream_output
    }
}

fn expect_stage(desc: &ProgramDesc, stage: ShaderStage) -> Result<()> {
    if desc.stage == stage {
        Ok(())
    } else {
        Err(RenderError::compile(
            stage,
            format!("{desc} is described as a {} program", desc.stage),
        ))
    }
}

/// Device-side pipeline objects.
///
/// The geometry stage is a compute pipeline that walks the indexed primitive
/// stream and appends to the capture buffer. The vertex and pixel stages form
/// the rasterized render pipeline. Both read the same frame constants.
pub struct GpuPipeline {
    render: wgpu::RenderPipeline,
    capture: wgpu::ComputePipeline,
    constants_layout: wgpu::BindGroupLayout,
    capture_layout: wgpu::BindGroupLayout,
}

impl GpuPipeline {
    /// Creates the device objects for `shaders` in stage order.
    ///
    /// Each step runs in its own validation scope, so a program that passed
    /// front-end validation but disagrees with the fixed bind group layouts
    /// fails here with a typed error instead of reaching the device's
    /// uncaptured-error handler.
    pub fn new(
        device: &wgpu::Device,
        shaders: &ShaderSet,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let vertex_module = validated(
            device,
            || shaders.vertex.create_module(device),
            |d| RenderError::compile(ShaderStage::Vertex, d),
        )?;
        let geometry_module = validated(
            device,
            || shaders.geometry.create_module(device),
            |d| RenderError::compile(ShaderStage::Geometry, d),
        )?;
        let pixel_module = validated(
            device,
            || shaders.pixel.create_module(device),
            |d| RenderError::compile(ShaderStage::Pixel, d),
        )?;

        let constants_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism constants bgl"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let capture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism capture bgl"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::COMPUTE),
                storage_entry(1, true),
                storage_entry(2, true),
                storage_entry(3, false),
                storage_entry(4, false),
                uniform_entry(5, wgpu::ShaderStages::COMPUTE),
            ],
        });

        let compute_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism capture pipeline layout"),
            bind_group_layouts: &[&capture_layout],
            immediate_size: 0,
        });

        let capture = validated(
            device,
            || {
                device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some("prism geometry stage"),
                    layout: Some(&compute_layout),
                    module: &geometry_module,
                    entry_point: Some(shaders.geometry.entry_point_name()),
                    compilation_options: Default::default(),
                    cache: None,
                })
            },
            |d| RenderError::compile(ShaderStage::Geometry, d),
        )?;

        let render_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism render pipeline layout"),
            bind_group_layouts: &[&constants_layout],
            immediate_size: 0,
        });

        let attributes = shaders.layout.attributes();

        let render = validated(
            device,
            || {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("prism render pipeline"),
                    layout: Some(&render_layout),

                    vertex: wgpu::VertexState {
                        module: &vertex_module,
                        entry_point: Some(shaders.vertex.entry_point_name()),
                        compilation_options: Default::default(),
                        buffers: &[wgpu::VertexBufferLayout {
                            array_stride: shaders.layout.stride(),
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &attributes,
                        }],
                    },

                    fragment: Some(wgpu::FragmentState {
                        module: &pixel_module,
                        entry_point: Some(shaders.pixel.entry_point_name()),
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: color_format,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),

                    // Cube faces are wound clockwise seen from outside.
                    primitive: wgpu::PrimitiveState {
                        topology: Topology::TriangleList.to_wgpu(),
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Cw,
                        cull_mode: Some(wgpu::Face::Back),
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },

                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        depth_write_enabled: true,
                        depth_compare: wgpu::CompareFunction::Less,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),

                    multiview_mask: None,
                    cache: None,
                })
            },
            RenderError::LayoutMismatch,
        )?;

        log::info!("linked render pipeline ({color_format:?}, {DEPTH_FORMAT:?})");

        Ok(Self {
            render,
            capture,
            constants_layout,
            capture_layout,
        })
    }

    /// Binds the per-frame resources to both pipelines.
    pub fn bind(
        &self,
        device: &wgpu::Device,
        constants: &ConstantBuffer,
        geometry: &CubeBuffers,
        capture: &StreamOutputTarget,
    ) -> Result<PipelineBindings> {
        let constants_group = validated(
            device,
            || {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("prism constants bind group"),
                    layout: &self.constants_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: constants.buffer().as_entire_binding(),
                    }],
                })
            },
            |reason| RenderError::BufferCreation {
                label: "constants bind group",
                reason,
            },
        )?;

        let capture_group = validated(
            device,
            || {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("prism capture bind group"),
                    layout: &self.capture_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: constants.buffer().as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: geometry.vertex_buffer().as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: geometry.index_buffer().as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: capture.binding_resource(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 4,
                            resource: capture.counters().as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 5,
                            resource: capture.params().as_entire_binding(),
                        },
                    ],
                })
            },
            |reason| RenderError::BufferCreation {
                label: "capture bind group",
                reason,
            },
        )?;

        Ok(PipelineBindings {
            constants: constants_group,
            capture: capture_group,
        })
    }

    pub fn render(&self) -> &wgpu::RenderPipeline {
        &self.render
    }

    /// The geometry stage.
    pub fn capture(&self) -> &wgpu::ComputePipeline {
        &self.capture
    }
}

/// Runs `create` in a validation error scope.
///
/// A captured error is turned into a [`RenderError`] by `fail`; the object
/// `create` returned is invalid in that case and is dropped.
fn validated<T>(
    device: &wgpu::Device,
    create: impl FnOnce() -> T,
    fail: impl FnOnce(String) -> RenderError,
) -> Result<T> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(scope.pop()) {
        None => Ok(value),
        Some(err) => Err(fail(err.to_string())),
    }
}

/// Bind groups created once at startup and reused every frame.
pub struct PipelineBindings {
    constants: wgpu::BindGroup,
    capture: wgpu::BindGroup,
}

impl PipelineBindings {
    pub fn constants(&self) -> &wgpu::BindGroup {
        &self.constants
    }

    pub fn capture(&self) -> &wgpu::BindGroup {
        &self.capture
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
