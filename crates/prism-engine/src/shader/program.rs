use std::fmt;

/// Programmable stage a program is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    /// Primitive expansion with stream-output capture.
    Geometry,
    Pixel,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Geometry => "geometry",
            Self::Pixel => "pixel",
        }
    }

    /// Prefix every target profile string for this stage must carry.
    pub fn profile_prefix(self) -> &'static str {
        match self {
            Self::Vertex => "vs_",
            Self::Geometry => "gs_",
            Self::Pixel => "ps_",
        }
    }

    /// Entry-point stage expected in the compiled module.
    ///
    /// wgpu has no geometry stage; geometry programs run as compute over the
    /// primitive stream.
    pub(crate) fn naga_stage(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Geometry => naga::ShaderStage::Compute,
            Self::Pixel => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names one external program: where it lives and how to enter it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDesc {
    pub stage: ShaderStage,
    pub file_name: String,
    pub entry_point: String,
    /// Target profile, e.g. `vs_4_0`.
    pub target: String,
}

impl ProgramDesc {
    pub fn new(
        stage: ShaderStage,
        file_name: impl Into<String>,
        entry_point: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            file_name: file_name.into(),
            entry_point: entry_point.into(),
            target: target.into(),
        }
    }

    pub fn vertex(file_name: impl Into<String>) -> Self {
        Self::new(ShaderStage::Vertex, file_name, "main", "vs_4_0")
    }

    pub fn geometry(file_name: impl Into<String>) -> Self {
        Self::new(ShaderStage::Geometry, file_name, "main", "gs_4_0")
    }

    pub fn pixel(file_name: impl Into<String>) -> Self {
        Self::new(ShaderStage::Pixel, file_name, "main", "ps_4_0")
    }
}

impl fmt::Display for ProgramDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{} ({})", self.file_name, self.entry_point, self.target)
    }
}

/// The three programs linked into one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSet {
    pub vertex: ProgramDesc,
    pub geometry: ProgramDesc,
    pub pixel: ProgramDesc,
}

impl Default for ProgramSet {
    fn default() -> Self {
        Self {
            vertex: ProgramDesc::vertex("vertex.wgsl"),
            geometry: ProgramDesc::geometry("geometry.wgsl"),
            pixel: ProgramDesc::pixel("pixel.wgsl"),
        }
    }
}

/// A parsed and validated program.
///
/// The device consumes it as an opaque artifact; the pipeline builder only
/// reads its entry-point signature.
pub struct CompiledProgram {
    desc: ProgramDesc,
    source: String,
    module: naga::Module,
    entry_index: usize,
}

impl CompiledProgram {
    pub(crate) fn new(
        desc: ProgramDesc,
        source: String,
        module: naga::Module,
        entry_index: usize,
    ) -> Self {
        Self {
            desc,
            source,
            module,
            entry_index,
        }
    }

    pub fn desc(&self) -> &ProgramDesc {
        &self.desc
    }

    pub fn stage(&self) -> ShaderStage {
        self.desc.stage
    }

    pub fn entry_point_name(&self) -> &str {
        &self.desc.entry_point
    }

    /// WGSL text handed to the device.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn module(&self) -> &naga::Module {
        &self.module
    }

    pub(crate) fn entry_point(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_index]
    }

    /// Creates the device-side module.
    pub(crate) fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.desc.file_name.as_str()),
            source: wgpu::ShaderSource::Wgsl(self.source.as_str().into()),
        })
    }
}

impl fmt::Debug for CompiledProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledProgram")
            .field("desc", &self.desc)
            .field("source_len", &self.source.len())
            .finish()
    }
}
