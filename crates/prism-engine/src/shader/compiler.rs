use std::collections::HashMap;
use std::path::{Path, PathBuf};

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::{RenderError, Result};

use super::program::{CompiledProgram, ProgramDesc};

/// File names of the programs bundled with the engine.
pub const BUILTIN_VERTEX: &str = "vertex.wgsl";
pub const BUILTIN_GEOMETRY: &str = "geometry.wgsl";
pub const BUILTIN_PIXEL: &str = "pixel.wgsl";

/// The single "compile program" operation.
///
/// Compilation is synchronous and blocks the caller. Implementations either
/// return a program whose requested entry point exists for the requested
/// stage, or a `ShaderCompile` error naming that stage. Swapping in a
/// precompiled loader only means another implementation of this trait.
pub trait ProgramCompiler {
    fn compile(&self, desc: &ProgramDesc) -> Result<CompiledProgram>;
}

enum Sources {
    Directory(PathBuf),
    Memory(HashMap<String, String>),
}

/// WGSL front-end backed by naga.
///
/// Sources come either from a directory (looked up by file name) or from an
/// in-memory table such as the bundled programs.
pub struct WgslCompiler {
    sources: Sources,
    flags: ValidationFlags,
}

impl WgslCompiler {
    /// Programs bundled into the engine binary.
    pub fn builtin() -> Self {
        Self::from_sources([
            (BUILTIN_VERTEX, include_str!("programs/vertex.wgsl")),
            (BUILTIN_GEOMETRY, include_str!("programs/geometry.wgsl")),
            (BUILTIN_PIXEL, include_str!("programs/pixel.wgsl")),
        ])
    }

    /// Programs read from `root/<file_name>` at compile time.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            sources: Sources::Directory(root.into()),
            flags: ValidationFlags::all(),
        }
    }

    pub fn from_sources<I, K, V>(sources: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            sources: Sources::Memory(
                sources
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            flags: ValidationFlags::all(),
        }
    }

    /// Parses and validates `source` as the program described by `desc`.
    pub fn compile_source(&self, desc: &ProgramDesc, source: String) -> Result<CompiledProgram> {
        let stage = desc.stage;

        if !desc.target.starts_with(stage.profile_prefix()) {
            return Err(RenderError::compile(
                stage,
                format!(
                    "target profile `{}` is not a {stage} profile (expected `{}*`)",
                    desc.target,
                    stage.profile_prefix()
                ),
            ));
        }

        let module = naga::front::wgsl::parse_str(&source)
            .map_err(|err| RenderError::compile(stage, err.emit_to_string(&source)))?;

        Validator::new(self.flags, Capabilities::empty())
            .validate(&module)
            .map_err(|err| RenderError::compile(stage, err.into_inner().to_string()))?;

        let entry_index = module
            .entry_points
            .iter()
            .position(|ep| ep.name == desc.entry_point && ep.stage == stage.naga_stage())
            .ok_or_else(|| {
                RenderError::compile(
                    stage,
                    format!(
                        "`{}` has no {stage} entry point named `{}`",
                        desc.file_name, desc.entry_point
                    ),
                )
            })?;

        log::info!("compiled {stage} program {desc}");
        Ok(CompiledProgram::new(desc.clone(), source, module, entry_index))
    }

    fn load(&self, desc: &ProgramDesc) -> Result<String> {
        match &self.sources {
            Sources::Directory(root) => read_program(root, desc),
            Sources::Memory(table) => table.get(&desc.file_name).cloned().ok_or_else(|| {
                RenderError::compile(desc.stage, format!("no program named `{}`", desc.file_name))
            }),
        }
    }
}

impl ProgramCompiler for WgslCompiler {
    fn compile(&self, desc: &ProgramDesc) -> Result<CompiledProgram> {
        let source = self.load(desc)?;
        self.compile_source(desc, source)
    }
}

fn read_program(root: &Path, desc: &ProgramDesc) -> Result<String> {
    let path = root.join(&desc.file_name);
    std::fs::read_to_string(&path).map_err(|err| {
        RenderError::compile(desc.stage, format!("failed to read {}: {err}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{ProgramSet, ShaderStage};

    fn builtin_source(name: &str) -> &'static str {
        match name {
            BUILTIN_VERTEX => include_str!("programs/vertex.wgsl"),
            BUILTIN_GEOMETRY => include_str!("programs/geometry.wgsl"),
            _ => include_str!("programs/pixel.wgsl"),
        }
    }

    // ── bundled programs ──────────────────────────────────────────────────

    #[test]
    fn builtin_programs_compile() {
        let compiler = WgslCompiler::builtin();
        let set = ProgramSet::default();
        for desc in [&set.vertex, &set.geometry, &set.pixel] {
            let program = compiler.compile(desc).unwrap();
            assert_eq!(program.stage(), desc.stage);
            assert_eq!(program.entry_point().stage, desc.stage.naga_stage());
        }
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn missing_program_names_its_stage() {
        let compiler =
            WgslCompiler::from_sources([(BUILTIN_VERTEX, builtin_source(BUILTIN_VERTEX))]);
        let err = compiler.compile(&ProgramDesc::geometry("geometry.wgsl")).unwrap_err();
        assert_eq!(err.shader_stage(), Some(ShaderStage::Geometry));
    }

    #[test]
    fn missing_file_in_directory_is_a_compile_error() {
        let dir = std::env::temp_dir().join("prism-engine-no-such-shader-dir");
        let compiler = WgslCompiler::from_dir(&dir);
        let err = compiler.compile(&ProgramDesc::pixel("pixel.wgsl")).unwrap_err();
        match err {
            RenderError::ShaderCompile { stage, diagnostic } => {
                assert_eq!(stage, ShaderStage::Pixel);
                assert!(diagnostic.unwrap().contains("failed to read"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn syntax_error_carries_diagnostic_text() {
        let compiler = WgslCompiler::from_sources([("broken.wgsl", "fn main( {")]);
        let err = compiler.compile(&ProgramDesc::vertex("broken.wgsl")).unwrap_err();
        match err {
            RenderError::ShaderCompile { stage, diagnostic } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!diagnostic.unwrap().is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_entry_point_is_rejected() {
        let compiler = WgslCompiler::builtin();
        let desc = ProgramDesc::new(ShaderStage::Vertex, BUILTIN_VERTEX, "vs_main", "vs_4_0");
        let err = compiler.compile(&desc).unwrap_err();
        assert_eq!(err.shader_stage(), Some(ShaderStage::Vertex));
    }

    #[test]
    fn entry_point_of_another_stage_is_rejected() {
        // `pixel.wgsl::main` is a fragment entry point.
        let compiler = WgslCompiler::builtin();
        let desc = ProgramDesc::new(ShaderStage::Vertex, BUILTIN_PIXEL, "main", "vs_4_0");
        assert!(compiler.compile(&desc).is_err());
    }

    #[test]
    fn mismatched_target_profile_is_rejected() {
        let compiler = WgslCompiler::builtin();
        let desc = ProgramDesc::new(ShaderStage::Geometry, BUILTIN_GEOMETRY, "main", "vs_4_0");
        let err = compiler.compile(&desc).unwrap_err();
        assert!(err.to_string().contains("vs_4_0"));
    }
}
