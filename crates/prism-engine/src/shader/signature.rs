//! Entry-point signature reflection.
//!
//! Reads just enough of a compiled module to check the input layout and the
//! stream-output declaration before any device object exists.

use naga::{AddressSpace, ArraySize, Binding, ScalarKind, StorageAccess, TypeInner};

use super::program::CompiledProgram;

/// One value in a program's input or capture signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureElement {
    pub name: String,
    /// Shader location for vertex inputs; `None` for capture record members.
    pub location: Option<u32>,
    pub components: u32,
    pub float: bool,
}

/// Compares a semantic (`POSITION`, `SV_Position`, `COLOR`) with a program-side name.
pub fn semantic_matches(semantic: &str, name: &str) -> bool {
    let semantic = semantic.to_ascii_lowercase();
    let semantic = semantic.strip_prefix("sv_").unwrap_or(&semantic);
    semantic == name.to_ascii_lowercase()
}

/// Location-bound inputs of the vertex entry point, sorted by location.
pub(crate) fn vertex_inputs(program: &CompiledProgram) -> Vec<SignatureElement> {
    let module = program.module();
    let mut inputs = Vec::new();

    for arg in &program.entry_point().function.arguments {
        match &arg.binding {
            Some(Binding::Location { location, .. }) => {
                if let Some(el) = element(module, arg.name.as_deref(), Some(*location), arg.ty) {
                    inputs.push(el);
                }
            }
            Some(_) => {}
            None => {
                let TypeInner::Struct { members, .. } = &module.types[arg.ty].inner else {
                    continue;
                };
                for member in members {
                    if let Some(Binding::Location { location, .. }) = &member.binding {
                        if let Some(el) =
                            element(module, member.name.as_deref(), Some(*location), member.ty)
                        {
                            inputs.push(el);
                        }
                    }
                }
            }
        }
    }

    inputs.sort_by_key(|el| el.location);
    inputs
}

/// The record a geometry program appends to its capture buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    pub values: Vec<SignatureElement>,
    /// Array stride in bytes under WGSL storage layout rules.
    pub stride: u32,
}

/// Reflects the capture record of a geometry program.
///
/// The capture buffer is the writable, runtime-sized storage array of structs.
/// Buffers of atomics (counters) are skipped.
pub(crate) fn capture_record(program: &CompiledProgram) -> Option<CaptureRecord> {
    let module = program.module();

    module.global_variables.iter().find_map(|(_, var)| {
        let AddressSpace::Storage { access } = var.space else {
            return None;
        };
        if !access.contains(StorageAccess::STORE) {
            return None;
        }

        let TypeInner::Array {
            base,
            size: ArraySize::Dynamic,
            stride,
        } = module.types[var.ty].inner
        else {
            return None;
        };
        let TypeInner::Struct { members, .. } = &module.types[base].inner else {
            return None;
        };

        let values = members
            .iter()
            .map(|m| element(module, m.name.as_deref(), None, m.ty))
            .collect::<Option<Vec<_>>>()?;
        Some(CaptureRecord { values, stride })
    })
}

fn element(
    module: &naga::Module,
    name: Option<&str>,
    location: Option<u32>,
    ty: naga::Handle<naga::Type>,
) -> Option<SignatureElement> {
    let (components, scalar) = match module.types[ty].inner {
        TypeInner::Scalar(scalar) => (1, scalar),
        TypeInner::Vector { size, scalar } => (size as u32, scalar),
        _ => return None,
    };

    Some(SignatureElement {
        name: name.unwrap_or_default().to_string(),
        location,
        components,
        float: scalar.kind == ScalarKind::Float,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{ProgramCompiler, ProgramDesc, WgslCompiler};

    fn compile(desc: ProgramDesc) -> CompiledProgram {
        WgslCompiler::builtin().compile(&desc).unwrap()
    }

    // ── semantics ─────────────────────────────────────────────────────────

    #[test]
    fn semantic_matching_ignores_case_and_sv_prefix() {
        assert!(semantic_matches("POSITION", "position"));
        assert!(semantic_matches("SV_POSITION", "position"));
        assert!(semantic_matches("COLOR", "Color"));
        assert!(!semantic_matches("COLOR", "colour"));
    }

    // ── reflection ────────────────────────────────────────────────────────

    #[test]
    fn vertex_inputs_of_bundled_program() {
        let inputs = vertex_inputs(&compile(ProgramDesc::vertex("vertex.wgsl")));
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].name, "position");
        assert_eq!(inputs[0].location, Some(0));
        assert_eq!(inputs[0].components, 3);
        assert_eq!(inputs[1].name, "color");
        assert_eq!(inputs[1].location, Some(1));
        assert_eq!(inputs[1].components, 4);
        assert!(inputs.iter().all(|i| i.float));
    }

    #[test]
    fn capture_record_of_bundled_geometry_program() {
        let record = capture_record(&compile(ProgramDesc::geometry("geometry.wgsl"))).unwrap();
        let names: Vec<_> = record.values.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["position", "color"]);
        assert!(record.values.iter().all(|e| e.components == 4 && e.float));
        assert_eq!(record.stride, 32);
    }

    #[test]
    fn capture_stride_follows_wgsl_alignment() {
        let source = r#"
            struct StreamVertex { position: vec3<f32>, color: vec4<f32> }
            @group(0) @binding(3) var<storage, read_write> captured: array<StreamVertex>;
            @compute @workgroup_size(64)
            fn main(@builtin(global_invocation_id) id: vec3<u32>) {
                captured[id.x] = StreamVertex(vec3<f32>(0.0), vec4<f32>(1.0));
            }
        "#;
        let compiler = WgslCompiler::from_sources([("packed.wgsl", source)]);
        let program = compiler.compile(&ProgramDesc::geometry("packed.wgsl")).unwrap();
        let record = capture_record(&program).unwrap();
        assert_eq!(record.values[0].components, 3);
        // vec4 member is aligned to 16, so the record is 32 bytes, not 28.
        assert_eq!(record.stride, 32);
    }

    #[test]
    fn vertex_program_has_no_capture_record() {
        assert!(capture_record(&compile(ProgramDesc::vertex("vertex.wgsl"))).is_none());
    }
}
