use crate::error::{RenderError, Result};
use crate::geometry::Vertex;

use super::signature::{SignatureElement, semantic_matches};

/// One attribute of the vertex record as seen by the vertex program.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InputElement {
    pub semantic: &'static str,
    pub semantic_index: u32,
    pub format: wgpu::VertexFormat,
    pub input_slot: u32,
    /// Byte offset inside the vertex record.
    pub offset: u64,
}

/// Binding between vertex-buffer bytes and vertex-program inputs.
///
/// Element `i` feeds shader location `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLayout {
    elements: Vec<InputElement>,
    stride: u64,
}

impl InputLayout {
    pub fn new(elements: Vec<InputElement>, stride: u64) -> Self {
        Self { elements, stride }
    }

    /// Layout of [`Vertex`]: `POSITION` float3 at 0, `COLOR` float4 at 12.
    pub fn for_vertex() -> Self {
        Self::new(
            vec![
                InputElement {
                    semantic: "POSITION",
                    semantic_index: 0,
                    format: wgpu::VertexFormat::Float32x3,
                    input_slot: 0,
                    offset: std::mem::offset_of!(Vertex, position) as u64,
                },
                InputElement {
                    semantic: "COLOR",
                    semantic_index: 0,
                    format: wgpu::VertexFormat::Float32x4,
                    input_slot: 0,
                    offset: std::mem::offset_of!(Vertex, color) as u64,
                },
            ],
            Vertex::STRIDE,
        )
    }

    pub fn elements(&self) -> &[InputElement] {
        &self.elements
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.elements
            .iter()
            .enumerate()
            .map(|(location, el)| wgpu::VertexAttribute {
                format: el.format,
                offset: el.offset,
                shader_location: location as u32,
            })
            .collect()
    }

    /// Checks the layout against the record it describes and the vertex
    /// program's input signature.
    pub fn validate(&self, inputs: &[SignatureElement]) -> Result<()> {
        if self.elements.is_empty() {
            return Err(mismatch("layout has no elements"));
        }

        let mut covered = 0u64;
        for el in &self.elements {
            if el.input_slot != 0 {
                return Err(mismatch(format!(
                    "{} is bound to slot {}, only slot 0 carries vertices",
                    el.semantic, el.input_slot
                )));
            }
            let size = el.format.size();
            if el.offset < covered || el.offset + size > self.stride {
                return Err(mismatch(format!(
                    "{} at offset {} ({} bytes) does not fit a {}-byte record",
                    el.semantic, el.offset, size, self.stride
                )));
            }
            covered = el.offset + size;
        }

        if inputs.len() != self.elements.len() {
            return Err(mismatch(format!(
                "layout supplies {} elements, program expects {}",
                self.elements.len(),
                inputs.len()
            )));
        }

        for (location, el) in self.elements.iter().enumerate() {
            let location = location as u32;
            let Some(input) = inputs.iter().find(|i| i.location == Some(location)) else {
                return Err(mismatch(format!(
                    "{} feeds location {location}, which the program does not read",
                    el.semantic
                )));
            };

            let Some(components) = float_components(el.format) else {
                return Err(mismatch(format!(
                    "{} uses {:?}, only 32-bit float formats are supported",
                    el.semantic, el.format
                )));
            };

            if !input.float || input.components != components {
                return Err(mismatch(format!(
                    "{} supplies {components} floats, program input `{}` expects {} {}",
                    el.semantic,
                    input.name,
                    input.components,
                    if input.float { "floats" } else { "integers" }
                )));
            }

            if !semantic_matches(el.semantic, &input.name) {
                return Err(mismatch(format!(
                    "location {location} is {} in the layout but `{}` in the program",
                    el.semantic, input.name
                )));
            }
        }

        Ok(())
    }
}

fn float_components(format: wgpu::VertexFormat) -> Option<u32> {
    match format {
        wgpu::VertexFormat::Float32 => Some(1),
        wgpu::VertexFormat::Float32x2 => Some(2),
        wgpu::VertexFormat::Float32x3 => Some(3),
        wgpu::VertexFormat::Float32x4 => Some(4),
        _ => None,
    }
}

fn mismatch(reason: impl Into<String>) -> RenderError {
    RenderError::LayoutMismatch(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, location: u32, components: u32) -> SignatureElement {
        SignatureElement {
            name: name.to_string(),
            location: Some(location),
            components,
            float: true,
        }
    }

    fn expected_inputs() -> Vec<SignatureElement> {
        vec![input("position", 0, 3), input("color", 1, 4)]
    }

    // ── vertex record ─────────────────────────────────────────────────────

    #[test]
    fn vertex_layout_matches_record() {
        let layout = InputLayout::for_vertex();
        assert_eq!(layout.stride(), 28);
        assert_eq!(layout.elements()[0].offset, 0);
        assert_eq!(layout.elements()[1].offset, 12);
        assert!(layout.validate(&expected_inputs()).is_ok());
    }

    #[test]
    fn attributes_follow_element_order() {
        let attrs = InputLayout::for_vertex().attributes();
        assert_eq!(attrs[0].shader_location, 0);
        assert_eq!(attrs[1].shader_location, 1);
        assert_eq!(attrs[1].format, wgpu::VertexFormat::Float32x4);
    }

    // ── mismatches ────────────────────────────────────────────────────────

    #[test]
    fn component_count_mismatch_fails() {
        let inputs = vec![input("position", 0, 3), input("color", 1, 3)];
        let err = InputLayout::for_vertex().validate(&inputs).unwrap_err();
        assert!(matches!(err, RenderError::LayoutMismatch(_)));
    }

    #[test]
    fn missing_program_input_fails() {
        let inputs = vec![input("position", 0, 3)];
        assert!(InputLayout::for_vertex().validate(&inputs).is_err());
    }

    #[test]
    fn semantic_name_mismatch_fails() {
        let inputs = vec![input("position", 0, 3), input("normal", 1, 4)];
        assert!(InputLayout::for_vertex().validate(&inputs).is_err());
    }

    #[test]
    fn element_past_stride_fails() {
        let mut elements = InputLayout::for_vertex().elements().to_vec();
        elements[1].offset = 16;
        let layout = InputLayout::new(elements, Vertex::STRIDE);
        assert!(layout.validate(&expected_inputs()).is_err());
    }

    #[test]
    fn overlapping_elements_fail() {
        let mut elements = InputLayout::for_vertex().elements().to_vec();
        elements[1].offset = 8;
        let layout = InputLayout::new(elements, Vertex::STRIDE);
        assert!(layout.validate(&expected_inputs()).is_err());
    }

    #[test]
    fn integer_input_fails() {
        let mut inputs = expected_inputs();
        inputs[1].float = false;
        assert!(InputLayout::for_vertex().validate(&inputs).is_err());
    }
}
