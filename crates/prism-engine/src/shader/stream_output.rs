use crate::error::{RenderError, Result};

use super::signature::{CaptureRecord, semantic_matches};

/// Upper bound for components of one captured value.
pub const MAX_COMPONENTS: u8 = 4;

/// One captured value of the geometry stage's output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StreamOutputEntry {
    pub stream: u32,
    pub semantic: &'static str,
    pub semantic_index: u32,
    pub start_component: u8,
    pub component_count: u8,
    pub output_slot: u8,
}

impl StreamOutputEntry {
    /// Entry on stream 0, slot 0, starting at component 0.
    pub const fn new(semantic: &'static str, component_count: u8) -> Self {
        Self {
            stream: 0,
            semantic,
            semantic_index: 0,
            start_component: 0,
            component_count,
            output_slot: 0,
        }
    }
}

/// What the geometry stage writes to the capture buffer.
///
/// Fixed when the geometry program is linked; changing it means relinking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutputDeclaration {
    entries: Vec<StreamOutputEntry>,
    /// Per-slot stride overrides in bytes. Empty keeps the packed record stride.
    buffer_strides: Vec<u32>,
    /// Stream sent on to the rasterizer; `None` means no suppression.
    rasterized_stream: Option<u32>,
}

impl StreamOutputDeclaration {
    pub fn new(entries: Vec<StreamOutputEntry>) -> Self {
        Self {
            entries,
            buffer_strides: Vec::new(),
            rasterized_stream: None,
        }
    }

    /// Four-component position and four-component color on a single stream.
    pub fn baseline() -> Self {
        Self::new(vec![
            StreamOutputEntry::new("SV_POSITION", 4),
            StreamOutputEntry::new("COLOR", 4),
        ])
    }

    pub fn with_buffer_stride(mut self, stride: u32) -> Self {
        self.buffer_strides = vec![stride];
        self
    }

    pub fn with_rasterized_stream(mut self, stream: u32) -> Self {
        self.rasterized_stream = Some(stream);
        self
    }

    pub fn entries(&self) -> &[StreamOutputEntry] {
        &self.entries
    }

    /// Bytes per captured vertex, packed.
    pub fn record_stride(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| u64::from(e.component_count) * 4)
            .sum()
    }

    /// Checks the declaration against the geometry program's capture record.
    ///
    /// Counts must agree exactly; a shorter declaration would silently drop
    /// captured attributes. The packed record must also match the program's
    /// array stride, since capacity is budgeted with the declared stride.
    pub fn validate(&self, record: &CaptureRecord) -> Result<()> {
        let values = &record.values;
        if self.entries.is_empty() {
            return Err(mismatch("declaration captures nothing"));
        }

        for entry in &self.entries {
            if entry.stream != 0 {
                return Err(mismatch(format!(
                    "{} targets stream {}, only stream 0 is captured",
                    entry.semantic, entry.stream
                )));
            }
            if entry.output_slot != 0 {
                return Err(mismatch(format!(
                    "{} targets output slot {}, only slot 0 is bound",
                    entry.semantic, entry.output_slot
                )));
            }
            let end = u16::from(entry.start_component) + u16::from(entry.component_count);
            if entry.component_count == 0 || end > u16::from(MAX_COMPONENTS) {
                return Err(mismatch(format!(
                    "{} captures components {}..{end}, outside 0..{MAX_COMPONENTS}",
                    entry.semantic, entry.start_component
                )));
            }
        }

        if self.entries.len() != values.len() {
            return Err(mismatch(format!(
                "declaration has {} entries, geometry program captures {} values",
                self.entries.len(),
                values.len()
            )));
        }

        for (entry, value) in self.entries.iter().zip(values) {
            if !semantic_matches(entry.semantic, &value.name) {
                return Err(mismatch(format!(
                    "{} is declared where the program captures `{}`",
                    entry.semantic, value.name
                )));
            }
            if !value.float || u32::from(entry.component_count) != value.components {
                return Err(mismatch(format!(
                    "{} declares {} components, program captures {}",
                    entry.semantic, entry.component_count, value.components
                )));
            }
        }

        if u64::from(record.stride) != self.record_stride() {
            return Err(mismatch(format!(
                "declared record packs to {} bytes, geometry program writes {}-byte records",
                self.record_stride(),
                record.stride
            )));
        }

        if let Some(&stride) = self.buffer_strides.first() {
            if u64::from(stride) != self.record_stride() {
                return Err(mismatch(format!(
                    "stride override {stride} differs from the {}-byte record",
                    self.record_stride()
                )));
            }
        }

        if let Some(stream) = self.rasterized_stream {
            if stream != 0 {
                return Err(mismatch(format!("rasterized stream {stream} does not exist")));
            }
        }

        Ok(())
    }
}

fn mismatch(reason: impl Into<String>) -> RenderError {
    RenderError::StreamOutputMismatch(reason.into())
}
