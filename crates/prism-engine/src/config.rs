//! Renderer configuration.
//!
//! Plain structs with defaults; no configuration file. A few values can be
//! overridden from the environment with [`RenderConfig::with_env_overrides`].

use std::path::PathBuf;

use crate::device::GpuInit;
use crate::geometry::{DEFAULT_CAPTURE_CAPACITY, OverflowPolicy};
use crate::shader::{ProgramSet, StreamOutputDeclaration, WgslCompiler};
use crate::transform::{Camera, ProjectionParams};

/// Directory holding WGSL programs that replace the bundled ones by file name.
pub const ENV_SHADER_DIR: &str = "PRISM_SHADER_DIR";
/// Capture-buffer capacity in bytes.
pub const ENV_SO_CAPACITY: &str = "PRISM_SO_CAPACITY";

/// Where program sources are loaded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ShaderSourceKind {
    /// Programs bundled into the engine.
    #[default]
    Builtin,
    Directory(PathBuf),
}

impl ShaderSourceKind {
    pub fn compiler(&self) -> WgslCompiler {
        match self {
            Self::Builtin => WgslCompiler::builtin(),
            Self::Directory(root) => WgslCompiler::from_dir(root),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutputConfig {
    pub capacity_bytes: u64,
    pub overflow: OverflowPolicy,
    pub declaration: StreamOutputDeclaration,
}

impl Default for StreamOutputConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_CAPTURE_CAPACITY,
            overflow: OverflowPolicy::Reject,
            declaration: StreamOutputDeclaration::baseline(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub title: String,
    /// Client-area width in physical pixels.
    pub width: u32,
    pub height: u32,
    pub clear_color: [f32; 4],
    pub camera: Camera,
    pub projection: ProjectionParams,
    pub programs: ProgramSet,
    pub shader_source: ShaderSourceKind,
    pub stream_output: StreamOutputConfig,
    pub device: GpuInit,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "Hello world".to_string(),
            width: 640,
            height: 480,
            clear_color: [0.0, 0.125, 0.2, 1.0],
            camera: Camera::default(),
            projection: ProjectionParams::default(),
            programs: ProgramSet::default(),
            shader_source: ShaderSourceKind::Builtin,
            stream_output: StreamOutputConfig::default(),
            device: GpuInit::default(),
        }
    }
}

impl RenderConfig {
    /// Applies `PRISM_SHADER_DIR` and `PRISM_SO_CAPACITY` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Values that do not parse are logged
    /// and ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(ENV_SHADER_DIR).filter(|d| !d.trim().is_empty()) {
            log::info!("loading programs from {dir}");
            self.shader_source = ShaderSourceKind::Directory(PathBuf::from(dir));
        }

        if let Some(raw) = lookup(ENV_SO_CAPACITY) {
            match raw.trim().parse::<u64>() {
                Ok(bytes) => {
                    log::info!("stream-output capacity set to {bytes} bytes");
                    self.stream_output.capacity_bytes = bytes;
                }
                Err(err) => log::warn!("ignoring {ENV_SO_CAPACITY}={raw:?}: {err}"),
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    // ── defaults ──────────────────────────────────────────────────────────

    #[test]
    fn defaults_describe_the_hello_world_window() {
        let config = RenderConfig::default();
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.clear_color, [0.0, 0.125, 0.2, 1.0]);
        assert_eq!(config.shader_source, ShaderSourceKind::Builtin);
        assert_eq!(config.stream_output.capacity_bytes, 1_000_000);
        assert_eq!(config.stream_output.overflow, OverflowPolicy::Reject);
        assert_eq!(config.device.present_mode, wgpu::PresentMode::AutoNoVsync);
    }

    // ── overrides ─────────────────────────────────────────────────────────

    #[test]
    fn shader_dir_override_switches_source() {
        let config =
            RenderConfig::default().with_overrides(env(&[(ENV_SHADER_DIR, "/tmp/programs")]));
        assert_eq!(
            config.shader_source,
            ShaderSourceKind::Directory(PathBuf::from("/tmp/programs"))
        );
    }

    #[test]
    fn capacity_override_is_parsed() {
        let config = RenderConfig::default().with_overrides(env(&[(ENV_SO_CAPACITY, " 4096 ")]));
        assert_eq!(config.stream_output.capacity_bytes, 4096);
    }

    #[test]
    fn unparsable_capacity_is_ignored() {
        let config = RenderConfig::default().with_overrides(env(&[(ENV_SO_CAPACITY, "lots")]));
        assert_eq!(config.stream_output.capacity_bytes, DEFAULT_CAPTURE_CAPACITY);
    }

    #[test]
    fn blank_shader_dir_is_ignored() {
        let config = RenderConfig::default().with_overrides(env(&[(ENV_SHADER_DIR, "  ")]));
        assert_eq!(config.shader_source, ShaderSourceKind::Builtin);
    }
}
