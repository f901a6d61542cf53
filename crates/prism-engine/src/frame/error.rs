use thiserror::Error;

/// Steady-state frame failures.
///
/// Surface errors are expected and mapped to a recovery action by the caller.
/// The other variants mean the command sequence itself is wrong.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("back buffer unavailable: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("{command} issued out of order: {reason}")]
    OutOfOrder {
        command: &'static str,
        reason: &'static str,
    },

    #[error("draw of {count} indices from {first} exceeds the {available}-index buffer")]
    DrawOutOfRange { first: u32, count: u32, available: u32 },
}

impl FrameError {
    pub(crate) fn out_of_order(command: &'static str, reason: &'static str) -> Self {
        Self::OutOfOrder { command, reason }
    }
}
