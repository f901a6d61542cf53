use glam::Mat4;

use crate::error::Result;

use super::camera::{Camera, ProjectionParams, aspect_ratio};
use super::constants::FrameConstants;

/// World, view and projection matrices in column-vector convention.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransformState {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl TransformState {
    /// Identity world, camera view, perspective for `width / height`.
    pub fn new(
        width: u32,
        height: u32,
        camera: &Camera,
        projection: &ProjectionParams,
    ) -> Result<Self> {
        let aspect = aspect_ratio(width, height)?;
        Ok(Self {
            world: Mat4::IDENTITY,
            view: camera.view_matrix(),
            projection: projection.matrix(aspect),
        })
    }

    pub fn is_finite(&self) -> bool {
        self.world.is_finite() && self.view.is_finite() && self.projection.is_finite()
    }
}

/// Produces the constants uploaded each frame.
///
/// The scene is static, so every refresh yields the same matrices; the
/// upload still happens every frame.
#[derive(Debug, Clone)]
pub struct FrameConstantUpdater {
    state: TransformState,
}

impl FrameConstantUpdater {
    pub fn new(
        width: u32,
        height: u32,
        camera: &Camera,
        projection: &ProjectionParams,
    ) -> Result<Self> {
        Ok(Self {
            state: TransformState::new(width, height, camera, projection)?,
        })
    }

    pub fn state(&self) -> &TransformState {
        &self.state
    }

    /// Matrices for the next frame.
    pub fn refresh(&mut self) -> &TransformState {
        &self.state
    }

    /// Upload record for the next frame.
    pub fn next_constants(&mut self) -> FrameConstants {
        FrameConstants::from_state(self.refresh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    fn default_state() -> TransformState {
        TransformState::new(640, 480, &Camera::default(), &ProjectionParams::default()).unwrap()
    }

    #[test]
    fn default_matrices_are_finite() {
        let state = default_state();
        assert!(state.is_finite());
        assert_eq!(state.world, Mat4::IDENTITY);
    }

    #[test]
    fn extreme_aspect_ratios_stay_finite() {
        for (width, height) in [(1, 1), (1, u32::MAX), (u32::MAX, 1), (u32::MAX, u32::MAX)] {
            let state =
                TransformState::new(width, height, &Camera::default(), &ProjectionParams::default())
                    .unwrap();
            assert!(state.is_finite(), "{width}x{height}");
        }
    }

    #[test]
    fn zero_height_fails_before_any_matrix_is_built() {
        let err = TransformState::new(640, 0, &Camera::default(), &ProjectionParams::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidDimensions { .. }));
    }

    #[test]
    fn cube_lies_inside_the_depth_range() {
        let state = default_state();
        let clip = state.projection * state.view * state.world;
        for corner in crate::geometry::CUBE_VERTICES {
            let p = clip.project_point3(glam::Vec3::from_array(corner.position));
            assert!((0.0..=1.0).contains(&p.z), "corner depth {}", p.z);
        }
    }

    #[test]
    fn refresh_is_stable_across_frames() {
        let mut updater =
            FrameConstantUpdater::new(640, 480, &Camera::default(), &ProjectionParams::default())
                .unwrap();
        let first = updater.next_constants();
        let second = updater.next_constants();
        assert_eq!(first, second);
    }
}
