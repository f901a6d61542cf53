use glam::{Mat4, Vec3};

use crate::error::{RenderError, Result};

/// Left-handed look-at camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub at: Vec3,
    pub up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.0, -5.0),
            at: Vec3::new(0.0, 1.0, 0.0),
            up: Vec3::Y,
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye, self.at, self.up)
    }
}

/// Left-handed perspective with a [0, 1] depth range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectionParams {
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            fov_y_radians: std::f32::consts::FRAC_PI_2,
            near: 0.01,
            far: 100.0,
        }
    }
}

impl ProjectionParams {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_lh(self.fov_y_radians, aspect, self.near, self.far)
    }
}

/// `width / height`, rejecting sizes that would yield a non-finite ratio.
pub fn aspect_ratio(width: u32, height: u32) -> Result<f32> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    Ok(width as f32 / height as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_height_is_rejected() {
        assert!(matches!(
            aspect_ratio(640, 0),
            Err(RenderError::InvalidDimensions { width: 640, height: 0 })
        ));
    }

    #[test]
    fn aspect_is_finite_at_the_extremes() {
        for (width, height) in [(1, u32::MAX), (u32::MAX, 1)] {
            let aspect = aspect_ratio(width, height).unwrap();
            assert!(aspect.is_finite() && aspect > 0.0);
            assert!(ProjectionParams::default().matrix(aspect).is_finite());
        }
    }

    #[test]
    fn default_window_aspect() {
        let aspect = aspect_ratio(640, 480).unwrap();
        assert!((aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn camera_looks_down_positive_z() {
        // The look-at target lands on the view-space +Z axis.
        let cam = Camera::default();
        let target = cam.view_matrix().transform_point3(cam.at);
        assert!(target.x.abs() < 1e-5 && target.y.abs() < 1e-5);
        assert!((target.z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let proj = ProjectionParams::default();
        let m = proj.matrix(4.0 / 3.0);
        let near = m.project_point3(Vec3::new(0.0, 0.0, proj.near));
        let far = m.project_point3(Vec3::new(0.0, 0.0, proj.far));
        assert!(near.z.abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }
}
