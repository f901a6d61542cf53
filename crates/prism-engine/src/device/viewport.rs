/// Rasterizer viewport in physical pixels with a depth range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Covers a `width` x `height` target with the full [0, 1] depth range.
    #[inline]
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.width.is_finite()
            && self.height.is_finite()
            && (0.0..=1.0).contains(&self.min_depth)
            && (0.0..=1.0).contains(&self.max_depth)
            && self.min_depth <= self.max_depth
    }

    /// Applies the viewport to a render pass.
    pub fn apply(self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(
            self.x,
            self.y,
            self.width,
            self.height,
            self.min_depth,
            self.max_depth,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_viewport_covers_window() {
        let vp = Viewport::full(640, 480);
        assert_eq!((vp.x, vp.y), (0.0, 0.0));
        assert_eq!((vp.width, vp.height), (640.0, 480.0));
        assert_eq!((vp.min_depth, vp.max_depth), (0.0, 1.0));
        assert!(vp.is_valid());
    }

    #[test]
    fn empty_viewport_is_invalid() {
        assert!(!Viewport::full(0, 480).is_valid());
    }

    #[test]
    fn inverted_depth_range_is_invalid() {
        let vp = Viewport {
            min_depth: 1.0,
            max_depth: 0.0,
            ..Viewport::full(640, 480)
        };
        assert!(!vp.is_valid());
    }
}
