//! Surface types shared between the host and the subsystem

use serde::{Deserialize, Serialize};

/// Reference area used to scale particle budgets (a 1080p surface)
pub const REFERENCE_AREA: f32 = 1920.0 * 1080.0;

/// Drawable surface size in CSS/logical pixels plus the device pixel ratio
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    pub const fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Logical area in pixels
    pub fn area(&self) -> f32 {
        self.width as f32 * self.height as f32
    }

    /// Area relative to a 1080p surface, clamped to `[min, max]`
    pub fn area_factor(&self, min: f32, max: f32) -> f32 {
        (self.area() / REFERENCE_AREA).max(min).min(max)
    }

    /// Width / height, 1.0 for a degenerate surface
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_factor_is_clamped() {
        let small = Viewport::new(320, 240, 2.0);
        assert!((small.area_factor(0.35, 1.0) - 0.35).abs() < 1e-6);

        let huge = Viewport::new(7680, 4320, 1.0);
        assert!((huge.area_factor(0.35, 1.0) - 1.0).abs() < 1e-6);

        let hd = Viewport::default();
        assert!((hd.area_factor(0.0, 10.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_aspect_ratio() {
        assert_eq!(Viewport::new(100, 0, 1.0).aspect_ratio(), 1.0);
        assert!((Viewport::new(200, 100, 1.0).aspect_ratio() - 2.0).abs() < 1e-6);
    }
}
