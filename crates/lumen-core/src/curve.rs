//! Interpolation and quadratic Bézier helpers

use glam::Vec3;

/// Linear interpolation between two floats
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear interpolation between two RGBA colors
pub fn lerp_color(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ]
}

/// Evaluate a quadratic Bézier `start -> control -> end` at `t` in [0, 1]
pub fn quadratic_bezier(start: Vec3, control: Vec3, end: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    start * (u * u) + control * (2.0 * u * t) + end * (t * t)
}

/// A unit vector perpendicular to `dir`. Falls back to +X for a zero input.
pub fn perpendicular(dir: Vec3) -> Vec3 {
    let d = dir.normalize_or_zero();
    if d == Vec3::ZERO {
        return Vec3::X;
    }
    let helper = if d.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
    d.cross(helper).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_f32_endpoints() {
        assert!((lerp_f32(0.0, 10.0, 0.0) - 0.0).abs() < 1e-6);
        assert!((lerp_f32(0.0, 10.0, 1.0) - 10.0).abs() < 1e-6);
        assert!((lerp_f32(0.0, 10.0, 0.5) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn lerp_color_midpoint() {
        let mid = lerp_color([1.0; 4], [0.0; 4], 0.5);
        for c in &mid {
            assert!((*c - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn bezier_hits_endpoints_and_bends_toward_control() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 0.0, 0.0);
        let c = Vec3::new(5.0, 4.0, 0.0);
        assert!(quadratic_bezier(a, c, b, 0.0).distance(a) < 1e-6);
        assert!(quadratic_bezier(a, c, b, 1.0).distance(b) < 1e-6);
        // Midpoint of a quadratic sits halfway between chord midpoint and control
        let mid = quadratic_bezier(a, c, b, 0.5);
        assert!((mid.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn perpendicular_is_orthogonal_unit() {
        for dir in [Vec3::X, Vec3::Y, Vec3::new(1.0, 2.0, -3.0)] {
            let p = perpendicular(dir);
            assert!(p.dot(dir.normalize()).abs() < 1e-5);
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
        assert_eq!(perpendicular(Vec3::ZERO), Vec3::X);
    }
}
