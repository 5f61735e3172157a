// extensions/curve.rs
//
// Parametric paths for objects and cameras.

use glam::Vec3;

pub trait Curve {
    /// Point at parameter `t`, clamped to [0, 1].
    fn point_at(&self, t: f32) -> Vec3;

    /// `segments + 1` evenly spaced points, endpoints included.
    fn sample(&self, segments: usize) -> Vec<Vec3> {
        let n = segments.max(1);
        (0..=n).map(|i| self.point_at(i as f32 / n as f32)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
}

impl QuadraticBezier {
    pub fn new(start: Vec3, control: Vec3, end: Vec3) -> Self {
        Self { start, control, end }
    }

    /// Arc through the midpoint of `start`..`end`, lifted by `lift`.
    pub fn arched(start: Vec3, end: Vec3, lift: Vec3) -> Self {
        Self::new(start, (start + end) * 0.5 + lift, end)
    }
}

impl Curve for QuadraticBezier {
    fn point_at(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        self.start * (u * u) + self.control * (2.0 * u * t) + self.end * (t * t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
}

impl CubicBezier {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self { p0, p1, p2, p3 }
    }
}

impl Curve for CubicBezier {
    fn point_at(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        self.p0 * (u * u * u)
            + self.p1 * (3.0 * u * u * t)
            + self.p2 * (3.0 * u * t * t)
            + self.p3 * (t * t * t)
    }
}

/// Point on a horizontal circle around the Y axis.
#[inline]
pub fn orbit(angle: f32, radius: f32, height: f32) -> Vec3 {
    Vec3::new(angle.sin() * radius, height, angle.cos() * radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn cubic_hits_endpoints() {
        let c = CubicBezier::new(
            Vec3::new(-5.0, 1.0, 0.0),
            Vec3::new(-2.0, 3.0, 0.0),
            Vec3::new(2.0, 3.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
        );
        assert!(close(c.point_at(0.0), c.p0));
        assert!(close(c.point_at(1.0), c.p3));
        assert!(close(c.point_at(2.0), c.p3));
    }

    #[test]
    fn quadratic_midpoint() {
        let q = QuadraticBezier::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        assert!(close(q.point_at(0.5), Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn sample_includes_endpoints() {
        let q = QuadraticBezier::arched(Vec3::ZERO, Vec3::X, Vec3::Y);
        let pts = q.sample(20);
        assert_eq!(pts.len(), 21);
        assert!(close(pts[0], Vec3::ZERO));
        assert!(close(pts[20], Vec3::X));
    }

    #[test]
    fn orbit_keeps_radius() {
        let p = orbit(1.234, 15.0, 4.0);
        assert!((Vec3::new(p.x, 0.0, p.z).length() - 15.0).abs() < 1e-4);
        assert_eq!(p.y, 4.0);
    }
}
