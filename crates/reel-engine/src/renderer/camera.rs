use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::api::config::CameraConfig;

/// Perspective camera passed explicitly to shows through their frame.
///
/// Remembers a home pose so a disposed show never leaves it displaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub home_position: Vec3,
    pub home_target: Vec3,
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_projection: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl Camera3D {
    pub fn new(config: &CameraConfig) -> Self {
        let position = Vec3::from(config.position);
        let target = Vec3::from(config.target);
        Self {
            position,
            target,
            up: Vec3::Y,
            fov: config.fov,
            aspect: config.aspect,
            near: config.near,
            far: config.far,
            home_position: position,
            home_target: target,
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Move a fraction `factor` of the way toward `position`.
    pub fn approach(&mut self, position: Vec3, factor: f32) {
        self.position += (position - self.position) * factor.clamp(0.0, 1.0);
    }

    /// Restore the home pose.
    pub fn reset(&mut self) {
        self.position = self.home_position;
        self.target = self.home_target;
        self.up = Vec3::Y;
    }

    pub fn is_home(&self) -> bool {
        self.position == self.home_position && self.target == self.home_target
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_projection: self.view_projection().to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
        }
    }
}

impl Default for Camera3D {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_home() {
        let mut cam = Camera3D::default();
        cam.set_position(Vec3::new(3.0, 4.0, 5.0));
        cam.look_at(Vec3::ONE);
        assert!(!cam.is_home());
        cam.reset();
        assert!(cam.is_home());
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn approach_moves_partway() {
        let mut cam = Camera3D::default();
        cam.approach(Vec3::new(0.0, 0.0, 20.0), 0.5);
        assert!((cam.position.z - 15.0).abs() < 1e-5);
    }

    #[test]
    fn target_projects_to_center() {
        let cam = Camera3D::default();
        let clip = cam.view_projection() * cam.target.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }
}
