//! Perspective camera for scene rendering.
//!
//! Every scene owns one [`Camera`]. Its aspect ratio tracks the output size
//! through [`Camera::set_aspect`], and the sequencer moves it along its view
//! axis with [`Camera::advance`] during the exit dolly.

use glam::{Mat4, Vec3};

/// Vertical field of view used when a scene is created.
pub const DEFAULT_FOV_DEGREES: f32 = 60.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Normalized view direction.
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: DEFAULT_FOV_DEGREES.to_radians(),
            aspect: 16.0 / 9.0,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default camera with its aspect derived from an output size.
    pub fn for_viewport(width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.set_aspect(width, height);
        camera
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn looking_at(mut self, target: Vec3) -> Self {
        let dir = target - self.position;
        if dir.length_squared() > f32::EPSILON {
            self.forward = dir.normalize();
        }
        self
    }

    pub fn with_fov_degrees(mut self, degrees: f32) -> Self {
        self.fov = degrees.to_radians();
        self
    }

    /// Sets the aspect ratio to `width / height`. Zero-height sizes are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Moves the camera along its view axis.
    pub fn advance(&mut self, distance: f32) {
        self.position += self.forward * distance;
    }

    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_aspect() {
        let camera = Camera::for_viewport(1920, 1080);
        assert!((camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
        assert!((camera.fov - 60f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn zero_height_keeps_previous_aspect() {
        let mut camera = Camera::for_viewport(800, 400);
        camera.set_aspect(800, 0);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn advance_moves_along_view_axis() {
        let mut camera = Camera::new().at(Vec3::new(0.0, 0.0, 8.0));
        camera.advance(2.5);
        assert!((camera.position.z - 5.5).abs() < 1e-6);
        assert_eq!(camera.position.x, 0.0);
    }

    #[test]
    fn origin_projects_to_center() {
        let camera = Camera::for_viewport(640, 480);
        let clip = camera.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
