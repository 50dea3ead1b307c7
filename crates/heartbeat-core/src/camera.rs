//! Perspective camera and trackball-style controls.
//!
//! These types avoid platform APIs; front-ends feed pointer deltas and wheel
//! steps in, the renderer reads matrices out.

use crate::constants::*;
use glam::{Mat4, Quat, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy_radians: CAMERA_FOV_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space right and up axes, used to expand point billboards.
    pub fn billboard_axes(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.eye).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward);
        (right, up)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).length()
    }
}

/// Rotate around the target by dragging, dolly with the wheel, no panning.
#[derive(Clone, Debug)]
pub struct TrackballControls {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for TrackballControls {
    fn default() -> Self {
        Self {
            rotate_speed: CONTROLS_ROTATE_SPEED,
            zoom_speed: CONTROLS_ZOOM_SPEED,
            min_distance: CONTROLS_MIN_DISTANCE,
            max_distance: CONTROLS_MAX_DISTANCE,
        }
    }
}

impl TrackballControls {
    /// `dx`, `dy` are pointer deltas normalized by the viewport height, with
    /// `dy` positive downwards as reported by the host.
    pub fn rotate(&self, camera: &mut Camera, dx: f32, dy: f32) {
        let angle = (dx * dx + dy * dy).sqrt() * self.rotate_speed;
        if angle <= f32::EPSILON {
            return;
        }
        let offset = camera.eye - camera.target;
        let (right, up) = camera.billboard_axes();
        let drag = right * dx - up * dy;
        let axis = drag.cross(offset).normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        let q = Quat::from_axis_angle(axis, angle);
        camera.eye = camera.target + q * offset;
        camera.up = (q * camera.up).normalize();
    }

    /// Positive `steps` zoom out. Distance stays within `[min, max]`.
    pub fn zoom(&self, camera: &mut Camera, steps: f32) {
        let offset = camera.eye - camera.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        let factor = self.zoom_speed.powf(steps);
        let clamped = (distance * factor).clamp(self.min_distance, self.max_distance);
        camera.eye = camera.target + offset * (clamped / distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped_to_distance_range() {
        let controls = TrackballControls::default();
        let mut cam = Camera::default();
        controls.zoom(&mut cam, 50.0);
        assert!((cam.distance() - CONTROLS_MAX_DISTANCE).abs() < 1e-4);
        controls.zoom(&mut cam, -50.0);
        assert!((cam.distance() - CONTROLS_MIN_DISTANCE).abs() < 1e-4);
    }

    #[test]
    fn rotation_keeps_distance_and_target() {
        let controls = TrackballControls::default();
        let mut cam = Camera::default();
        let d0 = cam.distance();
        controls.rotate(&mut cam, 0.3, -0.1);
        assert!((cam.distance() - d0).abs() < 1e-4);
        assert_eq!(cam.target, Vec3::ZERO);
        assert!(cam.eye.x.abs() > 1e-3);
    }

    #[test]
    fn viewport_updates_aspect_only() {
        let mut cam = Camera::default();
        let eye = cam.eye;
        cam.set_viewport(1920, 1080);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-5);
        cam.set_viewport(0, 1080);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-5);
        assert_eq!(cam.eye, eye);
    }
}
