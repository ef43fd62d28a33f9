//! Camera projection used to turn viewport-relative spawn rules into world
//! coordinates, and pointer positions into world positions on the z=0 plane.

use glam::{Mat4, Vec2, Vec3};

use crate::config::{camera, emission};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_y_degrees: camera::FOV_Y_DEGREES,
            aspect: if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 },
            distance: camera::DISTANCE,
            near: camera::NEAR,
            far: camera::FAR,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Full visible height of the z=0 plane in world units
    pub fn visible_height(&self) -> f32 {
        let height = 2.0 * (self.fov_y_degrees.to_radians() * 0.5).tan() * self.distance;
        if height.is_finite() && height > 0.0 {
            height
        } else {
            emission::FALLBACK_VIEWPORT_HEIGHT
        }
    }

    pub fn visible_width(&self) -> f32 {
        self.visible_height() * self.aspect
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, self.distance), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Project a window-space pointer position onto the z=0 plane
    pub fn screen_to_world(&self, x: f32, y: f32, width: f32, height: f32) -> Vec2 {
        if width <= 0.0 || height <= 0.0 {
            return Vec2::ZERO;
        }
        let ndc_x = (x / width) * 2.0 - 1.0;
        let ndc_y = 1.0 - (y / height) * 2.0;
        Vec2::new(
            ndc_x * self.visible_width() * 0.5,
            ndc_y * self.visible_height() * 0.5,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
