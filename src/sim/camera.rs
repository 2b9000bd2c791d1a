//! Perspective camera looking down at the room

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::map;

/// Vertical field of view (degrees)
const FOV_Y_DEGREES: f32 = 45.0;
const NEAR: f32 = 0.01;
const FAR: f32 = 100.0;

/// World-space ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Shake offsets (radians): roll around the view axis and yaw
    roll: f32,
    yaw: f32,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            fov_y: FOV_Y_DEGREES.to_radians(),
            aspect: 1.0,
            near: NEAR,
            far: FAR,
            roll: 0.0,
            yaw: 0.0,
        };
        camera.resize(width, height);
        camera
    }

    /// Portrait screens pull the camera back so the room stays in frame
    pub fn resize(&mut self, width: f32, height: f32) {
        self.aspect = if height > 0.0 { width / height } else { 1.0 };
        let d = map(self.aspect, 0.5, 1.0, 5.0, 2.0);
        self.position = Vec3::new(0.0, d, d);
        self.target = Vec3::ZERO;
    }

    pub fn set_shake(&mut self, roll: f32, yaw: f32) {
        self.roll = roll;
        self.yaw = yaw;
    }

    pub fn shake(&self) -> (f32, f32) {
        (self.roll, self.yaw)
    }

    pub fn view(&self) -> Mat4 {
        let look = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        if self.roll == 0.0 && self.yaw == 0.0 {
            return look;
        }
        let shake = Mat4::from_quat(Quat::from_euler(EulerRot::YXZ, self.yaw, 0.0, self.roll));
        shake.inverse() * look
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray through a point in normalized device coordinates
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        // glam's perspective_rh maps depth to [0, 1]
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray {
            origin: near,
            direction: (far - near).normalize_or_zero(),
        }
    }

    /// Project a world point to NDC; `None` behind the camera
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }
}
