use glam::{Mat4, Vec3};

use super::EntityId;
use crate::math::{forward_from_euler, projection_matrix, view_matrix};

pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 3.0);
pub const DEFAULT_FOV_DEG: f32 = 45.0;

/// The render camera of one renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Euler degrees: pitch (x), yaw (y), roll (z)
    pub rotation: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: DEFAULT_CAMERA_POSITION,
            rotation: Vec3::ZERO,
            fov: DEFAULT_FOV_DEG,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        view_matrix(self.position, self.rotation)
    }

    pub fn projection(&self) -> Mat4 {
        projection_matrix(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Sync the aspect ratio with a surface's pixel size. Zero sizes are ignored.
    pub fn update_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

/// A named camera that is only visualized, never rendered through.
#[derive(Debug, Clone, PartialEq)]
pub struct GameCamera {
    id: EntityId,
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub fov: f32,
}

impl GameCamera {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::next(),
            name: name.into(),
            position: DEFAULT_CAMERA_POSITION,
            rotation: Vec3::ZERO,
            fov: DEFAULT_FOV_DEG,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn forward(&self) -> Vec3 {
        forward_from_euler(self.rotation)
    }
}
