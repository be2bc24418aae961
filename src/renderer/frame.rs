use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::gpu::MeshHandle;
use crate::scene::{EntityId, GameCamera, SpotLight};

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.3,
    b: 0.3,
    a: 1.0,
};

pub const GRID_HALF_EXTENT: i32 = 10;
pub const GRID_COLOR: [f32; 4] = [0.45, 0.45, 0.45, 1.0];
const LIGHT_RAY_LENGTH: f32 = 2.0;
const CAMERA_RAY_LENGTH: f32 = 2.0;
const CAMERA_RAY_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }
}

/// One shape draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub shape: EntityId,
    pub mesh: MeshHandle,
    pub index_count: u32,
    pub model: Mat4,
    pub color: Vec4,
    pub textured: bool,
}

/// Everything needed to record one frame, without touching the device.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub clear_color: wgpu::Color,
    pub view: Mat4,
    pub projection: Mat4,
    pub aspect: f32,
    pub items: Vec<DrawItem>,
    /// Line-list vertex pairs for the debug pass; empty when it is off
    pub lines: Vec<LineVertex>,
}

/// Debug overlay geometry: the first light's direction, the selected game
/// camera's forward vector, a world grid on the XZ plane and an RGB gizmo.
pub fn debug_lines(lights: &[SpotLight], selected_camera: Option<&GameCamera>) -> Vec<LineVertex> {
    let mut lines = Vec::new();

    if let Some(light) = lights.first() {
        let end = light.position + light.unit_direction() * LIGHT_RAY_LENGTH;
        let color = light.color.to_array();
        lines.push(LineVertex::new(light.position, color));
        lines.push(LineVertex::new(end, color));
    }

    if let Some(camera) = selected_camera {
        let end = camera.position + camera.forward() * CAMERA_RAY_LENGTH;
        lines.push(LineVertex::new(camera.position, CAMERA_RAY_COLOR));
        lines.push(LineVertex::new(end, CAMERA_RAY_COLOR));
    }

    world_grid(&mut lines);
    origin_gizmo(&mut lines);
    lines
}

fn world_grid(lines: &mut Vec<LineVertex>) {
    let extent = GRID_HALF_EXTENT as f32;
    for i in -GRID_HALF_EXTENT..=GRID_HALF_EXTENT {
        let offset = i as f32;
        lines.push(LineVertex::new(Vec3::new(offset, 0.0, -extent), GRID_COLOR));
        lines.push(LineVertex::new(Vec3::new(offset, 0.0, extent), GRID_COLOR));
        lines.push(LineVertex::new(Vec3::new(-extent, 0.0, offset), GRID_COLOR));
        lines.push(LineVertex::new(Vec3::new(extent, 0.0, offset), GRID_COLOR));
    }
}

fn origin_gizmo(lines: &mut Vec<LineVertex>) {
    for (axis, color) in [
        (Vec3::X, [1.0, 0.0, 0.0, 1.0]),
        (Vec3::Y, [0.0, 1.0, 0.0, 1.0]),
        (Vec3::Z, [0.0, 0.0, 1.0, 1.0]),
    ] {
        lines.push(LineVertex::new(Vec3::ZERO, color));
        lines.push(LineVertex::new(axis, color));
    }
}
