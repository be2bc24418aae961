use glam::{Mat4, Vec3};

/// Rotation from Euler degrees, applied pitch (X) → yaw (Y) → roll (Z).
///
/// Matrix order is `Rx * Ry * Rz`, so a vector is rolled first and pitched
/// last when the matrix is applied to it.
pub fn euler_rotation(rotation_deg: Vec3) -> Mat4 {
    Mat4::from_rotation_x(rotation_deg.x.to_radians())
        * Mat4::from_rotation_y(rotation_deg.y.to_radians())
        * Mat4::from_rotation_z(rotation_deg.z.to_radians())
}

/// Model matrix: translate, then pitch/yaw/roll, then component-wise scale.
pub fn model_matrix(position: Vec3, rotation_deg: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position) * euler_rotation(rotation_deg) * Mat4::from_scale(scale)
}

/// View matrix for a camera at `position` with the given Euler rotation.
pub fn view_matrix(position: Vec3, rotation_deg: Vec3) -> Mat4 {
    euler_rotation(rotation_deg) * Mat4::from_translation(-position)
}

/// Right-handed perspective with a [0, 1] depth range.
pub fn projection_matrix(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_deg.to_radians(), aspect.max(f32::EPSILON), near, far)
}

/// Forward vector of a yaw → pitch → roll oriented object looking down -Z.
pub fn forward_from_euler(rotation_deg: Vec3) -> Vec3 {
    let rotation = Mat4::from_rotation_y(rotation_deg.y.to_radians())
        * Mat4::from_rotation_x(rotation_deg.x.to_radians())
        * Mat4::from_rotation_z(rotation_deg.z.to_radians());
    rotation.transform_vector3(Vec3::NEG_Z).normalize()
}
