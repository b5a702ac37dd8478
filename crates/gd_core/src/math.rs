use glam::{Mat4, Vec3};

/// World transform: translation(position) * Rx * Ry * Rz.
pub fn transformation_matrix(position: Vec3, rotation_rad: Vec3) -> Mat4 {
    Mat4::from_translation(position) * rotation_matrix(rotation_rad)
}

pub fn rotation_matrix(rotation_rad: Vec3) -> Mat4 {
    Mat4::from_rotation_x(rotation_rad.x)
        * Mat4::from_rotation_y(rotation_rad.y)
        * Mat4::from_rotation_z(rotation_rad.z)
}

pub fn transform_point(matrix: &Mat4, point: Vec3) -> Vec3 {
    matrix.transform_point3(point)
}

pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Limit `value` to `[-max_magnitude, max_magnitude]`, keeping its sign.
pub fn clamp_magnitude(value: f32, max_magnitude: f32) -> f32 {
    let limit = max_magnitude.abs();
    value.clamp(-limit, limit)
}
