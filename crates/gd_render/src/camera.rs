use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = ambient light vector, w unused.
    pub ambient_light: [f32; 4],
}

/// Fixed camera looking down -Z at the scene's unit clip volume.
///
/// World coordinates are already authored in [-1, 1] on every axis, so the
/// projection only remaps z into wgpu's [0, 1] depth range: z = -1 is nearest
/// (overlays), z = 1 is farthest (sky backdrop). No aspect correction is
/// applied; the image stretches with the window.
pub struct SceneCamera {
    pub ambient_light: Vec3,
}

impl SceneCamera {
    pub fn new(ambient_light: Vec3) -> Self {
        Self { ambient_light }
    }

    pub fn projection() -> Mat4 {
        Mat4::orthographic_lh(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0)
    }

    pub fn build_uniform(&self) -> FrameUniform {
        FrameUniform {
            view_proj: Self::projection().to_cols_array_2d(),
            ambient_light: self.ambient_light.extend(0.0).to_array(),
        }
    }
}
