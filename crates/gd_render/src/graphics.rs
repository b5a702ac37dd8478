//! Capability boundary between the scene and whatever 3D context draws it.
//!
//! The scene only ever sees opaque handles. `WgpuGraphics` is the real
//! implementation; tests drive the scene through a recording double.

use glam::{Mat4, Vec3};
use image::RgbaImage;

use crate::geometry::MeshData;

/// GPU-side vertex buffers plus the number of vertices to draw.
/// Copyable so gift boxes and enemies can share one buffer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    id: u32,
    vertex_count: u32,
}

impl MeshHandle {
    pub fn new(id: u32, vertex_count: u32) -> Self {
        Self { id, vertex_count }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Fixed-function state a program is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Vertex colours with ambient lighting, depth tested and written.
    Lit,
    /// Texture modulated by vertex colour, alpha blended, no depth.
    Textured,
}

#[derive(Debug, Clone, Copy)]
pub struct ProgramSource<'a> {
    pub label: &'a str,
    pub kind: ProgramKind,
    pub wgsl: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub program: ProgramHandle,
    pub mesh: MeshHandle,
    pub transform: Mat4,
    pub texture: Option<TextureHandle>,
}

pub trait GraphicsApi {
    fn create_mesh(&mut self, label: &str, mesh: &MeshData) -> Result<MeshHandle, String>;

    /// Compile and link a program. Failure carries the compiler diagnostics.
    fn create_program(&mut self, source: &ProgramSource<'_>) -> Result<ProgramHandle, String>;

    fn create_texture(&mut self, label: &str, image: &RgbaImage) -> Result<TextureHandle, String>;

    /// Replace a texture's contents. Dimensions must match the original.
    fn update_texture(&mut self, texture: TextureHandle, image: &RgbaImage) -> Result<(), String>;

    fn set_ambient_light(&mut self, ambient: Vec3);

    /// Start a new frame cleared to `color`.
    fn clear(&mut self, color: [f32; 4]);

    fn draw(&mut self, command: &DrawCommand);
}
