pub mod camera;
pub mod canvas;
pub mod geometry;
pub mod gpu_context;
pub mod graphics;
pub mod pipeline;
pub mod texture;
pub mod vertex;
pub mod wgpu_graphics;

pub use camera::{FrameUniform, SceneCamera};
pub use canvas::{Canvas, Color, GradientStop};
pub use geometry::{MeshData, Triangle, TriangleVertex};
pub use gpu_context::GpuContext;
pub use graphics::{
    DrawCommand, GraphicsApi, MeshHandle, ProgramHandle, ProgramKind, ProgramSource, TextureHandle,
};
pub use texture::Texture;
pub use vertex::MeshVertex;
pub use wgpu_graphics::WgpuGraphics;

/// Lit, vertex-coloured model shader.
pub const MODEL_SHADER_WGSL: &str = include_str!("shaders/model.wgsl");
/// Textured quad shader for the backdrop and overlays.
pub const OVERLAY_SHADER_WGSL: &str = include_str!("shaders/overlay.wgsl");
