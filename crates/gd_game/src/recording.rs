//! `GraphicsApi` double that records calls instead of touching a GPU.

use glam::Vec3;
use gd_render::geometry::MeshData;
use gd_render::graphics::{
    DrawCommand, GraphicsApi, MeshHandle, ProgramHandle, ProgramSource, TextureHandle,
};
use image::RgbaImage;

#[derive(Default)]
pub struct RecordingGraphics {
    pub meshes: Vec<(String, u32)>,
    pub programs: Vec<String>,
    pub textures: Vec<(String, u32, u32)>,
    pub texture_updates: Vec<TextureHandle>,
    pub ambient_light: Option<Vec3>,
    pub frames: Vec<Vec<DrawCommand>>,
    /// Program labels that fail to compile.
    pub failing_programs: Vec<String>,
}

impl RecordingGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> &[DrawCommand] {
        self.frames.last().map(Vec::as_slice).unwrap_or_default()
    }
}

impl GraphicsApi for RecordingGraphics {
    fn create_mesh(&mut self, label: &str, mesh: &MeshData) -> Result<MeshHandle, String> {
        if mesh.is_empty() {
            return Err(format!("Mesh '{label}' has no vertices"));
        }
        self.meshes.push((label.to_string(), mesh.vertex_count()));
        Ok(MeshHandle::new(self.meshes.len() as u32 - 1, mesh.vertex_count()))
    }

    fn create_program(&mut self, source: &ProgramSource<'_>) -> Result<ProgramHandle, String> {
        if self.failing_programs.iter().any(|label| label == source.label) {
            return Err(format!("Shader '{}' failed validation: test failure", source.label));
        }
        self.programs.push(source.label.to_string());
        Ok(ProgramHandle(self.programs.len() as u32 - 1))
    }

    fn create_texture(&mut self, label: &str, image: &RgbaImage) -> Result<TextureHandle, String> {
        self.textures
            .push((label.to_string(), image.width(), image.height()));
        Ok(TextureHandle(self.textures.len() as u32 - 1))
    }

    fn update_texture(&mut self, texture: TextureHandle, image: &RgbaImage) -> Result<(), String> {
        let Some(&(_, width, height)) = self.textures.get(texture.0 as usize) else {
            return Err(format!("Unknown texture {}", texture.0));
        };
        if (width, height) != image.dimensions() {
            return Err(format!("Texture {} size mismatch", texture.0));
        }
        self.texture_updates.push(texture);
        Ok(())
    }

    fn set_ambient_light(&mut self, ambient: Vec3) {
        self.ambient_light = Some(ambient);
    }

    fn clear(&mut self, _color: [f32; 4]) {
        self.frames.push(Vec::new());
    }

    fn draw(&mut self, command: &DrawCommand) {
        match self.frames.last_mut() {
            Some(frame) => frame.push(*command),
            None => self.frames.push(vec![*command]),
        }
    }
}
