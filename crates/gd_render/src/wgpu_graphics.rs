//! wgpu implementation of `GraphicsApi`.
//!
//! Draw calls are recorded during the frame and encoded into a single render
//! pass by `present`. Each draw gets its own slot in a dynamic-offset uniform
//! buffer holding the object transform.

use std::sync::Arc;

use glam::Vec3;
use image::RgbaImage;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::SceneCamera;
use crate::geometry::MeshData;
use crate::gpu_context::GpuContext;
use crate::graphics::{
    DrawCommand, GraphicsApi, MeshHandle, ProgramHandle, ProgramKind, ProgramSource, TextureHandle,
};
use crate::pipeline::{create_program_pipeline, SceneBindLayouts, OBJECT_UNIFORM_STRIDE};
use crate::texture::Texture;

struct GpuMesh {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

struct GpuProgram {
    kind: ProgramKind,
    pipeline: wgpu::RenderPipeline,
}

struct GpuTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

pub struct WgpuGraphics {
    ctx: GpuContext,
    layouts: SceneBindLayouts,
    camera: SceneCamera,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_capacity: u64,
    meshes: Vec<GpuMesh>,
    programs: Vec<GpuProgram>,
    textures: Vec<GpuTexture>,
    clear_color: wgpu::Color,
    pending_draws: Vec<DrawCommand>,
    draws_last_frame: usize,
}

impl WgpuGraphics {
    const INITIAL_OBJECT_CAPACITY: u64 = 64;

    pub fn new(window: Arc<Window>) -> Result<Self, String> {
        let ctx = GpuContext::new(window)?;
        let layouts = SceneBindLayouts::new(&ctx.device);
        let camera = SceneCamera::new(Vec3::ZERO);

        let frame_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Frame Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let frame_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &layouts.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let (object_buffer, object_bind_group) =
            create_object_buffer(&ctx.device, &layouts, Self::INITIAL_OBJECT_CAPACITY);

        Ok(Self {
            ctx,
            layouts,
            camera,
            frame_buffer,
            frame_bind_group,
            object_buffer,
            object_bind_group,
            object_capacity: Self::INITIAL_OBJECT_CAPACITY,
            meshes: Vec::new(),
            programs: Vec::new(),
            textures: Vec::new(),
            clear_color: wgpu::Color::BLACK,
            pending_draws: Vec::new(),
            draws_last_frame: 0,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.ctx.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.ctx.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.ctx.surface_format
    }

    pub fn size(&self) -> (u32, u32) {
        self.ctx.size
    }

    pub fn draws_last_frame(&self) -> usize {
        self.draws_last_frame
    }

    /// Encode the recorded draws, let `after_scene` append extra passes
    /// (the debug overlay), then submit and present.
    ///
    /// Returns `false` when no surface texture was available this frame.
    pub fn present<F>(&mut self, after_scene: F) -> bool
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let draws = std::mem::take(&mut self.pending_draws);
        self.draws_last_frame = draws.len();

        let Some((output, view)) = self.ctx.begin_frame() else {
            return false;
        };

        self.ctx.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::cast_slice(&[self.camera.build_uniform()]),
        );
        self.write_object_uniforms(&draws);

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (slot, draw) in draws.iter().enumerate() {
                let Some(program) = self.programs.get(draw.program.0 as usize) else {
                    log::debug!("Skipping draw with unknown program {:?}", draw.program);
                    continue;
                };
                let Some(mesh) = self.meshes.get(draw.mesh.id() as usize) else {
                    log::debug!("Skipping draw with unknown mesh {:?}", draw.mesh);
                    continue;
                };

                pass.set_pipeline(&program.pipeline);
                let offset = (slot as u64 * OBJECT_UNIFORM_STRIDE) as u32;
                pass.set_bind_group(1, &self.object_bind_group, &[offset]);

                if program.kind == ProgramKind::Textured {
                    let Some(texture) = draw
                        .texture
                        .and_then(|handle| self.textures.get(handle.0 as usize))
                    else {
                        log::debug!("Skipping textured draw without a texture");
                        continue;
                    };
                    pass.set_bind_group(2, &texture.bind_group, &[]);
                }

                pass.set_vertex_buffer(0, mesh.buffer.slice(..));
                pass.draw(0..mesh.vertex_count, 0..1);
            }
        }

        after_scene(&self.ctx.device, &self.ctx.queue, &mut encoder, &view);

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        true
    }

    fn write_object_uniforms(&mut self, draws: &[DrawCommand]) {
        let needed = draws.len() as u64;
        if needed > self.object_capacity {
            let capacity = needed.next_power_of_two();
            let (buffer, bind_group) = create_object_buffer(&self.ctx.device, &self.layouts, capacity);
            self.object_buffer = buffer;
            self.object_bind_group = bind_group;
            self.object_capacity = capacity;
            log::debug!("Object uniform buffer grown to {capacity} slots");
        }
        if draws.is_empty() {
            return;
        }

        let mut bytes = vec![0u8; (needed * OBJECT_UNIFORM_STRIDE) as usize];
        for (slot, draw) in draws.iter().enumerate() {
            let start = slot * OBJECT_UNIFORM_STRIDE as usize;
            let matrix = draw.transform.to_cols_array();
            let raw: &[u8] = bytemuck::cast_slice(&matrix);
            bytes[start..start + raw.len()].copy_from_slice(raw);
        }
        self.ctx.queue.write_buffer(&self.object_buffer, 0, &bytes);
    }
}

fn create_object_buffer(
    device: &wgpu::Device,
    layouts: &SceneBindLayouts,
    capacity: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Object Uniform Buffer"),
        size: capacity * OBJECT_UNIFORM_STRIDE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Object Bind Group"),
        layout: &layouts.object,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(crate::pipeline::OBJECT_UNIFORM_SIZE),
            }),
        }],
    });
    (buffer, bind_group)
}

impl GraphicsApi for WgpuGraphics {
    fn create_mesh(&mut self, label: &str, mesh: &MeshData) -> Result<MeshHandle, String> {
        if mesh.is_empty() {
            return Err(format!("Mesh '{label}' has no vertices"));
        }
        let vertices = mesh.interleave();
        let buffer = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let handle = MeshHandle::new(self.meshes.len() as u32, mesh.vertex_count());
        self.meshes.push(GpuMesh {
            buffer,
            vertex_count: mesh.vertex_count(),
        });
        log::debug!("Created mesh '{label}' ({} vertices)", mesh.vertex_count());
        Ok(handle)
    }

    fn create_program(&mut self, source: &ProgramSource<'_>) -> Result<ProgramHandle, String> {
        let device = &self.ctx.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(source.label),
            source: wgpu::ShaderSource::Wgsl(source.wgsl.into()),
        });
        let pipeline = create_program_pipeline(
            device,
            &self.layouts,
            self.ctx.surface_format,
            source.kind,
            &shader,
            source.label,
        );
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(format!("Shader program '{}' failed to build: {err}", source.label));
        }

        let handle = ProgramHandle(self.programs.len() as u32);
        self.programs.push(GpuProgram {
            kind: source.kind,
            pipeline,
        });
        log::info!("Built shader program '{}' ({:?})", source.label, source.kind);
        Ok(handle)
    }

    fn create_texture(&mut self, label: &str, image: &RgbaImage) -> Result<TextureHandle, String> {
        let texture = Texture::from_rgba(&self.ctx.device, &self.ctx.queue, image, label)?;
        let bind_group = self.layouts.texture_bind_group(&self.ctx.device, &texture);
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(GpuTexture {
            texture,
            bind_group,
        });
        Ok(handle)
    }

    fn update_texture(&mut self, texture: TextureHandle, image: &RgbaImage) -> Result<(), String> {
        let target = self
            .textures
            .get(texture.0 as usize)
            .ok_or_else(|| format!("Unknown texture handle {}", texture.0))?;
        target.texture.update(&self.ctx.queue, image)
    }

    fn set_ambient_light(&mut self, ambient: Vec3) {
        self.camera.ambient_light = ambient;
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = wgpu::Color {
            r: color[0] as f64,
            g: color[1] as f64,
            b: color[2] as f64,
            a: color[3] as f64,
        };
        self.pending_draws.clear();
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.pending_draws.push(*command);
    }
}
