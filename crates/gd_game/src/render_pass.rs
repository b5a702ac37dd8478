//! Per-frame draw sequence for the sleigh scene.
//!
//! Order is fixed: clear, sky backdrop, house rows, sleigh (only while
//! active), gift boxes, grinches, then the HUD overlays. The renderer reads
//! the simulation and never mutates it; its own state is limited to GPU
//! handles and the canvases the overlays are rasterised into.

use glam::{Mat4, Vec3};
use gd_render::canvas::Canvas;
use gd_render::geometry::MeshData;
use gd_render::graphics::{
    DrawCommand, GraphicsApi, MeshHandle, ProgramHandle, ProgramKind, ProgramSource, TextureHandle,
};
use image::{Rgba, RgbaImage};

use crate::overlay::{
    draw_game_over_banner, draw_score_strip, draw_spirit_gauge, BANNER_HEIGHT, BANNER_WIDTH,
    STRIP_HEIGHT, STRIP_WIDTH,
};
use crate::resources::{ResourceStore, SHADER_MODEL, SHADER_OVERLAY, TEXTURE_SKY_BACKDROP};
use crate::simulation::{ScenePhase, Simulation};

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const BACKDROP_Z: f32 = 1.0;
const OVERLAY_Z: f32 = -1.0;
const SCORE_QUAD_TOP: f32 = 0.95;
const SCORE_QUAD_HEIGHT: f32 = 0.10;
const GAUGE_QUAD_TOP: f32 = -0.80;
const GAUGE_QUAD_HEIGHT: f32 = 0.10;
const SKY_FALLBACK_SIZE: (u32, u32) = (4, 256);

/// A textured quad whose image is redrawn on the CPU.
struct OverlaySurface {
    mesh: MeshHandle,
    texture: TextureHandle,
    canvas: Canvas,
}

impl OverlaySurface {
    fn new(
        gfx: &mut impl GraphicsApi,
        label: &str,
        quad: MeshData,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let canvas = Canvas::new(width, height);
        let mesh = gfx.create_mesh(label, &quad)?;
        let texture = gfx.create_texture(label, canvas.image())?;
        Ok(Self {
            mesh,
            texture,
            canvas,
        })
    }

    fn upload(&self, gfx: &mut impl GraphicsApi) {
        if let Err(err) = gfx.update_texture(self.texture, self.canvas.image()) {
            log::error!("Overlay texture upload failed: {err}");
        }
    }

    fn draw(&self, gfx: &mut impl GraphicsApi, program: ProgramHandle) {
        gfx.draw(&DrawCommand {
            program,
            mesh: self.mesh,
            transform: Mat4::IDENTITY,
            texture: Some(self.texture),
        });
    }
}

pub struct SceneRenderer {
    lit_program: ProgramHandle,
    textured_program: ProgramHandle,
    backdrop_mesh: MeshHandle,
    backdrop_texture: TextureHandle,
    score: OverlaySurface,
    gauge: OverlaySurface,
    banner: OverlaySurface,
    overlays_rasterised: bool,
    banner_rasterised: bool,
}

impl SceneRenderer {
    /// Build programs, quads and overlay textures. Shader failures are fatal.
    pub fn new(
        gfx: &mut impl GraphicsApi,
        resources: &ResourceStore,
        ambient_light: Vec3,
    ) -> Result<Self, String> {
        let lit_program = create_program(gfx, resources, SHADER_MODEL, ProgramKind::Lit)?;
        let textured_program =
            create_program(gfx, resources, SHADER_OVERLAY, ProgramKind::Textured)?;
        gfx.set_ambient_light(ambient_light);

        let backdrop_mesh = gfx.create_mesh(
            "Sky Backdrop",
            &MeshData::screen_quad(-1.0, 1.0, 1.0, -1.0, BACKDROP_Z),
        )?;
        let backdrop_texture = match resources.image(TEXTURE_SKY_BACKDROP) {
            Some(image) => gfx.create_texture("Sky Backdrop", image)?,
            None => {
                log::warn!("Sky backdrop '{TEXTURE_SKY_BACKDROP}' unavailable; using a generated gradient");
                gfx.create_texture("Sky Backdrop", &sky_gradient(SKY_FALLBACK_SIZE.0, SKY_FALLBACK_SIZE.1))?
            }
        };

        let score = OverlaySurface::new(
            gfx,
            "Score Overlay",
            MeshData::screen_quad(
                -1.0,
                SCORE_QUAD_TOP,
                1.0,
                SCORE_QUAD_TOP - SCORE_QUAD_HEIGHT,
                OVERLAY_Z,
            ),
            STRIP_WIDTH,
            STRIP_HEIGHT,
        )?;
        let gauge = OverlaySurface::new(
            gfx,
            "Spirit Gauge Overlay",
            MeshData::screen_quad(
                -1.0,
                GAUGE_QUAD_TOP,
                1.0,
                GAUGE_QUAD_TOP - GAUGE_QUAD_HEIGHT,
                OVERLAY_Z,
            ),
            STRIP_WIDTH,
            STRIP_HEIGHT,
        )?;
        let banner = OverlaySurface::new(
            gfx,
            "Game Over Overlay",
            MeshData::screen_quad(-1.0, 1.0, 1.0, -1.0, OVERLAY_Z),
            BANNER_WIDTH,
            BANNER_HEIGHT,
        )?;

        Ok(Self {
            lit_program,
            textured_program,
            backdrop_mesh,
            backdrop_texture,
            score,
            gauge,
            banner,
            overlays_rasterised: false,
            banner_rasterised: false,
        })
    }

    pub fn render(&mut self, gfx: &mut impl GraphicsApi, sim: &Simulation) {
        gfx.clear(CLEAR_COLOR);
        gfx.draw(&DrawCommand {
            program: self.textured_program,
            mesh: self.backdrop_mesh,
            transform: Mat4::IDENTITY,
            texture: Some(self.backdrop_texture),
        });

        let models = sim.models();
        for row in sim.house_rows() {
            for house in &row.houses {
                let mesh = models.house(house.model_index).and_then(|t| t.mesh);
                self.draw_model(gfx, mesh, house.world_transform());
            }
        }
        if sim.phase() == ScenePhase::Active {
            self.draw_model(gfx, models.sleigh.mesh, sim.sleigh().world_transform());
        }
        for gift in sim.gift_boxes() {
            self.draw_model(gfx, models.gift_box.mesh, gift.world_transform());
        }
        for enemy in sim.enemies() {
            self.draw_model(gfx, models.grinch.mesh, enemy.world_transform());
        }

        self.render_overlays(gfx, sim);
    }

    fn draw_model(&self, gfx: &mut impl GraphicsApi, mesh: Option<MeshHandle>, transform: Mat4) {
        if let Some(mesh) = mesh {
            gfx.draw(&DrawCommand {
                program: self.lit_program,
                mesh,
                transform,
                texture: None,
            });
        }
    }

    fn render_overlays(&mut self, gfx: &mut impl GraphicsApi, sim: &Simulation) {
        if sim.overlay_refresh_due() || !self.overlays_rasterised {
            draw_score_strip(&mut self.score.canvas, sim.score());
            self.score.upload(gfx);
            draw_spirit_gauge(&mut self.gauge.canvas, sim.spirit_fraction());
            self.gauge.upload(gfx);
            self.overlays_rasterised = true;
        }
        self.score.draw(gfx, self.textured_program);
        self.gauge.draw(gfx, self.textured_program);

        if sim.phase() == ScenePhase::GameOver {
            if !self.banner_rasterised {
                draw_game_over_banner(&mut self.banner.canvas);
                self.banner.upload(gfx);
                self.banner_rasterised = true;
            }
            self.banner.draw(gfx, self.textured_program);
        }
    }
}

fn create_program(
    gfx: &mut impl GraphicsApi,
    resources: &ResourceStore,
    key: &str,
    kind: ProgramKind,
) -> Result<ProgramHandle, String> {
    let wgsl = resources
        .text(key)
        .ok_or_else(|| format!("Shader source '{key}' is missing from the resource store"))?;
    gfx.create_program(&ProgramSource {
        label: key,
        kind,
        wgsl,
    })
    .map_err(|e| {
        log::error!("{e}");
        format!("Failed to build program '{key}': {e}")
    })
}

/// Night sky stand-in: deep blue at the top fading to a lighter horizon.
pub fn sky_gradient(width: u32, height: u32) -> RgbaImage {
    let top = [8.0, 14.0, 48.0];
    let horizon = [52.0, 78.0, 140.0];
    RgbaImage::from_fn(width, height, |_, y| {
        let t = if height > 1 {
            y as f32 / (height - 1) as f32
        } else {
            0.0
        };
        let channel = |i: usize| (top[i] + (horizon[i] - top[i]) * t).round() as u8;
        Rgba([channel(0), channel(1), channel(2), 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::entities::{sample_models, SceneModels};
    use crate::recording::RecordingGraphics;
    use gd_core::random::SceneRng;

    fn models_with_meshes() -> SceneModels {
        let mut models = sample_models();
        models.sleigh.mesh = Some(MeshHandle::new(100, 36));
        models.gift_box.mesh = Some(MeshHandle::new(101, 36));
        models.grinch.mesh = Some(MeshHandle::new(102, 36));
        for (i, house) in models.houses.iter_mut().enumerate() {
            house.mesh = Some(MeshHandle::new(110 + i as u32, 36));
        }
        models
    }

    fn simulation(models: SceneModels) -> Simulation {
        let mut config = GameConfig::default();
        config.gift_box.launch_interval_ms = 0.0;
        Simulation::new(config, models, SceneRng::seeded(7))
    }

    fn renderer(gfx: &mut RecordingGraphics) -> SceneRenderer {
        SceneRenderer::new(gfx, &ResourceStore::with_builtin_shaders(), Vec3::new(-0.4, -0.3, -0.4))
            .expect("renderer builds")
    }

    fn mesh_ids(frame: &[DrawCommand]) -> Vec<u32> {
        frame.iter().map(|d| d.mesh.id()).collect()
    }

    #[test]
    fn setup_creates_programs_quads_and_textures() {
        let mut gfx = RecordingGraphics::new();
        renderer(&mut gfx);
        assert_eq!(gfx.programs, vec![SHADER_MODEL.to_string(), SHADER_OVERLAY.to_string()]);
        assert_eq!(gfx.meshes.len(), 4);
        assert!(gfx.meshes.iter().all(|(_, count)| *count == 6));
        let sizes: Vec<(u32, u32)> = gfx.textures.iter().map(|(_, w, h)| (*w, *h)).collect();
        assert_eq!(
            sizes,
            vec![SKY_FALLBACK_SIZE, (960, 48), (960, 48), (960, 720)]
        );
        assert_eq!(gfx.ambient_light, Some(Vec3::new(-0.4, -0.3, -0.4)));
    }

    #[test]
    fn shader_failure_is_fatal() {
        let mut gfx = RecordingGraphics::new();
        gfx.failing_programs.push(SHADER_OVERLAY.to_string());
        let result = SceneRenderer::new(&mut gfx, &ResourceStore::with_builtin_shaders(), Vec3::ZERO);
        let err = result.err().expect("overlay shader failure must abort setup");
        assert!(err.contains(SHADER_OVERLAY));
    }

    #[test]
    fn missing_shader_source_is_fatal() {
        let mut gfx = RecordingGraphics::new();
        assert!(SceneRenderer::new(&mut gfx, &ResourceStore::new(), Vec3::ZERO).is_err());
    }

    #[test]
    fn draws_follow_the_fixed_order() {
        let mut gfx = RecordingGraphics::new();
        let mut renderer = renderer(&mut gfx);
        let mut sim = simulation(models_with_meshes());
        sim.request_launch(1.0);
        renderer.render(&mut gfx, &sim);

        let ids = mesh_ids(gfx.last_frame());
        let house_count = sim.house_count();
        assert_eq!(ids.len(), 1 + house_count + 1 + 1 + 2);
        assert_eq!(ids[0], 0, "backdrop first");
        assert!(ids[1..=house_count].iter().all(|id| (110..114).contains(id)));
        assert_eq!(ids[house_count + 1], 100, "sleigh after houses");
        assert_eq!(ids[house_count + 2], 101, "gift box after sleigh");
        assert_eq!(&ids[house_count + 3..], &[1, 2], "score then gauge");
        assert!(gfx.last_frame()[0].texture.is_some());
        assert!(gfx.last_frame()[1].texture.is_none());
    }

    #[test]
    fn models_without_meshes_are_skipped() {
        let mut gfx = RecordingGraphics::new();
        let mut renderer = renderer(&mut gfx);
        let sim = simulation(sample_models());
        renderer.render(&mut gfx, &sim);
        assert_eq!(mesh_ids(gfx.last_frame()), vec![0, 1, 2]);
    }

    #[test]
    fn rendering_twice_changes_nothing() {
        let mut gfx = RecordingGraphics::new();
        let mut renderer = renderer(&mut gfx);
        let mut sim = simulation(models_with_meshes());
        sim.request_launch(1.0);
        sim.step(100.0);

        let sleigh = sim.sleigh().clone();
        let gifts: Vec<_> = sim.gift_boxes().iter().map(|g| (g.position, g.velocity)).collect();
        let houses: Vec<_> = sim.house_rows()[0].houses.iter().map(|h| h.position).collect();
        let score = sim.score();
        let spirit = sim.holiday_spirit();

        renderer.render(&mut gfx, &sim);
        renderer.render(&mut gfx, &sim);

        assert_eq!(gfx.frames[0], gfx.frames[1]);
        assert_eq!(sim.sleigh().position, sleigh.position);
        assert_eq!(sim.sleigh().velocity, sleigh.velocity);
        let gifts_after: Vec<_> = sim.gift_boxes().iter().map(|g| (g.position, g.velocity)).collect();
        assert_eq!(gifts, gifts_after);
        let houses_after: Vec<_> = sim.house_rows()[0].houses.iter().map(|h| h.position).collect();
        assert_eq!(houses, houses_after);
        assert_eq!(sim.score(), score);
        assert_eq!(sim.holiday_spirit(), spirit);
    }

    #[test]
    fn overlays_refresh_only_when_due() {
        let mut gfx = RecordingGraphics::new();
        let mut renderer = renderer(&mut gfx);
        let mut sim = simulation(models_with_meshes());

        renderer.render(&mut gfx, &sim);
        assert_eq!(gfx.texture_updates.len(), 2, "first frame always rasterises");

        sim.step(16.0);
        assert!(!sim.overlay_refresh_due());
        renderer.render(&mut gfx, &sim);
        renderer.render(&mut gfx, &sim);
        assert_eq!(gfx.texture_updates.len(), 2, "stale textures reused");

        while !sim.overlay_refresh_due() {
            sim.step(16.0);
        }
        renderer.render(&mut gfx, &sim);
        assert_eq!(gfx.texture_updates.len(), 4);
    }

    #[test]
    fn game_over_hides_sleigh_and_shows_banner_once() {
        let mut gfx = RecordingGraphics::new();
        let mut renderer = renderer(&mut gfx);
        let mut config = GameConfig::default();
        config.spirit.decay_per_ms = 10.0;
        let mut sim = Simulation::new(config, models_with_meshes(), SceneRng::seeded(3));
        sim.step(200.0);
        assert_eq!(sim.phase(), ScenePhase::GameOver);

        renderer.render(&mut gfx, &sim);
        renderer.render(&mut gfx, &sim);
        let ids = mesh_ids(gfx.last_frame());
        assert!(!ids.contains(&100), "sleigh is not drawn after game over");
        assert_eq!(ids.last(), Some(&3), "banner drawn last");
        let banner_uploads = gfx
            .texture_updates
            .iter()
            .filter(|t| **t == TextureHandle(3))
            .count();
        assert_eq!(banner_uploads, 1);
    }

    #[test]
    fn sky_gradient_brightens_towards_horizon() {
        let sky = sky_gradient(2, 64);
        let top = sky.get_pixel(0, 0).0;
        let bottom = sky.get_pixel(1, 63).0;
        assert!(bottom[2] > top[2]);
        assert_eq!(top[3], 255);
    }
}
