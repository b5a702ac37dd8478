//! The sleigh scene: model loading, simulation, input dispatch and the
//! render pass wired together behind one value the main loop owns.

use glam::Vec3;
use gd_core::input::Key;
use gd_core::random::SceneRng;
use gd_devtools::OverlayStats;
use gd_render::geometry::MeshData;
use gd_render::graphics::GraphicsApi;

use crate::config::GameConfig;
use crate::entities::{ModelTemplate, SceneModels};
use crate::input_binding::{post_key, scene_dispatcher, SceneDispatcher};
use crate::model::{chimney_loci_for, parse_obj_model};
use crate::render_pass::SceneRenderer;
use crate::resources::{
    ResourceStore, HOUSE_MODEL_KEYS, MODEL_GIFT_BOX, MODEL_GRINCH, MODEL_SLEIGH,
};
use crate::simulation::{ScenePhase, Simulation};

pub struct GameScene {
    simulation: Simulation,
    renderer: SceneRenderer,
    dispatcher: SceneDispatcher,
}

impl GameScene {
    /// Build meshes and GPU state for a fresh session. Only shader failures
    /// abort; models that fail to load are simulated but never drawn.
    pub fn new(
        gfx: &mut impl GraphicsApi,
        resources: &ResourceStore,
        config: GameConfig,
    ) -> Result<Self, String> {
        let ambient = Vec3::from_array(config.ambient_light);
        let renderer = SceneRenderer::new(gfx, resources, ambient)?;
        let models = load_scene_models(gfx, resources, &config);
        let rng = session_rng(config.rng_seed);
        let simulation = Simulation::new(config, models, rng);
        Ok(Self {
            simulation,
            renderer,
            dispatcher: scene_dispatcher(),
        })
    }

    /// Queue a key transition for the next step.
    pub fn key_event(&mut self, key: Key, pressed: bool) {
        post_key(&mut self.dispatcher, key, pressed);
    }

    pub fn dispatcher_mut(&mut self) -> &mut SceneDispatcher {
        &mut self.dispatcher
    }

    /// Deliver queued input, then advance the simulation by `dt_ms`.
    pub fn step(&mut self, dt_ms: f64) {
        self.dispatcher.dispatch(&mut self.simulation);
        self.simulation.step(dt_ms);
    }

    pub fn render(&mut self, gfx: &mut impl GraphicsApi) {
        self.renderer.render(gfx, &self.simulation);
    }

    /// Start a new session with `config`, keeping the loaded meshes.
    pub fn reset(&mut self, config: GameConfig) {
        let models = self.simulation.models().clone();
        let rng = session_rng(config.rng_seed);
        self.simulation = Simulation::new(config, models, rng);
        self.dispatcher = scene_dispatcher();
        log::info!("Session reset (seed {:#x})", self.simulation.rng_seed());
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn is_game_over(&self) -> bool {
        self.simulation.phase() == ScenePhase::GameOver
    }

    pub fn stats(&self, draw_calls: usize, paused: bool) -> OverlayStats {
        let sim = &self.simulation;
        OverlayStats {
            draw_calls: draw_calls as u32,
            score: sim.score(),
            holiday_spirit: sim.holiday_spirit(),
            gift_boxes: sim.gift_boxes().len(),
            enemies: sim.enemies().len(),
            houses: sim.house_count(),
            phase_label: sim.phase().label().to_string(),
            scroll_rate: sim.scroll_rate(),
            rng_seed: sim.rng_seed(),
            paused,
        }
    }
}

/// A fixed seed replays the same session; otherwise each session is fresh.
fn session_rng(fixed_seed: Option<u64>) -> SceneRng {
    match fixed_seed {
        Some(seed) => SceneRng::seeded(seed),
        None => SceneRng::from_clock(),
    }
}

pub fn load_scene_models(
    gfx: &mut impl GraphicsApi,
    resources: &ResourceStore,
    config: &GameConfig,
) -> SceneModels {
    let houses = HOUSE_MODEL_KEYS
        .iter()
        .enumerate()
        .map(|(i, &key)| {
            let scale = house_scale(&config.houses.model_scales, i);
            load_template(gfx, resources, key, scale, &chimney_loci_for(key))
        })
        .collect();

    SceneModels {
        sleigh: load_template(gfx, resources, MODEL_SLEIGH, config.sleigh.model_scale, &[]),
        gift_box: load_template(gfx, resources, MODEL_GIFT_BOX, config.gift_box.model_scale, &[]),
        grinch: load_template(gfx, resources, MODEL_GRINCH, config.grinch.model_scale, &[]),
        houses,
    }
}

/// Scale for house model `index`; short tables repeat their last entry.
fn house_scale(scales: &[f32], index: usize) -> f32 {
    scales
        .get(index)
        .or_else(|| scales.last())
        .copied()
        .unwrap_or(1.0)
}

fn load_template(
    gfx: &mut impl GraphicsApi,
    resources: &ResourceStore,
    key: &'static str,
    scale: f32,
    chimney_loci: &[Vec3],
) -> ModelTemplate {
    let Some(text) = resources.text(key) else {
        log::warn!("Model '{key}' is not loaded; it will not be drawn");
        return ModelTemplate::placeholder(key);
    };
    let parsed = match parse_obj_model(text, scale, chimney_loci) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::error!("Model '{key}' is malformed: {err}");
            return ModelTemplate::placeholder(key);
        }
    };

    let mesh = match gfx.create_mesh(key, &MeshData::from_triangles(&parsed.triangles)) {
        Ok(mesh) => Some(mesh),
        Err(err) => {
            log::error!("Failed to upload model '{key}': {err}");
            None
        }
    };
    log::debug!(
        "Model '{key}' loaded: {} triangles, {:.3} x {:.3} x {:.3}",
        parsed.triangles.len(),
        parsed.dimensions.x,
        parsed.dimensions.y,
        parsed.dimensions.z
    );
    ModelTemplate {
        key,
        mesh,
        dimensions: parsed.dimensions,
        chimney_loci: parsed.aux_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObjectDimensions;
    use crate::recording::RecordingGraphics;
    use crate::resources::{RawResource, MODEL_HOUSE_2};

    const CUBE_OBJ: &str = "\
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 -1
v -1 -1 1
v 1 -1 1
v 1 1 1
v -1 1 1
f 1 2 3 4
f 5 6 7 8
f 1 2 6 5
f 4 3 7 8
f 1 4 8 5
f 2 3 7 6
";

    fn store_with_models() -> ResourceStore {
        let mut store = ResourceStore::with_builtin_shaders();
        store.insert(MODEL_SLEIGH, RawResource::Text(CUBE_OBJ.to_string()));
        store.insert(MODEL_GIFT_BOX, RawResource::Text(CUBE_OBJ.to_string()));
        store.insert(MODEL_GRINCH, RawResource::Text("v 1 1 1\nv 1 1 1\nv 1 1 1\nf 1 2 3\n".to_string()));
        store.insert(MODEL_HOUSE_2, RawResource::Text(CUBE_OBJ.to_string()));
        store
    }

    fn fixed_seed_config() -> GameConfig {
        GameConfig {
            rng_seed: Some(42),
            ..GameConfig::default()
        }
    }

    #[test]
    fn house_scale_repeats_last_entry() {
        assert_eq!(house_scale(&[1.75, 1.45], 0), 1.75);
        assert_eq!(house_scale(&[1.75, 1.45], 3), 1.45);
        assert_eq!(house_scale(&[], 2), 1.0);
    }

    #[test]
    fn missing_and_malformed_models_become_placeholders() {
        let mut gfx = RecordingGraphics::new();
        let models = load_scene_models(&mut gfx, &store_with_models(), &GameConfig::default());

        assert!(models.sleigh.mesh.is_some());
        assert!((models.sleigh.dimensions.x - 0.4).abs() < 1e-6);
        assert!(models.gift_box.mesh.is_some());
        assert!(models.grinch.mesh.is_none());
        assert_eq!(models.grinch.dimensions, ObjectDimensions::UNIT);

        assert_eq!(models.houses.len(), 4);
        assert!(models.houses[0].mesh.is_none());
        assert!(models.houses[1].mesh.is_some());
        assert_eq!(models.houses[1].chimney_loci.len(), 2);
        assert_eq!(models.houses[1].key, MODEL_HOUSE_2);
    }

    #[test]
    fn scene_builds_without_any_model_files() {
        let mut gfx = RecordingGraphics::new();
        let mut scene = GameScene::new(
            &mut gfx,
            &ResourceStore::with_builtin_shaders(),
            fixed_seed_config(),
        )
        .expect("scene builds with placeholders");
        scene.step(16.0);
        scene.render(&mut gfx);
        // Backdrop plus the two HUD strips; every model lacks a mesh.
        assert_eq!(gfx.last_frame().len(), 3);
    }

    #[test]
    fn queued_keys_reach_the_sleigh_on_step() {
        let mut gfx = RecordingGraphics::new();
        let mut scene =
            GameScene::new(&mut gfx, &store_with_models(), fixed_seed_config()).expect("scene");
        scene.key_event(Key::Right, true);
        assert_eq!(scene.simulation().sleigh().thrust.x, 0.0);
        scene.step(16.0);
        assert_eq!(scene.simulation().sleigh().thrust.x, 1.0);
        assert!(scene.simulation().sleigh().velocity.x > 0.0);
    }

    #[test]
    fn reset_starts_a_new_session_with_same_seed() {
        let mut gfx = RecordingGraphics::new();
        let mut config = fixed_seed_config();
        config.spirit.decay_per_ms = 10.0;
        let mut scene = GameScene::new(&mut gfx, &store_with_models(), config.clone())
            .expect("scene");
        let seed = scene.simulation().rng_seed();
        scene.step(200.0);
        assert!(scene.is_game_over());

        scene.reset(fixed_seed_config());
        assert!(!scene.is_game_over());
        assert_eq!(scene.simulation().score(), 0);
        assert_eq!(scene.simulation().rng_seed(), seed);
        assert!(scene.simulation().models().sleigh.mesh.is_some());

        let stats = scene.stats(7, false);
        assert_eq!(stats.draw_calls, 7);
        assert_eq!(stats.phase_label, ScenePhase::Active.label());
        assert_eq!(stats.houses, scene.simulation().house_count());
    }
}
