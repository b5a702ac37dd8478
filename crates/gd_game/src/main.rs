//! Happy Holidays sleigh game: main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. Simulation runs inside
//! `RedrawRequested` on a fixed timestep (see `TimeState`):
//!
//!   1. `begin_frame()` measures the wall-clock delta and feeds the accumulator
//!   2. `while should_step()` consumes fixed-dt slices; queued input is
//!      dispatched to the sleigh at the start of each slice
//!   3. the scene render pass records its draws into `WgpuGraphics`
//!   4. the frame is presented with the egui debug overlay composited on top
//!
//! Input is edge-driven: only key transitions are queued, so holding a key
//! keeps its thrust until the release event arrives.

mod collision;
mod config;
mod entities;
mod input_binding;
mod model;
mod overlay;
#[cfg(test)]
mod recording;
mod render_pass;
#[cfg(test)]
mod replay;
mod resources;
mod scene;
mod simulation;
mod world;

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use config::{load_config_or_default, GameConfig, CONFIG_PATH};
use gd_core::input::{InputSource, InputState, Key};
use gd_core::time::TimeState;
use gd_devtools::DebugOverlay;
use gd_platform::window::PlatformConfig;
use gd_render::WgpuGraphics;
use resources::{asset_root, ResourceStore};
use scene::GameScene;

/// All mutable game state. Constructed lazily in `ApplicationHandler::resumed`
/// once the window and GPU surface are available.
struct GameState {
    window: Arc<Window>,
    gfx: WgpuGraphics,
    time: TimeState,
    input: InputState,
    debug_overlay: DebugOverlay,
    scene: GameScene,
    paused: bool,
    single_step_requested: bool,
}

impl GameState {
    fn new(window: Arc<Window>) -> Result<Self, String> {
        let mut gfx = WgpuGraphics::new(window.clone())?;
        let debug_overlay = DebugOverlay::new(gfx.device(), gfx.surface_format(), &window);

        let config = load_config_or_default(std::path::Path::new(CONFIG_PATH))?;
        let root = asset_root();
        let (resources, summary) = ResourceStore::load_from_dir(&root);
        log::info!(
            "Assets from {}: {} loaded, {} missing or malformed",
            root.display(),
            summary.loaded,
            summary.failed
        );
        let scene = GameScene::new(&mut gfx, &resources, config)
            .map_err(|e| format!("Scene initialisation failed: {e}"))?;

        Ok(Self {
            window,
            gfx,
            time: TimeState::new(),
            input: InputState::new(),
            debug_overlay,
            scene,
            paused: false,
            single_step_requested: false,
        })
    }

    /// Reload tuning from disk and start over. A broken config file keeps the
    /// values the current session was running with.
    fn restart_session(&mut self, reason: &str) {
        let config = match load_config_or_default(std::path::Path::new(CONFIG_PATH)) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{err}; keeping current tuning");
                self.scene.simulation().config().clone()
            }
        };
        log::info!("Restarting session ({reason})");
        self.scene.reset(config);
    }

    fn post_pointer(&mut self, pressed: bool) {
        self.scene
            .dispatcher_mut()
            .post(InputSource::Touch, if pressed { 1.0 } else { 0.0 });
    }
}

struct App {
    config: PlatformConfig,
    state: Option<GameState>,
}

impl App {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = match gd_platform::window::create_window(event_loop, &self.config) {
            Ok(window) => window,
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
                return;
            }
        };
        log::info!("Window created: {}x{}", self.config.width, self.config.height);
        match GameState::new(window) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gfx.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        let pressed = event.state == ElementState::Pressed;
                        let changed = if pressed {
                            state.input.key_down(key)
                        } else {
                            state.input.key_up(key)
                        };
                        if changed {
                            state.scene.key_event(key, pressed);
                        }
                    }
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } if !egui_consumed => {
                state.post_pointer(button_state == ElementState::Pressed);
            }

            WindowEvent::Touch(touch) => match touch.phase {
                TouchPhase::Started => state.post_pointer(true),
                TouchPhase::Ended | TouchPhase::Cancelled => state.post_pointer(false),
                TouchPhase::Moved => {}
            },

            WindowEvent::RedrawRequested => {
                let (width, height) = state.gfx.size();
                if width == 0 || height == 0 {
                    return;
                }

                state.time.begin_frame();
                while state.time.should_step() {
                    if state.input.is_just_pressed(Key::Escape) {
                        event_loop.exit();
                        return;
                    }
                    if state.input.is_just_pressed(Key::F3) {
                        state.debug_overlay.toggle();
                    }
                    if state.input.is_just_pressed(Key::R) && state.scene.is_game_over() {
                        state.restart_session("R after game over");
                    }

                    if state.paused && !state.single_step_requested {
                        break;
                    }
                    state.single_step_requested = false;

                    let dt_ms = state.time.fixed_dt_ms;
                    state.scene.step(dt_ms);
                }

                state.scene.render(&mut state.gfx);

                let stats = state.scene.stats(state.gfx.draws_last_frame(), state.paused);
                let (overlay_frame, overlay_actions) =
                    state
                        .debug_overlay
                        .prepare(&state.window, &state.time, &stats);

                if overlay_actions.toggle_pause {
                    state.paused = !state.paused;
                    log::info!(
                        "Simulation {}",
                        if state.paused { "PAUSED" } else { "RESUMED" }
                    );
                }
                if overlay_actions.single_step {
                    state.single_step_requested = true;
                }

                let debug_overlay = &mut state.debug_overlay;
                state.gfx.present(|device, queue, encoder, view| {
                    debug_overlay.draw(
                        device,
                        queue,
                        encoder,
                        view,
                        [width, height],
                        &overlay_frame,
                    );
                });
                debug_overlay.cleanup(&overlay_frame.textures_delta);

                if overlay_actions.restart_session {
                    state.restart_session("debug overlay");
                }

                // Only clear edge-triggered input after at least one fixed
                // step consumed it, so presses on zero-step frames survive.
                if state.time.steps_this_frame > 0 {
                    state.input.end_frame();
                }
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Space => Some(Key::Space),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::KeyR => Some(Key::R),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Happy Holidays starting...");
    log::debug!("Default tuning: {:?}", GameConfig::default());

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}
