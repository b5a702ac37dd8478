//! Gameplay tuning. Every value has a built-in default; `assets/config/game.json`
//! may override any subset of them.
//!
//! Distances are world units (already multiplied by `WORLD_SCALE`), times are
//! milliseconds, rates are per millisecond.

use gd_core::input::TiltConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Metres to render-space units.
pub const WORLD_SCALE: f32 = 0.156;

pub const CONFIG_PATH: &str = "assets/config/game.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed seed for reproducible sessions. `None` seeds from the clock.
    pub rng_seed: Option<u64>,
    pub world: WorldConfig,
    pub sleigh: SleighConfig,
    pub houses: HouseConfig,
    pub gift_box: GiftBoxConfig,
    pub grinch: GrinchConfig,
    pub scoring: ScoringConfig,
    pub spirit: SpiritConfig,
    pub overlay: OverlayConfig,
    pub tilt: TiltConfig,
    pub ambient_light: [f32; 3],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: f32,
    /// Initial house scroll rate.
    pub progress_rate: f32,
    /// Increase of the scroll rate per millisecond.
    pub progress_acceleration: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SleighConfig {
    pub model_scale: f32,
    pub acceleration: f32,
    pub max_velocity: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub start_x: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HouseConfig {
    /// Scale factor per house model, in model table order.
    pub model_scales: Vec<f32>,
    pub row_count: usize,
    pub baseline_y: f32,
    pub gap: f32,
    pub outer_extent: f32,
    pub row_offset_y: f32,
    pub row_offset_z: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GiftBoxConfig {
    pub model_scale: f32,
    pub min_launch_speed: f32,
    pub max_launch_speed: f32,
    pub launch_margin_x: f32,
    pub floor_y: f32,
    pub spin_rate: f32,
    pub max_live: usize,
    pub launch_interval_ms: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GrinchConfig {
    pub model_scale: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub spawn_x: f32,
    pub removal_x: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_spawn_interval_ms: f64,
    pub max_spawn_interval_ms: f64,
    pub initial_delay_ms: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub enemy_destroyed: u64,
    pub delivery: u64,
    pub per_second: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpiritConfig {
    pub min: f32,
    pub max: f32,
    pub decay_per_ms: f32,
    pub delivery_bonus: f32,
    pub enemy_destroyed_bonus: f32,
    pub contact_penalty: f32,
    pub chimney_threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub refresh_interval_ms: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            world: WorldConfig::default(),
            sleigh: SleighConfig::default(),
            houses: HouseConfig::default(),
            gift_box: GiftBoxConfig::default(),
            grinch: GrinchConfig::default(),
            scoring: ScoringConfig::default(),
            spirit: SpiritConfig::default(),
            overlay: OverlayConfig::default(),
            tilt: TiltConfig::default(),
            ambient_light: [-0.4, -0.3, -0.4],
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8e-6 * WORLD_SCALE,
            progress_rate: 2.0e-3 * WORLD_SCALE,
            progress_acceleration: 0.09e-6 * WORLD_SCALE,
        }
    }
}

impl Default for SleighConfig {
    fn default() -> Self {
        Self {
            model_scale: 0.4,
            acceleration: 150e-6 * WORLD_SCALE,
            max_velocity: 12e-3 * WORLD_SCALE,
            min_x: -5.1 * WORLD_SCALE,
            max_x: 5.1 * WORLD_SCALE,
            min_y: -1.0 * WORLD_SCALE,
            max_y: 5.8 * WORLD_SCALE,
            start_x: -5.0 * WORLD_SCALE,
        }
    }
}

impl SleighConfig {
    pub fn start_y(&self) -> f32 {
        (self.min_y + self.max_y) / 2.0
    }
}

impl Default for HouseConfig {
    fn default() -> Self {
        Self {
            model_scales: vec![1.75, 1.45, 1.45, 0.75],
            row_count: 1,
            baseline_y: -7.70 * WORLD_SCALE,
            gap: 0.35 * WORLD_SCALE,
            outer_extent: 13.0 * WORLD_SCALE,
            row_offset_y: 1.3 * WORLD_SCALE,
            row_offset_z: 0.96 * WORLD_SCALE,
        }
    }
}

impl Default for GiftBoxConfig {
    fn default() -> Self {
        Self {
            model_scale: 0.12,
            min_launch_speed: 3e-3 * WORLD_SCALE,
            max_launch_speed: 16e-3 * WORLD_SCALE,
            launch_margin_x: 0.7 * WORLD_SCALE,
            floor_y: -8.0 * WORLD_SCALE,
            spin_rate: 2.0 * std::f32::consts::PI / 1000.0,
            max_live: 4,
            launch_interval_ms: 400.0,
        }
    }
}

impl Default for GrinchConfig {
    fn default() -> Self {
        let sleigh = SleighConfig::default();
        Self {
            model_scale: 0.25,
            min_y: sleigh.min_y,
            max_y: sleigh.max_y,
            spawn_x: 8.0 * WORLD_SCALE,
            removal_x: -8.0 * WORLD_SCALE,
            min_speed: 3e-3 * WORLD_SCALE,
            max_speed: 12e-3 * WORLD_SCALE,
            min_spawn_interval_ms: 400.0,
            max_spawn_interval_ms: 1950.0,
            initial_delay_ms: 7000.0,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            enemy_destroyed: 50,
            delivery: 1000,
            per_second: 5,
        }
    }
}

impl Default for SpiritConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1000.0,
            decay_per_ms: 23.0 / 1000.0,
            delivery_bonus: 50.0,
            enemy_destroyed_bonus: 8.0,
            contact_penalty: 350.0,
            chimney_threshold: 0.1,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 400.0,
        }
    }
}

/// Load overrides from `path`, falling back to defaults when the file is absent.
pub fn load_config_or_default(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::info!("No config at {}, using built-in defaults", path.display());
        return Ok(GameConfig::default());
    }
    load_config_from_path(path)
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    log::info!("Loaded game config from {}", path.display());
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    let ranges = [
        ("sleigh x bounds", config.sleigh.min_x, config.sleigh.max_x),
        ("sleigh y bounds", config.sleigh.min_y, config.sleigh.max_y),
        ("grinch y range", config.grinch.min_y, config.grinch.max_y),
        ("grinch speed", config.grinch.min_speed, config.grinch.max_speed),
        (
            "gift box launch speed",
            config.gift_box.min_launch_speed,
            config.gift_box.max_launch_speed,
        ),
        ("spirit range", config.spirit.min, config.spirit.max),
    ];
    for (name, min, max) in ranges {
        if !(min <= max) {
            return Err(format!(
                "Config validation failed: {name} min {min} exceeds max {max}"
            ));
        }
    }
    if config.grinch.min_spawn_interval_ms > config.grinch.max_spawn_interval_ms {
        return Err(format!(
            "Config validation failed: grinch spawn interval min {} exceeds max {}",
            config.grinch.min_spawn_interval_ms, config.grinch.max_spawn_interval_ms
        ));
    }

    let scales = [
        ("sleigh", config.sleigh.model_scale),
        ("gift box", config.gift_box.model_scale),
        ("grinch", config.grinch.model_scale),
    ];
    for (name, scale) in scales {
        if !(scale > 0.0) {
            return Err(format!(
                "Config validation failed: {name} model scale must be positive, got {scale}"
            ));
        }
    }
    if config.houses.model_scales.is_empty() {
        return Err("Config validation failed: houses.model_scales is empty".to_string());
    }
    if let Some(bad) = config.houses.model_scales.iter().find(|s| !(**s > 0.0)) {
        return Err(format!(
            "Config validation failed: house model scale must be positive, got {bad}"
        ));
    }
    if config.houses.row_count == 0 {
        return Err("Config validation failed: houses.row_count must be at least 1".to_string());
    }
    if !(config.houses.outer_extent > 0.0) {
        return Err("Config validation failed: houses.outer_extent must be positive".to_string());
    }
    if config.gift_box.max_live == 0 {
        return Err("Config validation failed: gift_box.max_live must be at least 1".to_string());
    }
    if !(config.overlay.refresh_interval_ms >= 0.0) {
        return Err("Config validation failed: overlay.refresh_interval_ms is negative".to_string());
    }
    if config.houses.model_scales.len() != 4 {
        log::warn!(
            "houses.model_scales has {} entries; house models without a scale use the last one",
            config.houses.model_scales.len()
        );
    }
    Ok(())
}
