//! Gameplay state and the fixed-step update that advances it.
//!
//! `Simulation` owns every entity collection and meter. The render pass only
//! reads it. One call to [`Simulation::step`] resolves collisions against the
//! state left by the previous step, then moves the world forward by `dt_ms`.

use glam::Vec3;
use gd_core::math::{clamp_magnitude, move_towards};
use gd_core::random::SceneRng;

use crate::collision::{aabb_overlaps, find_delivery};
use crate::config::GameConfig;
use crate::entities::{EnemyGrinch, GiftBox, HouseRow, SceneModels, Sleigh};
use crate::world::{advance_row, build_house_row};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Active,
    GameOver,
}

impl ScenePhase {
    pub fn label(self) -> &'static str {
        match self {
            ScenePhase::Active => "active",
            ScenePhase::GameOver => "game over",
        }
    }
}

pub struct Simulation {
    config: GameConfig,
    models: SceneModels,
    rng: SceneRng,
    sleigh: Sleigh,
    gift_boxes: Vec<GiftBox>,
    enemies: Vec<EnemyGrinch>,
    house_rows: Vec<HouseRow>,
    score: u64,
    holiday_spirit: f32,
    scroll_rate: f32,
    elapsed_ms: f64,
    seconds_awarded: u64,
    last_launch_ms: f64,
    launch_relaxed: bool,
    last_enemy_spawn_ms: f64,
    enemy_spawn_interval_ms: f64,
    overlay_timer_ms: f64,
    phase: ScenePhase,
}

impl Simulation {
    pub fn new(config: GameConfig, models: SceneModels, mut rng: SceneRng) -> Self {
        let sleigh = Sleigh::new(
            Vec3::new(config.sleigh.start_x, config.sleigh.start_y(), 0.0),
            models.sleigh.dimensions,
        );

        let houses = &config.houses;
        let house_rows = (0..houses.row_count)
            .map(|i| {
                build_house_row(
                    houses.baseline_y + houses.row_offset_y * i as f32,
                    houses.row_offset_z * i as f32,
                    houses.outer_extent,
                    houses.gap,
                    &models.houses,
                    &mut rng,
                )
            })
            .collect::<Vec<_>>();
        log::info!(
            "Simulation ready: {} house row(s), {} houses, seed {}",
            house_rows.len(),
            house_rows.iter().map(|r| r.houses.len()).sum::<usize>(),
            rng.seed()
        );

        Self {
            holiday_spirit: config.spirit.max,
            scroll_rate: config.world.progress_rate,
            overlay_timer_ms: config.overlay.refresh_interval_ms,
            config,
            models,
            rng,
            sleigh,
            gift_boxes: Vec::new(),
            enemies: Vec::new(),
            house_rows,
            score: 0,
            elapsed_ms: 0.0,
            seconds_awarded: 0,
            last_launch_ms: 0.0,
            launch_relaxed: true,
            last_enemy_spawn_ms: 0.0,
            enemy_spawn_interval_ms: 0.0,
            phase: ScenePhase::Active,
        }
    }

    pub fn step(&mut self, dt_ms: f64) {
        let dt_ms = dt_ms.max(0.0);
        let dt = dt_ms as f32;

        if self.phase == ScenePhase::Active {
            self.resolve_collisions();
            self.update_sleigh(dt);
            self.update_gift_boxes(dt);
            self.update_enemies(dt);
            for row in &mut self.house_rows {
                advance_row(
                    row,
                    self.scroll_rate,
                    dt,
                    self.config.houses.gap,
                    &self.models.houses,
                    &mut self.rng,
                );
            }
            self.update_meters(dt);
        }

        let interval = self.config.overlay.refresh_interval_ms;
        if self.overlay_timer_ms < interval {
            self.overlay_timer_ms += dt_ms;
        } else {
            self.overlay_timer_ms = 0.0;
        }
        self.elapsed_ms += dt_ms;

        if self.phase == ScenePhase::Active && self.holiday_spirit <= self.config.spirit.min {
            self.phase = ScenePhase::GameOver;
            log::info!(
                "Game over after {:.1}s, final score {}",
                self.elapsed_ms / 1000.0,
                self.score
            );
        }
    }

    /// Handle a launch command. A positive magnitude fires when allowed; a
    /// zero magnitude marks the control as released. Returns true on launch.
    pub fn request_launch(&mut self, magnitude: f32) -> bool {
        let pressed = magnitude > 0.0;
        if pressed && self.can_launch() {
            self.last_launch_ms = self.elapsed_ms;
            self.launch_relaxed = false;
            self.spawn_gift_box();
            true
        } else {
            self.launch_relaxed = !pressed;
            false
        }
    }

    pub fn can_launch(&self) -> bool {
        self.elapsed_ms - self.last_launch_ms >= self.config.gift_box.launch_interval_ms
            && self.launch_relaxed
            && self.phase == ScenePhase::Active
            && self.gift_boxes.len() < self.config.gift_box.max_live
    }

    pub fn overlay_refresh_due(&self) -> bool {
        self.overlay_timer_ms >= self.config.overlay.refresh_interval_ms
    }

    /// Spirit mapped onto `[0, 1]` for display.
    pub fn spirit_fraction(&self) -> f32 {
        let spirit = &self.config.spirit;
        let span = spirit.max - spirit.min;
        if span <= 0.0 {
            return 0.0;
        }
        (self.holiday_spirit.clamp(spirit.min, spirit.max) - spirit.min) / span
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn holiday_spirit(&self) -> f32 {
        self.holiday_spirit
    }

    pub fn scroll_rate(&self) -> f32 {
        self.scroll_rate
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn rng_seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn models(&self) -> &SceneModels {
        &self.models
    }

    pub fn sleigh(&self) -> &Sleigh {
        &self.sleigh
    }

    pub fn sleigh_mut(&mut self) -> &mut Sleigh {
        &mut self.sleigh
    }

    pub fn gift_boxes(&self) -> &[GiftBox] {
        &self.gift_boxes
    }

    pub fn enemies(&self) -> &[EnemyGrinch] {
        &self.enemies
    }

    pub fn house_rows(&self) -> &[HouseRow] {
        &self.house_rows
    }

    pub fn house_count(&self) -> usize {
        self.house_rows.iter().map(|row| row.houses.len()).sum()
    }

    fn add_spirit(&mut self, amount: f32) {
        self.holiday_spirit = (self.holiday_spirit + amount).min(self.config.spirit.max);
    }

    fn resolve_collisions(&mut self) {
        let sleigh = &self.sleigh;
        let before = self.enemies.len();
        self.enemies.retain(|enemy| {
            !aabb_overlaps(sleigh.position, sleigh.dimensions, enemy.position, enemy.dimensions)
        });
        let contacts = before - self.enemies.len();
        if contacts > 0 {
            self.holiday_spirit -= self.config.spirit.contact_penalty * contacts as f32;
            log::debug!("Sleigh hit {contacts} grinch(es)");
        }

        // Deliveries only count against the front row.
        let mut delivered = 0u64;
        if let Some(row) = self.house_rows.first() {
            let threshold = self.config.spirit.chimney_threshold;
            self.gift_boxes.retain(|gift| {
                let hit = find_delivery(gift, row, threshold).is_some();
                if hit {
                    delivered += 1;
                }
                !hit
            });
        }
        if delivered > 0 {
            self.score += self.config.scoring.delivery * delivered;
            self.add_spirit(self.config.spirit.delivery_bonus * delivered as f32);
        }

        let enemies = &mut self.enemies;
        let mut destroyed = 0u64;
        self.gift_boxes.retain(|gift| {
            let hit = enemies.iter().rposition(|enemy| {
                aabb_overlaps(gift.position, gift.dimensions, enemy.position, enemy.dimensions)
            });
            match hit {
                Some(index) => {
                    enemies.remove(index);
                    destroyed += 1;
                    false
                }
                None => true,
            }
        });
        if destroyed > 0 {
            self.score += self.config.scoring.enemy_destroyed * destroyed;
            self.add_spirit(self.config.spirit.enemy_destroyed_bonus * destroyed as f32);
        }
    }

    fn update_sleigh(&mut self, dt: f32) {
        let cfg = &self.config.sleigh;
        let sleigh = &mut self.sleigh;

        let delta_v = sleigh.thrust * (cfg.acceleration * dt);
        let mut velocity = sleigh.velocity + delta_v;
        for axis in 0..3 {
            // Unpowered axes coast down to rest at the same rate thrust builds.
            if delta_v[axis] == 0.0 {
                velocity[axis] = move_towards(velocity[axis], 0.0, cfg.acceleration * dt);
            }
            velocity[axis] = clamp_magnitude(velocity[axis], cfg.max_velocity);
        }
        sleigh.velocity = velocity;

        let next = sleigh.position + velocity * dt;
        sleigh.position = Vec3::new(
            next.x.clamp(cfg.min_x, cfg.max_x),
            next.y.clamp(cfg.min_y, cfg.max_y),
            next.z,
        );
    }

    fn update_gift_boxes(&mut self, dt: f32) {
        let cfg = &self.config.gift_box;
        let gravity = self.config.world.gravity;
        for gift in &mut self.gift_boxes {
            gift.rotation += Vec3::splat(cfg.spin_rate * dt);
            gift.position += gift.velocity * dt;
            gift.velocity.y -= gravity * dt;
        }
        let floor = cfg.floor_y;
        self.gift_boxes.retain(|gift| gift.position.y >= floor);
    }

    fn update_enemies(&mut self, dt: f32) {
        for enemy in &mut self.enemies {
            enemy.position.x += enemy.velocity.x * dt;
        }
        let removal_x = self.config.grinch.removal_x;
        self.enemies.retain(|enemy| enemy.position.x >= removal_x);

        let cfg = &self.config.grinch;
        let interval_elapsed =
            self.elapsed_ms - self.last_enemy_spawn_ms > self.enemy_spawn_interval_ms;
        if interval_elapsed && self.elapsed_ms > cfg.initial_delay_ms {
            let enemy = EnemyGrinch {
                position: Vec3::new(cfg.spawn_x, self.rng.range_f32(cfg.min_y, cfg.max_y), 0.0),
                velocity: Vec3::new(-self.rng.range_f32(cfg.min_speed, cfg.max_speed), 0.0, 0.0),
                dimensions: self.models.grinch.dimensions,
            };
            self.enemies.push(enemy);
            self.last_enemy_spawn_ms = self.elapsed_ms;
            self.enemy_spawn_interval_ms = self
                .rng
                .range_f64(cfg.min_spawn_interval_ms, cfg.max_spawn_interval_ms);
        }
    }

    fn update_meters(&mut self, dt: f32) {
        if self.elapsed_ms / 1000.0 > self.seconds_awarded as f64 {
            self.seconds_awarded += 1;
            self.score += self.config.scoring.per_second;
        }
        self.holiday_spirit -= self.config.spirit.decay_per_ms * dt;
        self.scroll_rate += self.config.world.progress_acceleration * dt;
    }

    fn spawn_gift_box(&mut self) {
        let cfg = &self.config.gift_box;
        let sleigh = &self.sleigh;
        let position = Vec3::new(
            sleigh.position.x + sleigh.dimensions.x / 2.0 + cfg.launch_margin_x,
            sleigh.position.y,
            0.0,
        );
        let speed = self.rng.range_f32(cfg.min_launch_speed, cfg.max_launch_speed);
        self.gift_boxes.push(GiftBox {
            position,
            velocity: Vec3::new(speed, 0.0, 0.0),
            rotation: Vec3::ZERO,
            dimensions: self.models.gift_box.dimensions,
        });
    }
}
