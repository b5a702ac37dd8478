use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// Fixed-timestep clock. All simulation quantities are in milliseconds.
pub struct TimeState {
    pub fixed_dt_ms: f64,
    pub max_frame_ms: f64,
    accumulator_ms: f64,
    pub total_time_ms: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt_ms: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_fixed_dt(1000.0 / 60.0)
    }

    pub fn with_fixed_dt(fixed_dt_ms: f64) -> Self {
        Self {
            fixed_dt_ms,
            max_frame_ms: 250.0,
            accumulator_ms: 0.0,
            total_time_ms: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt_ms: 0.0,
            last_instant: Instant::now(),
            fps_samples: [fixed_dt_ms; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 1000.0 / fixed_dt_ms,
            smoothed_frame_time_ms: fixed_dt_ms,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.last_instant).as_secs_f64() * 1000.0;
        self.last_instant = now;
        self.advance(elapsed_ms);
    }

    /// Feed a wall-clock delta into the accumulator.
    pub fn advance(&mut self, elapsed_ms: f64) {
        self.real_dt_ms = elapsed_ms.max(0.0);

        // Spiral-of-death cap
        if self.real_dt_ms > self.max_frame_ms {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt_ms,
                self.max_frame_ms
            );
            self.real_dt_ms = self.max_frame_ms;
        }

        self.accumulator_ms += self.real_dt_ms;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt_ms;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_ms: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_ms;
        self.smoothed_fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator_ms >= self.fixed_dt_ms {
            self.accumulator_ms -= self.fixed_dt_ms;
            self.total_time_ms += self.fixed_dt_ms;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
