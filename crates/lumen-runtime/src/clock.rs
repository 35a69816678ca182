//! Host-driven frame clock

use std::time::Instant;

/// Tracks frame time for the subsystem.
///
/// Two timelines are kept: wall time, which feeds the frame rate monitor
/// unmodified, and simulation time, whose per-frame delta is clamped so a
/// long stall doesn't explode the integrator.
pub struct FrameClock {
    /// Total simulated time in seconds
    pub total_time: f64,
    /// Clamped time since last frame in seconds
    pub delta_time: f64,
    /// Largest delta the simulation will see (default: 250ms)
    pub max_delta: f64,
    /// Unclamped elapsed time in milliseconds
    wall_ms: f64,
    frame: u64,
    last_instant: Option<Instant>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            max_delta: 0.25,
            wall_ms: 0.0,
            frame: 0,
            last_instant: None,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by a host-measured `dt` in seconds. Returns the clamped delta.
    pub fn advance(&mut self, dt: f64) -> f64 {
        let dt = dt.max(0.0);
        self.frame += 1;
        self.wall_ms += dt * 1000.0;
        self.delta_time = dt.min(self.max_delta);
        self.total_time += self.delta_time;
        self.delta_time
    }

    /// Advance from the real clock. The first tick has a zero delta.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let dt = self
            .last_instant
            .map_or(0.0, |last| now.duration_since(last).as_secs_f64());
        self.last_instant = Some(now);
        self.advance(dt)
    }

    /// Wall-clock timestamp in milliseconds, for the frame rate monitor
    pub fn now_ms(&self) -> f64 {
        self.wall_ms
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
