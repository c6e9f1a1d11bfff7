#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

/// Per-frame timing visible to behaviors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    delta_time: f32,
    elapsed: f64,
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous frame.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Seconds accumulated over every frame so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub(crate) fn advance(&mut self, delta: f32) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.delta_time = delta;
        self.elapsed += f64::from(delta);
        self.frame_count += 1;
    }
}

/// Monotonic clock for native hosts.
///
/// Deltas are clamped so a stall (debugger, minimized window) does not hand
/// the simulation one enormous step.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    dt_min: Duration,
    dt_max: Duration,
}

#[cfg(not(target_arch = "wasm32"))]
impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            dt_min,
            dt_max,
        }
    }

    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Seconds since the previous tick, clamped.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;
        dt.as_secs_f32()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
