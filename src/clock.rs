//! Simulation time: clamped wall-clock deltas plus the per-tick time
//! resource systems read.

use bevy_ecs::prelude::Resource;

/// Hard cap on a single tick's delta, in milliseconds. Long host stalls
/// (background tab, debugger pause) are absorbed as one slow frame instead
/// of a burst of catch-up motion.
pub const MAX_DELTA_MS: f32 = 33.33;

/// Delta reported for the first tick after a start or resume, when there is
/// no previous timestamp to diff against. One frame at 60 Hz.
pub const NOMINAL_DELTA_MS: f32 = 16.67;

/// Tracks the host timestamp of the previous tick and produces clamped
/// deltas. Not an ECS resource; owned by the API layer, which feeds the
/// result into [`TickTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationClock {
    last_ms: Option<f64>,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `now_ms` and return the clamped delta for this tick.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_ms {
            Some(last) => ((now_ms - last) as f32).clamp(0.0, MAX_DELTA_MS),
            None => NOMINAL_DELTA_MS,
        };
        self.last_ms = Some(now_ms);
        delta
    }

    /// Forget the previous timestamp. The next `advance` yields the nominal
    /// delta, so time paused does not leak into the first resumed tick.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Per-tick time resource. `elapsed_ms` accumulates only while running, so
/// timers and the predator glow pulse freeze across pauses.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct TickTime {
    /// Clamped delta for the current tick, in ms.
    pub delta_ms: f32,
    /// Total simulated time since the run started, in ms.
    pub elapsed_ms: f64,
    /// Monotonic tick counter.
    pub tick: u64,
}

impl TickTime {
    pub fn advance(&mut self, delta_ms: f32) {
        self.delta_ms = delta_ms;
        self.elapsed_ms += delta_ms as f64;
        self.tick += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_uses_nominal_delta() {
        let mut clock = SimulationClock::new();
        assert!((clock.advance(1000.0) - NOMINAL_DELTA_MS).abs() < 1e-4);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut clock = SimulationClock::new();
        clock.advance(0.0);
        // 5 second stall collapses to one slow frame
        assert!((clock.advance(5000.0) - MAX_DELTA_MS).abs() < 1e-4);
    }

    #[test]
    fn test_normal_delta_passes_through() {
        let mut clock = SimulationClock::new();
        clock.advance(0.0);
        assert!((clock.advance(16.0) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_reset_restores_nominal_delta() {
        let mut clock = SimulationClock::new();
        clock.advance(0.0);
        clock.advance(16.0);
        clock.reset();
        assert!((clock.advance(90_000.0) - NOMINAL_DELTA_MS).abs() < 1e-4);
    }

    #[test]
    fn test_backwards_timestamp_yields_zero() {
        let mut clock = SimulationClock::new();
        clock.advance(1000.0);
        assert_eq!(clock.advance(900.0), 0.0);
    }

    #[test]
    fn test_tick_time_accumulates() {
        let mut time = TickTime::default();
        time.advance(16.67);
        time.advance(16.67);
        assert_eq!(time.tick, 2);
        assert!((time.elapsed_ms - 33.34).abs() < 1e-3);
        assert!((time.delta_ms - 16.67).abs() < 1e-4);
    }
}
