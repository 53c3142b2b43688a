//! Score tracking and run lifecycle state.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Running totals for the current run.
#[derive(Resource, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub score: u32,
    /// Fish killed by predators this run.
    pub fish_eaten: u32,
    /// Simulated run duration in ms, frozen at capture.
    pub elapsed_ms: f64,
}

/// Capture reward: base points for current size plus a growth bonus for
/// size gained since spawn.
pub fn capture_score(size: f32, original_size: f32) -> u32 {
    let base = (size * 15.0).floor() as u32;
    let growth = (((size - original_size) * 20.0).max(0.0)).floor() as u32;
    base + growth
}

/// Top-level run state machine. `tick` is a no-op while NotStarted or
/// Paused; Ended ticks drive a reduced end-screen pipeline.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    NotStarted,
    Running,
    Paused,
    Ended,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::NotStarted => "not-started",
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Ended => "ended",
        }
    }
}
