//! Scheduled global events, polled against accumulated simulation time.
//!
//! All timers are elapsed-ms accumulators fed by [`TickTime`], so events
//! fire on simulated time and freeze across pauses.

use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;

use crate::clock::TickTime;
use crate::components::{
    Bounds, FishBundle, FishIdGen, FishState, Hunger, MatrixDropBundle, SimRng,
};

/// Earliest a predator transformation can fire after the previous one, ms.
pub const PREDATOR_INTERVAL_MIN_MS: f32 = 45_000.0;
/// Random spread added on top of the minimum, ms.
pub const PREDATOR_INTERVAL_RANGE_MS: f32 = 45_000.0;
/// Matrix drop spawn cadence bounds, ms.
pub const DROP_INTERVAL_MIN_MS: f32 = 150.0;
pub const DROP_INTERVAL_RANGE_MS: f32 = 100.0;
/// Respawns only fire while the population is below this floor.
pub const POPULATION_FLOOR: usize = 6;

/// Accumulators and randomized intervals for the global event timers.
#[derive(Resource, Debug)]
pub struct EventTimers {
    pub predator_timer: f32,
    pub predator_interval: f32,
    pub drop_timer: f32,
    pub drop_interval: f32,
}

impl Default for EventTimers {
    fn default() -> Self {
        Self {
            predator_timer: 0.0,
            predator_interval: PREDATOR_INTERVAL_MIN_MS,
            drop_timer: 0.0,
            drop_interval: DROP_INTERVAL_MIN_MS,
        }
    }
}

impl EventTimers {
    /// Redraw both intervals from their randomized ranges.
    pub fn randomize_intervals(&mut self, rng: &mut StdRng) {
        self.predator_interval =
            PREDATOR_INTERVAL_MIN_MS + rng.gen::<f32>() * PREDATOR_INTERVAL_RANGE_MS;
        self.drop_interval = DROP_INTERVAL_MIN_MS + rng.gen::<f32>() * DROP_INTERVAL_RANGE_MS;
    }
}

/// Fish respawn due-times (absolute elapsed ms), pushed by capture and kill
/// handling, drained here.
#[derive(Resource, Debug, Default)]
pub struct RespawnQueue(pub Vec<f64>);

// ============================================================================
// SYSTEMS
// ============================================================================

/// Every 45-90 s of simulated time, promote one random Normal fish to
/// Hungry, starting its ramp toward Predator.
pub fn predator_transform_system(
    time: Res<TickTime>,
    mut rng: ResMut<SimRng>,
    mut timers: ResMut<EventTimers>,
    mut query: Query<(Entity, &mut FishState, &mut Hunger)>,
) {
    timers.predator_timer += time.delta_ms;
    if timers.predator_timer < timers.predator_interval {
        return;
    }
    timers.predator_timer = 0.0;
    timers.predator_interval =
        PREDATOR_INTERVAL_MIN_MS + rng.0.gen::<f32>() * PREDATOR_INTERVAL_RANGE_MS;

    let candidates: Vec<Entity> = query
        .iter()
        .filter(|(_, state, _)| **state == FishState::Normal)
        .map(|(entity, _, _)| entity)
        .collect();
    if candidates.is_empty() {
        return;
    }

    let chosen = candidates[rng.0.gen_range(0..candidates.len())];
    if let Ok((_, mut state, mut hunger)) = query.get_mut(chosen) {
        *state = FishState::Hungry;
        hunger.level = 0.0;
        tracing::debug!(fish = ?chosen, "fish turned hungry");
    }
}

/// Spawn 1-2 background matrix drops on a randomized 150-250 ms cadence.
pub fn matrix_drop_spawn_system(
    mut commands: Commands,
    time: Res<TickTime>,
    bounds: Res<Bounds>,
    mut rng: ResMut<SimRng>,
    mut timers: ResMut<EventTimers>,
) {
    timers.drop_timer += time.delta_ms;
    if timers.drop_timer < timers.drop_interval {
        return;
    }
    timers.drop_timer = 0.0;
    timers.drop_interval = DROP_INTERVAL_MIN_MS + rng.0.gen::<f32>() * DROP_INTERVAL_RANGE_MS;

    let count = rng.0.gen_range(1..=2);
    for _ in 0..count {
        commands.spawn(MatrixDropBundle::random(&mut rng.0, bounds.width));
    }
}

/// Drain due respawn entries; each spawns one fish, but only while the
/// population sits below [`POPULATION_FLOOR`].
pub fn respawn_system(
    mut commands: Commands,
    time: Res<TickTime>,
    bounds: Res<Bounds>,
    mut rng: ResMut<SimRng>,
    mut ids: ResMut<FishIdGen>,
    mut queue: ResMut<RespawnQueue>,
    fish: Query<(), With<FishState>>,
) {
    if queue.0.is_empty() {
        return;
    }
    let elapsed = time.elapsed_ms;
    let due = queue.0.iter().filter(|&&at| at <= elapsed).count();
    queue.0.retain(|&at| at > elapsed);

    let mut population = fish.iter().count();
    for _ in 0..due {
        if population >= POPULATION_FLOOR {
            break;
        }
        let id = ids.next();
        commands.spawn(FishBundle::random(&mut rng.0, &bounds, id));
        population += 1;
    }
}
