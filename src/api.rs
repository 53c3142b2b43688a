//! Public API for the aquarium simulation.
//!
//! [`Aquarium`] owns the ECS world, the tick schedule, and the simulation
//! clock. The host drives it with wall-clock timestamps and input events,
//! and reads frames back as [`Snapshot`]s.

use bevy_ecs::prelude::*;
use rand::{Rng, SeedableRng};

use crate::clock::{SimulationClock, TickTime};
use crate::components::{
    Bounds, FeedingConnections, FishBundle, FishIdGen, FishState, SimRng,
};
use crate::score::{RunState, ScoreBoard};
use crate::signal::{
    resolve_signal, PendingRunEnd, RunSummary, SignalSource, StaticSignalSource,
};
use crate::systems::behavior::{
    collect_views_system, fish_behavior_system, hunger_progression_system, FishViews, FoodViews,
};
use crate::systems::decay::{
    connection_decay_system, food_update_system, matrix_drop_update_system,
    particle_update_system,
};
use crate::systems::feeding::{consumption_system, hunting_system};
use crate::systems::input::{
    input_action_system, ActionQueue, PointerState, PrimaryAction, TapTracker,
};
use crate::systems::scheduler::{
    matrix_drop_spawn_system, predator_transform_system, respawn_system, EventTimers,
    RespawnQueue,
};
use crate::world::Snapshot;

/// Initial fish population bounds.
const INITIAL_POPULATION_MIN: u32 = 8;
const INITIAL_POPULATION_MAX: u32 = 12;

/// Configuration for creating an [`Aquarium`].
#[derive(Debug, Clone, Copy)]
pub struct AquariumConfig {
    pub width: f32,
    pub height: f32,
    /// Fixed RNG seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for AquariumConfig {
    fn default() -> Self {
        let bounds = Bounds::default();
        Self {
            width: bounds.width,
            height: bounds.height,
            seed: None,
        }
    }
}

/// Callback invoked once when a run ends, with the summary and the resolved
/// signal message.
pub type RunEndCallback = Box<dyn FnMut(&RunSummary, &str)>;

fn sim_running(state: Res<RunState>) -> bool {
    *state == RunState::Running
}

/// The simulation: ECS world, tick schedule, and clock in one handle.
pub struct Aquarium {
    world: World,
    schedule: Schedule,
    /// Reduced pipeline for the end screen: effects keep animating and
    /// scheduled respawns still land, but fish stay frozen.
    ended_schedule: Schedule,
    clock: SimulationClock,
    signal_source: Box<dyn SignalSource>,
    on_run_end: Option<RunEndCallback>,
}

impl Aquarium {
    pub fn new() -> Self {
        Self::with_config(AquariumConfig::default())
    }

    pub fn with_config(config: AquariumConfig) -> Self {
        let mut world = World::new();

        let rng = match config.seed {
            Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
            None => rand::rngs::StdRng::from_entropy(),
        };

        world.insert_resource(TickTime::default());
        world.insert_resource(Bounds {
            width: config.width,
            height: config.height,
        });
        world.insert_resource(SimRng(rng));
        world.insert_resource(FishIdGen::default());
        world.insert_resource(FeedingConnections::default());
        world.insert_resource(RunState::NotStarted);
        world.insert_resource(ScoreBoard::default());
        world.insert_resource(PendingRunEnd::default());
        world.insert_resource(PointerState::default());
        world.insert_resource(ActionQueue::default());
        world.insert_resource(TapTracker::default());
        world.insert_resource(EventTimers::default());
        world.insert_resource(RespawnQueue::default());
        world.insert_resource(FishViews::default());
        world.insert_resource(FoodViews::default());

        // One fully chained tick: input, scheduled events, behavior,
        // collisions, decay. Single-threaded and order-stable, which is
        // what keeps seeded runs reproducible. Everything after input is
        // gated per-system on Running, so a capture freezes the tank
        // within its own tick.
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                input_action_system,
                (
                    predator_transform_system,
                    matrix_drop_spawn_system,
                    respawn_system,
                    collect_views_system,
                    hunger_progression_system,
                    fish_behavior_system,
                    consumption_system,
                    hunting_system,
                    food_update_system,
                    particle_update_system,
                    matrix_drop_update_system,
                    connection_decay_system,
                )
                    .chain()
                    .distributive_run_if(sim_running),
            )
                .chain(),
        );

        // After a capture the tank becomes a still life: no input, no
        // behavior, no collisions, no predator timer. Decay, background
        // rain, and the respawn queue keep running so the capture burst
        // plays out and the scheduled respawn lands.
        let mut ended_schedule = Schedule::default();
        ended_schedule.add_systems(
            (
                matrix_drop_spawn_system,
                respawn_system,
                food_update_system,
                particle_update_system,
                matrix_drop_update_system,
                connection_decay_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            ended_schedule,
            clock: SimulationClock::new(),
            signal_source: Box::new(StaticSignalSource),
            on_run_end: None,
        }
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Begin a run: spawn the initial school, randomize the event timers,
    /// and start ticking. No-op unless the run has not started yet.
    pub fn start(&mut self) {
        if *self.world.resource::<RunState>() != RunState::NotStarted {
            return;
        }
        let bounds = *self.world.resource::<Bounds>();
        let count = {
            let mut rng = self.world.resource_mut::<SimRng>();
            rng.0.gen_range(INITIAL_POPULATION_MIN..=INITIAL_POPULATION_MAX)
        };
        for _ in 0..count {
            let id = self.world.resource_mut::<FishIdGen>().next();
            let bundle = {
                let mut rng = self.world.resource_mut::<SimRng>();
                FishBundle::random(&mut rng.0, &bounds, id)
            };
            self.world.spawn(bundle);
        }
        self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            world
                .resource_mut::<EventTimers>()
                .randomize_intervals(&mut rng.0);
        });

        self.clock.reset();
        *self.world.resource_mut::<RunState>() = RunState::Running;
        tracing::info!(population = count, "run started");
    }

    /// Advance one tick. No-op while NotStarted or Paused. After a run
    /// ends, ticks keep driving the reduced end-screen pipeline. A
    /// panicking tick is logged and dropped rather than unwinding into the
    /// host.
    pub fn tick(&mut self, now_ms: f64) {
        let ended = match *self.world.resource::<RunState>() {
            RunState::Running => false,
            RunState::Ended => true,
            _ => return,
        };
        let delta = self.clock.advance(now_ms);
        self.world.resource_mut::<TickTime>().advance(delta);

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            if ended {
                self.ended_schedule.run(&mut self.world);
            } else {
                self.schedule.run(&mut self.world);
            }
        }));
        if outcome.is_err() {
            tracing::error!(tick = self.world.resource::<TickTime>().tick, "tick panicked, frame dropped");
            return;
        }

        let ended = self.world.resource_mut::<PendingRunEnd>().0.take();
        if let Some(summary) = ended {
            let message = resolve_signal(self.signal_source.as_mut(), &summary);
            tracing::info!(score = summary.score, %message, "run complete");
            if let Some(callback) = self.on_run_end.as_mut() {
                callback(&summary, &message);
            }
        }
    }

    pub fn pause(&mut self) {
        let mut state = self.world.resource_mut::<RunState>();
        if *state == RunState::Running {
            *state = RunState::Paused;
        }
    }

    /// Resume from pause. The clock is reset so the paused span is not
    /// replayed; the next tick sees the nominal delta.
    pub fn resume(&mut self) {
        let mut state = self.world.resource_mut::<RunState>();
        if *state == RunState::Paused {
            *state = RunState::Running;
            self.clock.reset();
        }
    }

    pub fn toggle_pause(&mut self) {
        match *self.world.resource::<RunState>() {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
            _ => {}
        }
    }

    pub fn run_state(&self) -> RunState {
        *self.world.resource::<RunState>()
    }

    // ========================================================================
    // HOST INPUT
    // ========================================================================

    /// Report the pointer position in tank coordinates.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.world.resource_mut::<PointerState>().0 = Some((x, y));
    }

    /// Report that the pointer left the tank.
    pub fn clear_pointer(&mut self) {
        self.world.resource_mut::<PointerState>().0 = None;
    }

    /// Queue a primary action (click/tap) for the next tick. `at_ms` is the
    /// host timestamp used by the double-action classifier.
    pub fn primary_action(&mut self, x: f32, y: f32, at_ms: f64) {
        self.world
            .resource_mut::<ActionQueue>()
            .0
            .push(PrimaryAction { x, y, at_ms });
    }

    /// Resize the tank. Entities keep their positions; the boundary forces
    /// and hard clamps pull strays back inside on subsequent ticks.
    pub fn resize(&mut self, width: f32, height: f32) {
        let mut bounds = self.world.resource_mut::<Bounds>();
        bounds.width = width;
        bounds.height = height;
    }

    // ========================================================================
    // OUTPUT
    // ========================================================================

    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world)
    }

    pub fn snapshot_json(&mut self) -> Result<String, serde_json::Error> {
        self.snapshot().to_json()
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<ScoreBoard>().score
    }

    pub fn population(&mut self) -> usize {
        self.world.query::<&FishState>().iter(&self.world).count()
    }

    /// Replace the run-end signal source.
    pub fn set_signal_source(&mut self, source: Box<dyn SignalSource>) {
        self.signal_source = source;
    }

    /// Register the run-end callback. Invoked at most once per run, after
    /// the ending tick has fully completed.
    pub fn on_run_end(&mut self, callback: RunEndCallback) {
        self.on_run_end = Some(callback);
    }

    /// Direct world access for tests and custom tooling.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for Aquarium {
    fn default() -> Self {
        Self::new()
    }
}
