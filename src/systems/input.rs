//! Pointer input: flee pressure, food drops, and capture attempts.
//!
//! The host feeds pointer positions and primary actions between ticks; the
//! action queue is drained here, at tick entry, so every world mutation
//! happens inside the tick.

use bevy_ecs::prelude::*;

use crate::clock::TickTime;
use crate::components::{FishBody, FishState, FoodBundle, FoodPellet, Position, SimRng, Velocity};
use crate::effects::{spawn_capture_effect, spawn_score_popup};
use crate::score::{capture_score, RunState, ScoreBoard};
use crate::signal::{PendingRunEnd, RunSummary};
use crate::systems::scheduler::RespawnQueue;

/// Two primary actions within this window classify as a food drop.
pub const DOUBLE_ACTION_WINDOW_MS: f64 = 300.0;
/// Capture reach, as a multiple of the target's size.
const CAPTURE_RADIUS_FACTOR: f32 = 1.5;
/// Respawn delay after a successful capture, ms.
const CAPTURE_RESPAWN_DELAY_MS: f64 = 2_000.0;

/// Last reported pointer position. `None` until the host reports one, so
/// fish are not spooked by a phantom pointer at the origin.
#[derive(Resource, Debug, Default)]
pub struct PointerState(pub Option<(f32, f32)>);

/// A primary action (click/tap) with its host timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryAction {
    pub x: f32,
    pub y: f32,
    pub at_ms: f64,
}

/// Actions reported since the last tick, drained in arrival order.
#[derive(Resource, Debug, Default)]
pub struct ActionQueue(pub Vec<PrimaryAction>);

/// Timestamp memory for the double-action classifier.
#[derive(Resource, Debug, Default)]
pub struct TapTracker {
    pub last_action_ms: Option<f64>,
}

/// What a primary action means once classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    CaptureAttempt,
    FoodDrop,
}

/// An action within [`DOUBLE_ACTION_WINDOW_MS`] of the previous one is a
/// food drop; otherwise it is a capture attempt. Every action refreshes the
/// window, so a rapid chain of actions keeps dropping food.
pub fn classify_action(tracker: &mut TapTracker, at_ms: f64) -> ActionKind {
    let kind = match tracker.last_action_ms {
        Some(last) if at_ms - last <= DOUBLE_ACTION_WINDOW_MS => ActionKind::FoodDrop,
        _ => ActionKind::CaptureAttempt,
    };
    tracker.last_action_ms = Some(at_ms);
    kind
}

/// Drain the action queue. Food drops spawn pellets; capture attempts scan
/// for a threat fish in reach and, on a hit, score it and end the run.
pub fn input_action_system(
    mut commands: Commands,
    time: Res<TickTime>,
    mut queue: ResMut<ActionQueue>,
    mut tracker: ResMut<TapTracker>,
    mut rng: ResMut<SimRng>,
    mut run_state: ResMut<RunState>,
    mut board: ResMut<ScoreBoard>,
    mut pending: ResMut<PendingRunEnd>,
    mut respawns: ResMut<RespawnQueue>,
    mut fish: Query<(Entity, &Position, &mut Velocity, &FishBody, &FishState)>,
    mut pellets: Query<&mut Velocity, (With<FoodPellet>, Without<FishState>)>,
) {
    let actions = std::mem::take(&mut queue.0);
    for action in actions {
        if *run_state == RunState::Ended {
            break;
        }
        match classify_action(&mut tracker, action.at_ms) {
            ActionKind::FoodDrop => {
                commands.spawn(FoodBundle::random(&mut rng.0, action.x, action.y));
            }
            ActionKind::CaptureAttempt => {
                // First threat in iteration order within reach wins
                let hit = fish.iter().find_map(|(entity, pos, _, body, state)| {
                    if !state.is_threat() {
                        return None;
                    }
                    let dx = pos.x - action.x;
                    let dy = pos.y - action.y;
                    let dist = (dx * dx + dy * dy).sqrt();
                    (dist <= body.size * CAPTURE_RADIUS_FACTOR)
                        .then(|| (entity, *pos, *body))
                });
                let Some((entity, pos, body)) = hit else {
                    continue;
                };

                let reward = capture_score(body.size, body.original_size);
                board.score += reward;
                board.elapsed_ms = time.elapsed_ms;

                spawn_capture_effect(&mut commands, &mut rng.0, pos.x, pos.y, body.size);
                spawn_score_popup(&mut commands, pos.x, pos.y, reward);
                commands.entity(entity).despawn();
                respawns.0.push(time.elapsed_ms + CAPTURE_RESPAWN_DELAY_MS);

                *run_state = RunState::Ended;
                pending.0 = Some(RunSummary::from_board(&board));
                tracing::info!(score = board.score, "run ended by capture");

                // Freeze the tank for the end screen
                for (_, _, mut velocity, _, _) in fish.iter_mut() {
                    *velocity = Velocity::default();
                }
                for mut velocity in pellets.iter_mut() {
                    *velocity = Velocity::default();
                }
            }
        }
    }
}
