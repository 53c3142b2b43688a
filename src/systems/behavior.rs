//! Fish behavior: per-tick view collection, hunger progression, state
//! resolution, force composition, and movement integration.
//!
//! Neighbor decisions read the [`FishViews`]/[`FoodViews`] snapshot taken at
//! the top of the group, so every fish reacts to the same frozen picture of
//! the tank regardless of iteration order.

use bevy_ecs::prelude::*;

use crate::clock::TickTime;
use crate::components::{
    Bounds, FishBody, FishState, FoodPellet, Glow, Heading, Hunger, Position, SchoolingRadii,
    SimRng, SwimProfile, Velocity, WanderState,
};
use crate::steering::{self, FishView, FoodView, Steering};
use crate::systems::input::PointerState;

// ============================================================================
// WEIGHTS AND TUNING
// ============================================================================

pub const HUNT_WEIGHT: f32 = 4.0;
pub const AVOID_WEIGHT: f32 = 3.5;
pub const FLEE_WEIGHT: f32 = 3.0;
pub const FOOD_WEIGHT: f32 = 2.0;
pub const BOUNDARY_WEIGHT: f32 = 2.0;
pub const SCHOOL_WEIGHT: f32 = 0.5;

const WANDER_WEIGHT_NORMAL: f32 = 0.3;
const WANDER_WEIGHT_BUSY: f32 = 0.1;
const WANDER_WEIGHT_PREDATOR: f32 = 0.2;

/// Hunger gained per tick while Hungry.
const HUNGER_RATE: f32 = 0.5;
/// Size multiplier gained over the full hunger ramp.
const HUNGER_SIZE_GAIN: f32 = 0.8;
/// Hunger level at which a Hungry fish becomes a Predator.
const PREDATOR_THRESHOLD: f32 = 100.0;

const FEEDING_SPEED_FACTOR: f32 = 1.5;
const PREDATOR_SPEED_FACTOR: f32 = 2.0;
/// Heading turns this much faster while fleeing.
const FLEE_TURN_FACTOR: f32 = 3.0;
/// Below this speed the heading target is left alone.
const HEADING_SPEED_FLOOR: f32 = 0.1;

// ============================================================================
// PER-TICK VIEW RESOURCES
// ============================================================================

/// Frozen per-tick snapshot of all fish, for neighbor queries.
#[derive(Resource, Debug, Default)]
pub struct FishViews(pub Vec<FishView>);

/// Frozen per-tick snapshot of all food pellets.
#[derive(Resource, Debug, Default)]
pub struct FoodViews(pub Vec<FoodView>);

/// Rebuild the view snapshots from the live entities.
pub fn collect_views_system(
    mut fish_views: ResMut<FishViews>,
    mut food_views: ResMut<FoodViews>,
    fish: Query<(Entity, &Position, &Velocity, &FishBody, &FishState)>,
    food: Query<(Entity, &Position, &FoodPellet)>,
) {
    fish_views.0.clear();
    for (entity, pos, vel, body, state) in fish.iter() {
        fish_views.0.push(FishView {
            entity,
            x: pos.x,
            y: pos.y,
            vx: vel.vx,
            vy: vel.vy,
            size: body.size,
            state: *state,
        });
    }

    food_views.0.clear();
    for (entity, pos, pellet) in food.iter() {
        food_views.0.push(FoodView {
            entity,
            x: pos.x,
            y: pos.y,
            size: pellet.size,
            opacity: pellet.opacity,
        });
    }
}

// ============================================================================
// HUNGER PROGRESSION
// ============================================================================

/// Advance the hunger ramp for Hungry fish and pulse predator glow.
///
/// Size along the ramp is written through `max` so a feeding-grown body is
/// never shrunk back by the ramp formula.
pub fn hunger_progression_system(
    time: Res<TickTime>,
    mut query: Query<(&mut FishState, &mut Hunger, &mut FishBody, &mut Glow)>,
) {
    for (mut state, mut hunger, mut body, mut glow) in query.iter_mut() {
        match *state {
            FishState::Hungry => {
                hunger.level += HUNGER_RATE;
                let progress = hunger.progress();
                body.size = body
                    .size
                    .max(body.original_size * (1.0 + HUNGER_SIZE_GAIN * progress));
                glow.intensity = progress;
                if hunger.level >= PREDATOR_THRESHOLD {
                    *state = FishState::Predator;
                    glow.intensity = 1.0;
                    tracing::debug!("hungry fish completed predator transformation");
                }
            }
            FishState::Predator => {
                glow.intensity = 0.8 + 0.2 * ((time.elapsed_ms * 0.01).sin() as f32);
            }
            _ => {}
        }
    }
}

// ============================================================================
// STATE RESOLUTION
// ============================================================================

/// How the weighted behavior forces resolved for one non-predator fish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub state: FishState,
    pub fx: f32,
    pub fy: f32,
    /// Whether schooling applies on top of the resolved forces.
    pub schools: bool,
}

/// Resolve a non-predator's next state from its steering forces, in fixed
/// priority order: predator avoidance, then food, then pointer flee.
///
/// Hungry and Predator are never entered here; Hungry can be left (a scared
/// hungry fish abandons its ramp and must be re-promoted by the timer).
pub fn resolve_state(
    current: FishState,
    avoid: &Steering,
    seek: &Steering,
    flee: &Steering,
) -> Resolution {
    let mut state = current;
    let mut fx = 0.0;
    let mut fy = 0.0;

    if avoid.is_active() {
        state = FishState::Fleeing;
        fx += avoid.fx * AVOID_WEIGHT;
        fy += avoid.fy * AVOID_WEIGHT;
    }

    if seek.is_active() {
        if state != FishState::Fleeing {
            state = FishState::Feeding;
        }
        fx += seek.fx * FOOD_WEIGHT;
        fy += seek.fy * FOOD_WEIGHT;
    } else if state == FishState::Feeding {
        state = FishState::Normal;
    }

    if flee.is_active() {
        state = FishState::Fleeing;
        fx += flee.fx * FLEE_WEIGHT;
        fy += flee.fy * FLEE_WEIGHT;
    } else if state == FishState::Fleeing && !avoid.is_active() {
        state = FishState::Normal;
    }

    Resolution {
        state,
        fx,
        fy,
        schools: state != FishState::Fleeing && state != FishState::Feeding,
    }
}

fn wander_weight(state: FishState) -> f32 {
    match state {
        FishState::Fleeing | FishState::Feeding => WANDER_WEIGHT_BUSY,
        FishState::Predator => WANDER_WEIGHT_PREDATOR,
        _ => WANDER_WEIGHT_NORMAL,
    }
}

fn speed_cap(state: FishState, profile: &SwimProfile) -> f32 {
    match state {
        FishState::Fleeing => profile.flee_speed,
        FishState::Feeding => profile.max_speed * FEEDING_SPEED_FACTOR,
        FishState::Predator => profile.max_speed * PREDATOR_SPEED_FACTOR,
        _ => profile.max_speed,
    }
}

// ============================================================================
// BEHAVIOR SYSTEM
// ============================================================================

/// Steer, resolve state, clamp speed, integrate, and turn every fish.
pub fn fish_behavior_system(
    bounds: Res<Bounds>,
    pointer: Res<PointerState>,
    fish_views: Res<FishViews>,
    food_views: Res<FoodViews>,
    mut rng: ResMut<SimRng>,
    mut query: Query<(
        Entity,
        &mut Position,
        &mut Velocity,
        &mut FishState,
        &mut Heading,
        &mut WanderState,
        &FishBody,
        &SwimProfile,
        &SchoolingRadii,
    )>,
) {
    for (entity, mut pos, mut vel, mut state, mut heading, mut wander, body, profile, radii) in
        query.iter_mut()
    {
        let subject = FishView {
            entity,
            x: pos.x,
            y: pos.y,
            vx: vel.vx,
            vy: vel.vy,
            size: body.size,
            state: *state,
        };

        if state.is_predator() {
            let hunt = steering::hunting_force(&subject, &fish_views.0);
            vel.vx += hunt.fx * HUNT_WEIGHT;
            vel.vy += hunt.fy * HUNT_WEIGHT;
        } else {
            let avoid = steering::predator_avoidance_force(&subject, &fish_views.0);
            let seek = steering::food_seeking_force(&subject, &food_views.0);
            let flee = steering::pointer_flee_force(&subject, pointer.0);

            let resolution = resolve_state(*state, &avoid, &seek, &flee);
            if resolution.state != *state {
                *state = resolution.state;
            }
            vel.vx += resolution.fx;
            vel.vy += resolution.fy;

            if resolution.schools {
                let (sx, sy) = steering::schooling_force(&subject, radii, &fish_views.0);
                vel.vx += sx * SCHOOL_WEIGHT;
                vel.vy += sy * SCHOOL_WEIGHT;
            }
        }

        let (wx, wy) =
            steering::wander_force(&subject, heading.angle, profile, &mut wander, &mut rng.0);
        let ww = wander_weight(*state);
        vel.vx += wx * ww;
        vel.vy += wy * ww;

        let (bx, by) = steering::boundary_force(pos.x, pos.y, &bounds);
        vel.vx += bx * BOUNDARY_WEIGHT;
        vel.vy += by * BOUNDARY_WEIGHT;

        vel.clamp_speed(speed_cap(*state, profile));

        pos.x += vel.vx;
        pos.y += vel.vy;

        // Hard stop at the walls; boundary force handles the approach.
        // Bounds can shrink below a grown fish's diameter, so the limits
        // are applied in max-then-min order rather than `clamp`.
        pos.x = pos.x.max(body.size).min((bounds.width - body.size).max(body.size));
        pos.y = pos.y.max(body.size).min((bounds.height - body.size).max(body.size));

        if vel.magnitude() > HEADING_SPEED_FLOOR {
            heading.target_angle = vel.vy.atan2(vel.vx);
        }
        let turn = if *state == FishState::Fleeing {
            profile.turn_speed * FLEE_TURN_FACTOR
        } else {
            profile.turn_speed
        };
        heading.angle = steering::lerp_angle(heading.angle, heading.target_angle, turn);
    }
}
