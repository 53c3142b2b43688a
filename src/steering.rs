//! Steering behaviors for fish agents.
//!
//! Every behavior is a pure function over one subject agent plus read-only
//! per-tick views of the entity collections, returning a [`Steering`] force
//! with a magnitude in [0, 1]. A zero magnitude means "behavior inactive".
//! State resolution and force composition live in `systems::behavior`; this
//! module knows nothing about ECS scheduling.
//!
//! All normalizations special-case zero-length difference vectors and return
//! a zero force rather than NaN.

use bevy_ecs::prelude::Entity;
use rand::rngs::StdRng;
use rand::Rng;

use crate::components::{Bounds, FishState, SchoolingRadii, SwimProfile, WanderState};

/// Radius within which a predator scans for prey.
pub const HUNT_RADIUS: f32 = 150.0;
/// Prey must be smaller than this fraction of the predator's size.
pub const PREY_SIZE_RATIO: f32 = 0.67;
/// Radius within which normal fish react to predators and hungry fish.
pub const AVOID_RADIUS: f32 = 100.0;
/// Radius within which fish notice food pellets.
pub const FOOD_SEEK_RADIUS: f32 = 150.0;
/// Pellets faded below this opacity are ignored by food seeking.
pub const FOOD_MIN_OPACITY: f32 = 0.3;
/// Radius within which fish flee the pointer.
pub const POINTER_FLEE_RADIUS: f32 = 80.0;
/// Distance from an edge at which the boundary force engages.
pub const BOUNDARY_MARGIN: f32 = 50.0;

const EPSILON: f32 = 1e-4;

/// A 2D steering force plus its activation magnitude.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Steering {
    pub fx: f32,
    pub fy: f32,
    pub magnitude: f32,
}

impl Steering {
    pub const INACTIVE: Self = Self {
        fx: 0.0,
        fy: 0.0,
        magnitude: 0.0,
    };

    pub fn is_active(&self) -> bool {
        self.magnitude > 0.0
    }
}

/// Read-only per-tick view of one fish, collected before behavior runs.
#[derive(Debug, Clone, Copy)]
pub struct FishView {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub state: FishState,
}

/// Read-only per-tick view of one food pellet.
#[derive(Debug, Clone, Copy)]
pub struct FoodView {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub opacity: f32,
}

/// Hunting (Predator only): steer toward the nearest significantly smaller,
/// non-threat fish within [`HUNT_RADIUS`]. Magnitude scales linearly with
/// proximity.
pub fn hunting_force(subject: &FishView, fishes: &[FishView]) -> Steering {
    let mut closest: Option<&FishView> = None;
    let mut closest_dist = f32::MAX;

    for prey in fishes {
        if prey.entity == subject.entity || prey.state.is_threat() {
            continue;
        }
        if prey.size >= subject.size * PREY_SIZE_RATIO {
            continue;
        }
        let dx = prey.x - subject.x;
        let dy = prey.y - subject.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < HUNT_RADIUS && dist < closest_dist {
            closest = Some(prey);
            closest_dist = dist;
        }
    }

    match closest {
        Some(prey) if closest_dist > EPSILON => {
            let strength = (HUNT_RADIUS - closest_dist) / HUNT_RADIUS;
            Steering {
                fx: (prey.x - subject.x) / closest_dist * strength,
                fy: (prey.y - subject.y) / closest_dist * strength,
                magnitude: strength,
            }
        }
        _ => Steering::INACTIVE,
    }
}

/// Predator avoidance: accumulate proximity-weighted unit vectors away from
/// every threat within [`AVOID_RADIUS`], averaged across all threats.
pub fn predator_avoidance_force(subject: &FishView, fishes: &[FishView]) -> Steering {
    let mut fx = 0.0;
    let mut fy = 0.0;
    let mut threats = 0u32;

    for threat in fishes {
        if threat.entity == subject.entity || !threat.state.is_threat() {
            continue;
        }
        let dx = subject.x - threat.x;
        let dy = subject.y - threat.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < AVOID_RADIUS && dist > EPSILON {
            let strength = (AVOID_RADIUS - dist) / AVOID_RADIUS;
            fx += dx / dist * strength;
            fy += dy / dist * strength;
            threats += 1;
        }
    }

    if threats == 0 {
        return Steering::INACTIVE;
    }
    fx /= threats as f32;
    fy /= threats as f32;
    Steering {
        fx,
        fy,
        magnitude: (fx * fx + fy * fy).sqrt(),
    }
}

/// Food seeking: steer toward the nearest sufficiently opaque pellet within
/// [`FOOD_SEEK_RADIUS`].
pub fn food_seeking_force(subject: &FishView, foods: &[FoodView]) -> Steering {
    let mut closest: Option<&FoodView> = None;
    let mut closest_dist = f32::MAX;

    for food in foods {
        if food.opacity <= FOOD_MIN_OPACITY {
            continue;
        }
        let dx = food.x - subject.x;
        let dy = food.y - subject.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < FOOD_SEEK_RADIUS && dist < closest_dist {
            closest = Some(food);
            closest_dist = dist;
        }
    }

    match closest {
        Some(food) if closest_dist > EPSILON => {
            let strength = (FOOD_SEEK_RADIUS - closest_dist) / FOOD_SEEK_RADIUS;
            Steering {
                fx: (food.x - subject.x) / closest_dist * strength,
                fy: (food.y - subject.y) / closest_dist * strength,
                magnitude: strength,
            }
        }
        _ => Steering::INACTIVE,
    }
}

/// Flee from the pointer when it comes within [`POINTER_FLEE_RADIUS`].
/// Inactive until the host has reported a pointer position.
pub fn pointer_flee_force(subject: &FishView, pointer: Option<(f32, f32)>) -> Steering {
    let Some((px, py)) = pointer else {
        return Steering::INACTIVE;
    };
    let dx = subject.x - px;
    let dy = subject.y - py;
    let dist = (dx * dx + dy * dy).sqrt();

    if dist < POINTER_FLEE_RADIUS && dist > EPSILON {
        let strength = (POINTER_FLEE_RADIUS - dist) / POINTER_FLEE_RADIUS;
        Steering {
            fx: dx / dist * strength,
            fy: dy / dist * strength,
            magnitude: strength,
        }
    } else {
        Steering::INACTIVE
    }
}

/// Schooling: separation + alignment + cohesion over non-predator neighbors.
/// Returns a raw force pair; the composed weight is applied by the caller.
pub fn schooling_force(
    subject: &FishView,
    radii: &SchoolingRadii,
    fishes: &[FishView],
) -> (f32, f32) {
    let mut sep = (0.0f32, 0.0f32);
    let mut align = (0.0f32, 0.0f32);
    let mut coh = (0.0f32, 0.0f32);
    let mut sep_count = 0u32;
    let mut align_count = 0u32;
    let mut coh_count = 0u32;

    for other in fishes {
        if other.entity == subject.entity || other.state.is_predator() {
            continue;
        }
        let dx = subject.x - other.x;
        let dy = subject.y - other.y;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist < radii.separation && dist > EPSILON {
            sep.0 += dx / dist;
            sep.1 += dy / dist;
            sep_count += 1;
        }
        if dist < radii.alignment {
            align.0 += other.vx;
            align.1 += other.vy;
            align_count += 1;
        }
        if dist < radii.cohesion {
            coh.0 += other.x;
            coh.1 += other.y;
            coh_count += 1;
        }
    }

    let mut fx = 0.0;
    let mut fy = 0.0;

    if sep_count > 0 {
        fx += sep.0 / sep_count as f32 * 1.5;
        fy += sep.1 / sep_count as f32 * 1.5;
    }
    if align_count > 0 {
        fx += (align.0 / align_count as f32 - subject.vx) * 0.3;
        fy += (align.1 / align_count as f32 - subject.vy) * 0.3;
    }
    if coh_count > 0 {
        fx += (coh.0 / coh_count as f32 - subject.x) * 0.01;
        fy += (coh.1 / coh_count as f32 - subject.y) * 0.01;
    }

    (fx, fy)
}

/// Wander: perturb the persistent wander angle, project a target on a circle
/// ahead of the fish, and steer the velocity toward it.
pub fn wander_force(
    subject: &FishView,
    heading_angle: f32,
    profile: &SwimProfile,
    wander: &mut WanderState,
    rng: &mut StdRng,
) -> (f32, f32) {
    wander.angle += (rng.gen::<f32>() - 0.5) * wander.jitter;

    let circle_x = subject.x + wander.distance * heading_angle.cos();
    let circle_y = subject.y + wander.distance * heading_angle.sin();
    let target_x = circle_x + wander.radius * wander.angle.cos();
    let target_y = circle_y + wander.radius * wander.angle.sin();

    let mut desired_x = target_x - subject.x;
    let mut desired_y = target_y - subject.y;
    let dist = (desired_x * desired_x + desired_y * desired_y).sqrt();
    if dist > EPSILON {
        desired_x = desired_x / dist * profile.swim_speed;
        desired_y = desired_y / dist * profile.swim_speed;
    } else {
        desired_x = 0.0;
        desired_y = 0.0;
    }

    (desired_x - subject.vx, desired_y - subject.vy)
}

/// Boundary avoidance: inside the edge margin, push back toward the interior
/// proportionally to intrusion depth.
pub fn boundary_force(x: f32, y: f32, bounds: &Bounds) -> (f32, f32) {
    let mut fx = 0.0;
    let mut fy = 0.0;

    if x < BOUNDARY_MARGIN {
        fx += (BOUNDARY_MARGIN - x) / BOUNDARY_MARGIN;
    }
    if x > bounds.width - BOUNDARY_MARGIN {
        fx -= (x - (bounds.width - BOUNDARY_MARGIN)) / BOUNDARY_MARGIN;
    }
    if y < BOUNDARY_MARGIN {
        fy += (BOUNDARY_MARGIN - y) / BOUNDARY_MARGIN;
    }
    if y > bounds.height - BOUNDARY_MARGIN {
        fy -= (y - (bounds.height - BOUNDARY_MARGIN)) / BOUNDARY_MARGIN;
    }

    (fx, fy)
}

/// Angle interpolation with wrap-around at ±π.
pub fn lerp_angle(current: f32, target: f32, factor: f32) -> f32 {
    let mut diff = target - current;
    if diff > std::f32::consts::PI {
        diff -= std::f32::consts::TAU;
    }
    if diff < -std::f32::consts::PI {
        diff += std::f32::consts::TAU;
    }
    current + diff * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(raw: u32, x: f32, y: f32, size: f32, state: FishState) -> FishView {
        FishView {
            entity: Entity::from_raw(raw),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            size,
            state,
        }
    }

    #[test]
    fn test_hunting_picks_nearest_eligible_prey() {
        let predator = view(0, 0.0, 0.0, 30.0, FishState::Predator);
        let fishes = vec![
            predator,
            view(1, 100.0, 0.0, 15.0, FishState::Normal), // eligible, far
            view(2, 50.0, 0.0, 15.0, FishState::Normal),  // eligible, nearest
            view(3, 10.0, 0.0, 25.0, FishState::Normal),  // too big
            view(4, 20.0, 0.0, 15.0, FishState::Hungry),  // threat, skipped
        ];
        let force = hunting_force(&predator, &fishes);
        assert!(force.is_active());
        assert!(force.fx > 0.0, "should point toward prey at +x");
        let expected = (HUNT_RADIUS - 50.0) / HUNT_RADIUS;
        assert!((force.magnitude - expected).abs() < 1e-4);
    }

    #[test]
    fn test_hunting_inactive_outside_radius() {
        let predator = view(0, 0.0, 0.0, 30.0, FishState::Predator);
        let fishes = vec![predator, view(1, 200.0, 0.0, 10.0, FishState::Normal)];
        assert!(!hunting_force(&predator, &fishes).is_active());
    }

    #[test]
    fn test_avoidance_points_away_from_threat() {
        let subject = view(0, 0.0, 0.0, 18.0, FishState::Normal);
        let fishes = vec![subject, view(1, 50.0, 0.0, 30.0, FishState::Predator)];
        let force = predator_avoidance_force(&subject, &fishes);
        assert!(force.is_active());
        assert!(force.fx < 0.0, "should push away from threat at +x");
        assert!(force.fy.abs() < 1e-6);
    }

    #[test]
    fn test_avoidance_averages_multiple_threats() {
        let subject = view(0, 0.0, 0.0, 18.0, FishState::Normal);
        let fishes = vec![
            subject,
            view(1, 50.0, 0.0, 30.0, FishState::Predator),
            view(2, -50.0, 0.0, 30.0, FishState::Hungry),
        ];
        // Symmetric threats cancel out
        let force = predator_avoidance_force(&subject, &fishes);
        assert!(force.fx.abs() < 1e-5);
        assert!(force.magnitude < 1e-5);
    }

    #[test]
    fn test_food_seeking_ignores_faded_pellets() {
        let subject = view(0, 0.0, 0.0, 18.0, FishState::Normal);
        let foods = vec![
            FoodView {
                entity: Entity::from_raw(10),
                x: 20.0,
                y: 0.0,
                size: 6.0,
                opacity: 0.2, // below threshold
            },
            FoodView {
                entity: Entity::from_raw(11),
                x: 60.0,
                y: 0.0,
                size: 6.0,
                opacity: 0.9,
            },
        ];
        let force = food_seeking_force(&subject, &foods);
        assert!(force.is_active());
        let expected = (FOOD_SEEK_RADIUS - 60.0) / FOOD_SEEK_RADIUS;
        assert!((force.magnitude - expected).abs() < 1e-4);
    }

    #[test]
    fn test_pointer_flee_zero_distance_guard() {
        // Pointer exactly on the fish must not produce NaN
        let subject = view(0, 100.0, 100.0, 18.0, FishState::Normal);
        let force = pointer_flee_force(&subject, Some((100.0, 100.0)));
        assert_eq!(force, Steering::INACTIVE);
        assert!(!pointer_flee_force(&subject, None).is_active());
    }

    #[test]
    fn test_pointer_flee_scales_with_proximity() {
        let subject = view(0, 0.0, 0.0, 18.0, FishState::Normal);
        let near = pointer_flee_force(&subject, Some((10.0, 0.0)));
        let far = pointer_flee_force(&subject, Some((70.0, 0.0)));
        assert!(near.magnitude > far.magnitude);
        assert!(near.fx < 0.0);
    }

    #[test]
    fn test_schooling_excludes_predators() {
        let subject = view(0, 0.0, 0.0, 18.0, FishState::Normal);
        let fishes = vec![subject, view(1, 10.0, 0.0, 30.0, FishState::Predator)];
        let (fx, fy) = schooling_force(&subject, &SchoolingRadii::default(), &fishes);
        assert_eq!((fx, fy), (0.0, 0.0));
    }

    #[test]
    fn test_schooling_separation_pushes_apart() {
        let subject = view(0, 0.0, 0.0, 18.0, FishState::Normal);
        let fishes = vec![subject, view(1, 10.0, 0.0, 18.0, FishState::Normal)];
        let (fx, _) = schooling_force(&subject, &SchoolingRadii::default(), &fishes);
        // Neighbor at +x within separation radius: net push toward -x,
        // slightly offset by cohesion pull
        assert!(fx < 0.0);
    }

    #[test]
    fn test_boundary_force_pushes_inward() {
        let bounds = Bounds::default();
        let (fx, _) = boundary_force(10.0, 300.0, &bounds);
        assert!(fx > 0.0);
        let (fx, _) = boundary_force(bounds.width - 10.0, 300.0, &bounds);
        assert!(fx < 0.0);
        let (_, fy) = boundary_force(400.0, 5.0, &bounds);
        assert!(fy > 0.0);
        let (fx, fy) = boundary_force(400.0, 300.0, &bounds);
        assert_eq!((fx, fy), (0.0, 0.0));
    }

    #[test]
    fn test_lerp_angle_wraps_around() {
        // Shortest path from just below +π to just above -π crosses the seam
        let current = 3.0;
        let target = -3.0;
        let next = lerp_angle(current, target, 0.5);
        assert!(next > 3.0, "should rotate through +π, got {next}");
    }

    #[test]
    fn test_lerp_angle_plain_case() {
        let next = lerp_angle(0.0, 1.0, 0.25);
        assert!((next - 0.25).abs() < 1e-6);
    }
}
