//! Contact resolution: fish eating pellets, predators eating fish.

use std::collections::HashSet;

use bevy_ecs::prelude::*;

use crate::clock::TickTime;
use crate::components::{
    FeedingConnection, FeedingConnections, FishBody, FishState, FoodPellet, Position, SimRng,
    FOOD_MIN_SIZE,
};
use crate::effects::{spawn_consumption_effect, spawn_hunting_effect};
use crate::score::ScoreBoard;
use crate::steering::PREY_SIZE_RATIO;
use crate::systems::scheduler::RespawnQueue;

/// Contact reach for food, as a multiple of the fish's size.
const FOOD_CONTACT_FACTOR: f32 = 1.5;
/// Pellet size decay per contact tick.
const PELLET_SIZE_DECAY: f32 = 0.9;
/// Pellet opacity decay per contact tick.
const PELLET_OPACITY_DECAY: f32 = 0.95;
/// Fish growth per contact tick.
const NIBBLE_GROWTH: f32 = 0.2;
/// Score per contact tick.
const NIBBLE_SCORE: u32 = 2;

/// Kill reach for predators, as a multiple of the predator's size.
const KILL_RADIUS_FACTOR: f32 = 1.2;
/// Predator growth as a fraction of the eaten fish's size.
const KILL_GROWTH_FACTOR: f32 = 0.3;
/// Respawn delay after a predator kill, ms.
const KILL_RESPAWN_DELAY_MS: f64 = 3_000.0;

/// Non-predator fish nibble pellets in reach: the pellet shrinks and fades
/// multiplicatively, the fish grows, a feeding connection lights up, and the
/// score ticks. A pellet nibbled below [`FOOD_MIN_SIZE`] dissolves in a
/// burst. One pellet per fish per tick.
pub fn consumption_system(
    mut commands: Commands,
    mut rng: ResMut<SimRng>,
    mut board: ResMut<ScoreBoard>,
    mut connections: ResMut<FeedingConnections>,
    mut fish: Query<(&Position, &mut FishBody, &FishState)>,
    mut pellets: Query<(Entity, &Position, &mut FoodPellet), Without<FishState>>,
) {
    for (fish_pos, mut body, state) in fish.iter_mut() {
        if state.is_predator() {
            continue;
        }
        for (pellet_entity, pellet_pos, mut pellet) in pellets.iter_mut() {
            // Already dissolving under another fish this tick
            if pellet.size < FOOD_MIN_SIZE {
                continue;
            }
            let reach = body.size * FOOD_CONTACT_FACTOR + pellet.size;
            if fish_pos.distance_to(pellet_pos) > reach {
                continue;
            }

            pellet.size *= PELLET_SIZE_DECAY;
            pellet.opacity *= PELLET_OPACITY_DECAY;
            pellet.glow = 1.0;
            pellet.consumed = true;
            body.grow(NIBBLE_GROWTH);
            board.score += NIBBLE_SCORE;
            connections.0.push(FeedingConnection {
                x1: fish_pos.x,
                y1: fish_pos.y,
                x2: pellet_pos.x,
                y2: pellet_pos.y,
                alpha: 0.8,
            });

            if pellet.size < FOOD_MIN_SIZE {
                spawn_consumption_effect(&mut commands, &mut rng.0, pellet_pos.x, pellet_pos.y);
                commands.entity(pellet_entity).despawn();
            }
            break;
        }
    }
}

/// Predators kill the first sufficiently smaller fish inside their kill
/// radius, grow by a fraction of the meal, and schedule a respawn.
pub fn hunting_system(
    mut commands: Commands,
    time: Res<TickTime>,
    mut rng: ResMut<SimRng>,
    mut board: ResMut<ScoreBoard>,
    mut respawns: ResMut<RespawnQueue>,
    mut query: Query<(Entity, &Position, &mut FishBody, &FishState)>,
) {
    // Gather pass over a frozen copy, then apply, to keep iteration stable
    // while bodies mutate.
    let fishes: Vec<(Entity, f32, f32, f32, FishState)> = query
        .iter()
        .map(|(entity, pos, body, state)| (entity, pos.x, pos.y, body.size, *state))
        .collect();

    let mut eaten: HashSet<Entity> = HashSet::new();
    let mut kills: Vec<(Entity, Entity, f32, f32, f32)> = Vec::new();

    for &(pred, px, py, psize, pstate) in &fishes {
        if !pstate.is_predator() || eaten.contains(&pred) {
            continue;
        }
        for &(prey, fx, fy, fsize, fstate) in &fishes {
            if prey == pred || fstate.is_threat() || eaten.contains(&prey) {
                continue;
            }
            if fsize >= psize * PREY_SIZE_RATIO {
                continue;
            }
            let dx = fx - px;
            let dy = fy - py;
            if (dx * dx + dy * dy).sqrt() > psize * KILL_RADIUS_FACTOR {
                continue;
            }
            eaten.insert(prey);
            kills.push((pred, prey, fsize, fx, fy));
            break;
        }
    }

    for (pred, prey, prey_size, prey_x, prey_y) in kills {
        if let Ok((_, _, mut body, _)) = query.get_mut(pred) {
            body.grow(prey_size * KILL_GROWTH_FACTOR);
        }
        spawn_hunting_effect(&mut commands, &mut rng.0, prey_x, prey_y);
        commands.entity(prey).despawn();
        board.fish_eaten += 1;
        respawns.0.push(time.elapsed_ms + KILL_RESPAWN_DELAY_MS);
        tracing::debug!(predator = ?pred, "predator ate a fish");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Bounds, FishBundle, FishId, FoodBundle, Particle, Velocity};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_world() -> World {
        let mut world = World::new();
        world.insert_resource(TickTime::default());
        world.insert_resource(SimRng(StdRng::seed_from_u64(11)));
        world.insert_resource(ScoreBoard::default());
        world.insert_resource(FeedingConnections::default());
        world.insert_resource(RespawnQueue::default());
        world
    }

    fn spawn_fish_at(
        world: &mut World,
        id: u32,
        x: f32,
        y: f32,
        size: f32,
        state: FishState,
    ) -> Entity {
        let mut rng = StdRng::seed_from_u64(id as u64 + 20);
        let mut bundle = FishBundle::random(&mut rng, &Bounds::default(), FishId(id));
        bundle.position = Position::new(x, y);
        bundle.velocity = Velocity::default();
        bundle.body = FishBody::new(size);
        bundle.state = state;
        world.spawn(bundle).id()
    }

    fn spawn_pellet_at(world: &mut World, x: f32, y: f32) -> Entity {
        let mut rng = StdRng::seed_from_u64(30);
        let mut bundle = FoodBundle::random(&mut rng, x, y);
        bundle.velocity = Velocity::default();
        world.spawn(bundle).id()
    }

    #[test]
    fn test_nibble_shrinks_pellet_and_grows_fish() {
        let mut world = test_world();
        let fish = spawn_fish_at(&mut world, 0, 100.0, 100.0, 20.0, FishState::Normal);
        let pellet = spawn_pellet_at(&mut world, 105.0, 100.0);
        let pellet_size = world.get::<FoodPellet>(pellet).unwrap().size;

        let mut schedule = Schedule::default();
        schedule.add_systems(consumption_system);
        schedule.run(&mut world);

        let after = world.get::<FoodPellet>(pellet).unwrap();
        assert!((after.size - pellet_size * PELLET_SIZE_DECAY).abs() < 1e-4);
        assert!(after.consumed);
        assert_eq!(after.glow, 1.0);

        let body = world.get::<FishBody>(fish).unwrap();
        assert!((body.size - 20.2).abs() < 1e-4);
        assert!(body.size >= body.original_size);

        assert_eq!(world.resource::<ScoreBoard>().score, NIBBLE_SCORE);
        let connections = &world.resource::<FeedingConnections>().0;
        assert_eq!(connections.len(), 1);
        assert!((connections[0].alpha - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_pellet_dissolves_after_repeated_nibbles() {
        let mut world = test_world();
        spawn_fish_at(&mut world, 0, 100.0, 100.0, 20.0, FishState::Normal);
        spawn_pellet_at(&mut world, 100.0, 100.0);

        let mut schedule = Schedule::default();
        schedule.add_systems(consumption_system);
        // size <= 10 shrinking by x0.9 drops below 0.5 within 35 ticks
        for _ in 0..40 {
            schedule.run(&mut world);
        }

        let mut pellets = world.query::<&FoodPellet>();
        assert_eq!(pellets.iter(&world).count(), 0);
        let mut particles = world.query::<&Particle>();
        assert_eq!(particles.iter(&world).count(), 8);
    }

    #[test]
    fn test_pellet_opacity_never_increases_while_consumed() {
        let mut world = test_world();
        spawn_fish_at(&mut world, 0, 100.0, 100.0, 20.0, FishState::Normal);
        let pellet = spawn_pellet_at(&mut world, 100.0, 100.0);

        let mut schedule = Schedule::default();
        schedule.add_systems(consumption_system);
        let mut last = world.get::<FoodPellet>(pellet).unwrap().opacity;
        for _ in 0..20 {
            schedule.run(&mut world);
            let Some(pellet) = world.get::<FoodPellet>(pellet) else {
                break;
            };
            assert!(pellet.opacity <= last);
            last = pellet.opacity;
        }
    }

    #[test]
    fn test_predators_do_not_eat_pellets() {
        let mut world = test_world();
        spawn_fish_at(&mut world, 0, 100.0, 100.0, 30.0, FishState::Predator);
        let pellet = spawn_pellet_at(&mut world, 100.0, 100.0);

        let mut schedule = Schedule::default();
        schedule.add_systems(consumption_system);
        schedule.run(&mut world);

        assert!(!world.get::<FoodPellet>(pellet).unwrap().consumed);
        assert_eq!(world.resource::<ScoreBoard>().score, 0);
    }

    #[test]
    fn test_kill_grows_predator_and_schedules_respawn() {
        let mut world = test_world();
        world.resource_mut::<TickTime>().elapsed_ms = 50_000.0;
        let pred = spawn_fish_at(&mut world, 0, 100.0, 100.0, 30.0, FishState::Predator);
        let prey = spawn_fish_at(&mut world, 1, 110.0, 100.0, 15.0, FishState::Normal);

        let mut schedule = Schedule::default();
        schedule.add_systems(hunting_system);
        schedule.run(&mut world);

        assert!(world.get::<FishState>(prey).is_none(), "prey despawned");
        let body = world.get::<FishBody>(pred).unwrap();
        assert!((body.size - 34.5).abs() < 1e-4);
        assert_eq!(world.resource::<ScoreBoard>().fish_eaten, 1);
        assert_eq!(world.resource::<RespawnQueue>().0, vec![53_000.0]);
        let mut particles = world.query::<&Particle>();
        assert_eq!(particles.iter(&world).count(), 20);
    }

    #[test]
    fn test_kill_requires_small_enough_prey() {
        let mut world = test_world();
        spawn_fish_at(&mut world, 0, 100.0, 100.0, 30.0, FishState::Predator);
        // 25 >= 30 * 0.67, too big to eat
        let prey = spawn_fish_at(&mut world, 1, 110.0, 100.0, 25.0, FishState::Normal);

        let mut schedule = Schedule::default();
        schedule.add_systems(hunting_system);
        schedule.run(&mut world);

        assert!(world.get::<FishState>(prey).is_some());
        assert_eq!(world.resource::<ScoreBoard>().fish_eaten, 0);
    }

    #[test]
    fn test_two_predators_cannot_share_a_prey() {
        let mut world = test_world();
        spawn_fish_at(&mut world, 0, 90.0, 100.0, 30.0, FishState::Predator);
        spawn_fish_at(&mut world, 1, 110.0, 100.0, 30.0, FishState::Predator);
        spawn_fish_at(&mut world, 2, 100.0, 100.0, 15.0, FishState::Normal);

        let mut schedule = Schedule::default();
        schedule.add_systems(hunting_system);
        schedule.run(&mut world);

        // Exactly one kill accounted
        assert_eq!(world.resource::<ScoreBoard>().fish_eaten, 1);
        assert_eq!(world.resource::<RespawnQueue>().0.len(), 1);
    }
}
