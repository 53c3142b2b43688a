//! Aging and cleanup for food, particles, matrix drops, and feeding
//! connections.

use bevy_ecs::prelude::*;

use crate::clock::TickTime;
use crate::components::{
    Bounds, FeedingConnections, FoodPellet, MatrixDrop, Particle, Position, Velocity,
};

/// Pellet life below which opacity fades toward zero.
const FOOD_FADE_LIFE: f32 = 500.0;
/// Pellets drifting this far past the bottom edge are removed.
const FOOD_EXIT_MARGIN: f32 = 50.0;
/// Particle velocity damping per tick.
const PARTICLE_DAMPING: f32 = 0.98;
/// Vertical spacing of a drop's glyphs, used for off-screen culling.
const DROP_GLYPH_SPACING: f32 = 15.0;
/// Connection alpha decay per tick.
const CONNECTION_DECAY: f32 = 0.9;
const CONNECTION_MIN_ALPHA: f32 = 0.01;

/// Drift pellets down, burn life, fade late-life opacity, cull expired or
/// escaped pellets.
pub fn food_update_system(
    mut commands: Commands,
    bounds: Res<Bounds>,
    mut query: Query<(Entity, &mut Position, &Velocity, &mut FoodPellet)>,
) {
    for (entity, mut pos, vel, mut pellet) in query.iter_mut() {
        pos.x += vel.vx;
        pos.y += vel.vy;
        pellet.life -= 1.0;
        pellet.glow *= 0.95;
        if pellet.life < FOOD_FADE_LIFE {
            // min keeps consumption's fade monotonic through the handoff
            pellet.opacity = pellet.opacity.min((pellet.life / FOOD_FADE_LIFE).max(0.0));
        }
        if pellet.life <= 0.0 || pos.y > bounds.height + FOOD_EXIT_MARGIN {
            commands.entity(entity).despawn();
        }
    }
}

/// Move, damp, and age effect particles.
pub fn particle_update_system(
    mut commands: Commands,
    mut query: Query<(Entity, &mut Position, &mut Velocity, &mut Particle)>,
) {
    for (entity, mut pos, mut vel, mut particle) in query.iter_mut() {
        pos.x += vel.vx;
        pos.y += vel.vy;
        vel.vx *= PARTICLE_DAMPING;
        vel.vy *= PARTICLE_DAMPING;
        particle.life -= 1.0;
        if particle.life <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

/// Fall matrix drops, cycle their highlighted glyph on their ms cadence,
/// cull columns fully below the bottom edge.
pub fn matrix_drop_update_system(
    mut commands: Commands,
    time: Res<TickTime>,
    bounds: Res<Bounds>,
    mut query: Query<(Entity, &mut Position, &mut MatrixDrop)>,
) {
    for (entity, mut pos, mut drop) in query.iter_mut() {
        pos.y += drop.speed;
        drop.char_timer += time.delta_ms;
        let glyph_count = drop.chars.chars().count().max(1);
        while drop.char_timer >= drop.char_interval {
            drop.char_timer -= drop.char_interval;
            drop.char_index = (drop.char_index + 1) % glyph_count;
        }
        if pos.y > bounds.height + glyph_count as f32 * DROP_GLYPH_SPACING {
            commands.entity(entity).despawn();
        }
    }
}

/// Fade feeding connections and drop the invisible ones.
pub fn connection_decay_system(mut connections: ResMut<FeedingConnections>) {
    for connection in connections.0.iter_mut() {
        connection.alpha *= CONNECTION_DECAY;
    }
    connections.0.retain(|c| c.alpha > CONNECTION_MIN_ALPHA);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{
        FeedingConnection, FoodBundle, MatrixDropBundle, ParticleBundle, ParticleKind,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_world() -> World {
        let mut world = World::new();
        world.insert_resource(TickTime::default());
        world.insert_resource(Bounds::default());
        world.insert_resource(FeedingConnections::default());
        world
    }

    #[test]
    fn test_food_sinks_and_fades_late_in_life() {
        let mut world = test_world();
        let mut rng = StdRng::seed_from_u64(1);
        let mut bundle = FoodBundle::random(&mut rng, 200.0, 100.0);
        bundle.pellet.life = 400.0;
        let entity = world.spawn(bundle).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(food_update_system);
        schedule.run(&mut world);

        let pellet = world.get::<FoodPellet>(entity).unwrap();
        assert_eq!(pellet.life, 399.0);
        assert!(pellet.opacity <= 399.0 / FOOD_FADE_LIFE + 1e-4);
        assert!(world.get::<Position>(entity).unwrap().y > 100.0);
    }

    #[test]
    fn test_expired_food_is_removed() {
        let mut world = test_world();
        let mut rng = StdRng::seed_from_u64(1);
        let mut bundle = FoodBundle::random(&mut rng, 200.0, 100.0);
        bundle.pellet.life = 1.0;
        world.spawn(bundle);

        let mut schedule = Schedule::default();
        schedule.add_systems(food_update_system);
        schedule.run(&mut world);

        let mut query = world.query::<&FoodPellet>();
        assert_eq!(query.iter(&world).count(), 0);
    }

    #[test]
    fn test_food_below_tank_is_removed() {
        let mut world = test_world();
        let mut rng = StdRng::seed_from_u64(1);
        let bundle = FoodBundle::random(&mut rng, 200.0, 700.0);
        world.spawn(bundle);

        let mut schedule = Schedule::default();
        schedule.add_systems(food_update_system);
        schedule.run(&mut world);

        let mut query = world.query::<&FoodPellet>();
        assert_eq!(query.iter(&world).count(), 0);
    }

    #[test]
    fn test_particles_damp_and_expire() {
        let mut world = test_world();
        world.spawn(ParticleBundle {
            particle: Particle {
                kind: ParticleKind::Generic,
                size: 2.0,
                color: "hsl(20, 100%, 60%)".into(),
                life: 2.0,
                max_life: 2.0,
                text: None,
            },
            position: Position::new(100.0, 100.0),
            velocity: Velocity::new(10.0, 0.0),
        });

        let mut schedule = Schedule::default();
        schedule.add_systems(particle_update_system);
        schedule.run(&mut world);
        {
            let mut query = world.query::<(&Velocity, &Particle)>();
            let (vel, particle) = query.single(&world);
            assert!((vel.vx - 9.8).abs() < 1e-4);
            assert_eq!(particle.life, 1.0);
        }
        schedule.run(&mut world);
        let mut query = world.query::<&Particle>();
        assert_eq!(query.iter(&world).count(), 0);
    }

    #[test]
    fn test_matrix_drop_cycles_glyphs_and_culls() {
        let mut world = test_world();
        world.resource_mut::<TickTime>().delta_ms = 200.0;
        let mut rng = StdRng::seed_from_u64(2);
        let mut bundle = MatrixDropBundle::random(&mut rng, 800.0);
        bundle.drop.char_interval = 180.0;
        let entity = world.spawn(bundle).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(matrix_drop_update_system);
        schedule.run(&mut world);

        let drop = world.get::<MatrixDrop>(entity).unwrap();
        assert_eq!(drop.char_index, 1);
        assert!((drop.char_timer - 20.0).abs() < 1e-3);

        // Teleport below the cull line
        world.get_mut::<Position>(entity).unwrap().y = 2_000.0;
        schedule.run(&mut world);
        let mut query = world.query::<&MatrixDrop>();
        assert_eq!(query.iter(&world).count(), 0);
    }

    #[test]
    fn test_connections_fade_and_vanish() {
        let mut world = test_world();
        world.resource_mut::<FeedingConnections>().0.push(FeedingConnection {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
            alpha: 0.8,
        });

        let mut schedule = Schedule::default();
        schedule.add_systems(connection_decay_system);
        schedule.run(&mut world);
        assert!((world.resource::<FeedingConnections>().0[0].alpha - 0.72).abs() < 1e-4);

        for _ in 0..60 {
            schedule.run(&mut world);
        }
        assert!(world.resource::<FeedingConnections>().0.is_empty());
    }
}
