//! Particle effect recipes.
//!
//! Each recipe spawns a burst of [`Particle`] entities through `Commands`.
//! Particles age and despawn in `systems::decay`; recipes only decide count,
//! spread, palette, and lifetime.

use bevy_ecs::prelude::Commands;
use rand::rngs::StdRng;
use rand::Rng;

use crate::components::{Particle, ParticleBundle, ParticleKind, Position, Velocity};

/// Capture burst: a shower of warm particles scaled to the captured fish,
/// plus a ring of golden sparkles.
pub fn spawn_capture_effect(commands: &mut Commands, rng: &mut StdRng, x: f32, y: f32, size: f32) {
    let count = (size * 0.8).floor() as usize;
    for _ in 0..count {
        let life = 50.0 + rng.gen::<f32>() * 30.0;
        commands.spawn(ParticleBundle {
            particle: Particle {
                kind: ParticleKind::Capture,
                size: 2.0 + rng.gen::<f32>() * 4.0,
                color: format!(
                    "hsl({}, 100%, {}%)",
                    15.0 + rng.gen::<f32>() * 60.0,
                    60.0 + rng.gen::<f32>() * 30.0
                ),
                life,
                max_life: life,
                text: None,
            },
            position: Position::new(x, y),
            velocity: Velocity::new(
                (rng.gen::<f32>() - 0.5) * 12.0,
                (rng.gen::<f32>() - 0.5) * 12.0,
            ),
        });
    }
    for _ in 0..10 {
        let life = 40.0 + rng.gen::<f32>() * 20.0;
        commands.spawn(ParticleBundle {
            particle: Particle {
                kind: ParticleKind::Sparkle,
                size: 3.0 + rng.gen::<f32>() * 3.0,
                color: "hsl(45, 100%, 80%)".to_string(),
                life,
                max_life: life,
                text: None,
            },
            position: Position::new(x, y),
            velocity: Velocity::new(
                (rng.gen::<f32>() - 0.5) * 6.0,
                (rng.gen::<f32>() - 0.5) * 6.0,
            ),
        });
    }
}

/// Small golden puff where a pellet dissolves.
pub fn spawn_consumption_effect(commands: &mut Commands, rng: &mut StdRng, x: f32, y: f32) {
    for _ in 0..8 {
        let life = 20.0 + rng.gen::<f32>() * 10.0;
        commands.spawn(ParticleBundle {
            particle: Particle {
                kind: ParticleKind::Generic,
                size: 1.0 + rng.gen::<f32>() * 2.0,
                color: format!("hsl({}, 100%, 70%)", 45.0 + rng.gen::<f32>() * 30.0),
                life,
                max_life: life,
                text: None,
            },
            position: Position::new(x, y),
            velocity: Velocity::new(
                (rng.gen::<f32>() - 0.5) * 4.0,
                (rng.gen::<f32>() - 0.5) * 4.0,
            ),
        });
    }
}

/// Red burst marking a predator kill.
pub fn spawn_hunting_effect(commands: &mut Commands, rng: &mut StdRng, x: f32, y: f32) {
    for _ in 0..20 {
        let life = 40.0 + rng.gen::<f32>() * 20.0;
        commands.spawn(ParticleBundle {
            particle: Particle {
                kind: ParticleKind::Generic,
                size: 2.0 + rng.gen::<f32>() * 4.0,
                color: format!("hsl({}, 100%, 60%)", rng.gen::<f32>() * 30.0),
                life,
                max_life: life,
                text: None,
            },
            position: Position::new(x, y),
            velocity: Velocity::new(
                (rng.gen::<f32>() - 0.5) * 10.0,
                (rng.gen::<f32>() - 0.5) * 10.0,
            ),
        });
    }
}

/// Floating "+N" score popup above a capture.
pub fn spawn_score_popup(commands: &mut Commands, x: f32, y: f32, score: u32) {
    commands.spawn(ParticleBundle {
        particle: Particle {
            kind: ParticleKind::ScoreText,
            size: 16.0,
            color: "#FFD700".to_string(),
            life: 120.0,
            max_life: 120.0,
            text: Some(format!("+{score}")),
        },
        position: Position::new(x, y - 20.0),
        velocity: Velocity::new(0.0, -2.0),
    });
}
