//! Read-only snapshots of the simulation for an external renderer.
//!
//! A [`Snapshot`] is a plain serializable copy of everything drawable plus
//! the scoreboard; the host renders from it without touching the ECS world.

use bevy_ecs::prelude::World;
use serde::{Deserialize, Serialize};

use crate::clock::TickTime;
use crate::components::{
    ColorTag, FeedingConnections, FishBody, FishId, FishState, FoodPellet, Glow, Heading,
    MatrixDrop, Particle, Position, Velocity,
};
use crate::score::{RunState, ScoreBoard};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FishSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub angle: f32,
    pub glow: f32,
    pub color: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodSnapshot {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub opacity: f32,
    pub glow: f32,
    pub text: String,
    pub consumed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: String,
    pub alpha: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropSnapshot {
    pub x: f32,
    pub y: f32,
    pub chars: String,
    pub char_index: usize,
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectionSnapshot {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub alpha: f32,
}

/// Complete drawable state at the end of a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub time_ms: f64,
    pub run_state: String,
    pub score: u32,
    pub fish_eaten: u32,
    pub population: usize,
    pub fish: Vec<FishSnapshot>,
    pub food: Vec<FoodSnapshot>,
    pub particles: Vec<ParticleSnapshot>,
    pub drops: Vec<DropSnapshot>,
    pub connections: Vec<ConnectionSnapshot>,
}

impl Snapshot {
    /// Capture the current world state. Fish are ordered by id so snapshots
    /// of identical runs compare equal.
    pub fn from_world(world: &mut World) -> Self {
        let time = *world.resource::<TickTime>();
        let run_state = *world.resource::<RunState>();
        let board = *world.resource::<ScoreBoard>();

        let mut fish: Vec<FishSnapshot> = world
            .query::<(
                &FishId,
                &Position,
                &Velocity,
                &FishBody,
                &FishState,
                &Heading,
                &Glow,
                &ColorTag,
            )>()
            .iter(world)
            .map(|(id, pos, vel, body, state, heading, glow, color)| FishSnapshot {
                id: id.0,
                x: pos.x,
                y: pos.y,
                vx: vel.vx,
                vy: vel.vy,
                size: body.size,
                angle: heading.angle,
                glow: glow.intensity,
                color: color.0.clone(),
                state: state.as_str().to_string(),
            })
            .collect();
        fish.sort_by_key(|f| f.id);

        let food: Vec<FoodSnapshot> = world
            .query::<(&Position, &FoodPellet)>()
            .iter(world)
            .map(|(pos, pellet)| FoodSnapshot {
                x: pos.x,
                y: pos.y,
                size: pellet.size,
                opacity: pellet.opacity,
                glow: pellet.glow,
                text: pellet.text.clone(),
                consumed: pellet.consumed,
            })
            .collect();

        let particles: Vec<ParticleSnapshot> = world
            .query::<(&Position, &Particle)>()
            .iter(world)
            .map(|(pos, particle)| ParticleSnapshot {
                kind: particle.kind.as_str().to_string(),
                x: pos.x,
                y: pos.y,
                size: particle.size,
                color: particle.color.clone(),
                alpha: particle.alpha(),
                text: particle.text.clone(),
            })
            .collect();

        let drops: Vec<DropSnapshot> = world
            .query::<(&Position, &MatrixDrop)>()
            .iter(world)
            .map(|(pos, drop)| DropSnapshot {
                x: pos.x,
                y: pos.y,
                chars: drop.chars.clone(),
                char_index: drop.char_index,
                alpha: drop.alpha,
            })
            .collect();

        let connections: Vec<ConnectionSnapshot> = world
            .resource::<FeedingConnections>()
            .0
            .iter()
            .map(|c| ConnectionSnapshot {
                x1: c.x1,
                y1: c.y1,
                x2: c.x2,
                y2: c.y2,
                alpha: c.alpha,
            })
            .collect();

        Self {
            tick: time.tick,
            time_ms: time.elapsed_ms,
            run_state: run_state.as_str().to_string(),
            score: board.score,
            fish_eaten: board.fish_eaten,
            population: fish.len(),
            fish,
            food,
            particles,
            drops,
            connections,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
