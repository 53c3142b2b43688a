//! ECS Components for the Signal Kip Void Simulator.
//!
//! Components are pure data containers attached to entities.
//! All simulation logic lives in systems that query these components.
//!
//! Four entity collections share the world: fish, food pellets, effect
//! particles, and background matrix drops. Each collection is distinguished
//! by its shape component (`FishState`, `FoodPellet`, `Particle`,
//! `MatrixDrop`); removal is always `despawn`.

use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in tank coordinates (origin top-left, y grows downward).
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 2D velocity in tank units per tick.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn magnitude(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    /// Scale the velocity down so its magnitude never exceeds `max`.
    pub fn clamp_speed(&mut self, max: f32) {
        let speed = self.magnitude();
        if speed > max {
            self.vx = self.vx / speed * max;
            self.vy = self.vy / speed * max;
        }
    }
}

// ============================================================================
// FISH COMPONENTS
// ============================================================================

/// Unique, stable identifier for a fish.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FishId(pub u32);

/// Behavioral state of a fish. Transition priority is fixed in
/// `systems::behavior`; Hungry is entered only by the predator timer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FishState {
    Normal,
    Feeding,
    Fleeing,
    Hungry,
    Predator,
}

impl FishState {
    /// Predators and hungry fish scare the school and can be captured.
    pub fn is_threat(&self) -> bool {
        matches!(self, FishState::Predator | FishState::Hungry)
    }

    pub fn is_predator(&self) -> bool {
        matches!(self, FishState::Predator)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FishState::Normal => "Normal",
            FishState::Feeding => "Feeding",
            FishState::Fleeing => "Fleeing",
            FishState::Hungry => "Hungry",
            FishState::Predator => "Predator",
        }
    }
}

impl Default for FishState {
    fn default() -> Self {
        Self::Normal
    }
}

/// Body size plus the cumulative growth baseline.
///
/// Invariant: `size >= original_size`, and both are monotonically
/// non-decreasing over a fish's lifetime. Growth from feeding or hunting
/// goes through `grow` so both fields move together.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FishBody {
    pub size: f32,
    pub original_size: f32,
}

impl FishBody {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            original_size: size,
        }
    }

    pub fn grow(&mut self, amount: f32) {
        self.size += amount;
        self.original_size += amount;
    }
}

/// Hunger progression while in the Hungry state (0..=100).
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Hunger {
    pub level: f32,
}

impl Hunger {
    /// Progress toward full predator transformation, in [0, 1].
    pub fn progress(&self) -> f32 {
        (self.level / 100.0).min(1.0)
    }
}

/// Glow intensity in [0, 1]; tracks hunger progress, pulses for predators.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Glow {
    pub intensity: f32,
}

/// Facing direction, lerped toward the velocity heading each tick.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Heading {
    pub angle: f32,
    pub target_angle: f32,
}

/// Per-fish movement tuning constants.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SwimProfile {
    /// Cruising speed used by the wander behavior.
    pub swim_speed: f32,
    /// Speed cap in the Normal state.
    pub max_speed: f32,
    /// Speed cap while Fleeing.
    pub flee_speed: f32,
    /// Heading lerp factor per tick (tripled while Fleeing).
    pub turn_speed: f32,
}

impl Default for SwimProfile {
    fn default() -> Self {
        Self {
            swim_speed: 1.0,
            max_speed: 2.0,
            flee_speed: 4.0,
            turn_speed: 0.05,
        }
    }
}

/// Persistent random-walk state for the wander behavior.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WanderState {
    pub angle: f32,
    pub radius: f32,
    pub distance: f32,
    pub jitter: f32,
}

impl Default for WanderState {
    fn default() -> Self {
        Self {
            angle: 0.0,
            radius: 30.0,
            distance: 50.0,
            jitter: 0.3,
        }
    }
}

/// Neighbor radii for the three schooling sub-behaviors.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SchoolingRadii {
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
}

impl Default for SchoolingRadii {
    fn default() -> Self {
        Self {
            separation: 25.0,
            alignment: 40.0,
            cohesion: 50.0,
        }
    }
}

/// Display color tag, passed through to the renderer untouched.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct ColorTag(pub String);

/// Palette of bright colors that pop against the black void background.
pub const FISH_COLORS: [&str; 12] = [
    "#00FFFF", "#FF00FF", "#FFFF00", "#00FF00", "#FF4500", "#FF1493",
    "#00BFFF", "#FFD700", "#FF69B4", "#32CD32", "#FF6347", "#9370DB",
];

/// Margin kept between a freshly spawned fish and the tank edges.
const SPAWN_MARGIN: f32 = 50.0;

/// Bundle for spawning a complete fish entity.
#[derive(Bundle)]
pub struct FishBundle {
    pub id: FishId,
    pub position: Position,
    pub velocity: Velocity,
    pub body: FishBody,
    pub state: FishState,
    pub hunger: Hunger,
    pub glow: Glow,
    pub heading: Heading,
    pub profile: SwimProfile,
    pub wander: WanderState,
    pub schooling: SchoolingRadii,
    pub color: ColorTag,
}

impl FishBundle {
    /// Create a fish with randomized spawn attributes, inset from the edges.
    pub fn random(rng: &mut StdRng, bounds: &Bounds, id: FishId) -> Self {
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;
        Self {
            id,
            position: Position::new(
                SPAWN_MARGIN + rng.gen::<f32>() * (bounds.width - 2.0 * SPAWN_MARGIN),
                SPAWN_MARGIN + rng.gen::<f32>() * (bounds.height - 2.0 * SPAWN_MARGIN),
            ),
            velocity: Velocity::new(
                (rng.gen::<f32>() - 0.5) * 2.0,
                (rng.gen::<f32>() - 0.5) * 2.0,
            ),
            body: FishBody::new(15.0 + rng.gen::<f32>() * 10.0),
            state: FishState::Normal,
            hunger: Hunger::default(),
            glow: Glow::default(),
            heading: Heading {
                angle,
                target_angle: angle,
            },
            profile: SwimProfile {
                swim_speed: 0.5 + rng.gen::<f32>(),
                ..Default::default()
            },
            wander: WanderState {
                angle: rng.gen::<f32>() * std::f32::consts::TAU,
                ..Default::default()
            },
            schooling: SchoolingRadii::default(),
            color: ColorTag(FISH_COLORS[rng.gen_range(0..FISH_COLORS.len())].to_string()),
        }
    }
}

// ============================================================================
// FOOD COMPONENTS
// ============================================================================

/// A dropped signal pellet. Life is a tick countdown, not wall-clock time.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct FoodPellet {
    /// The signal fact carried by this pellet.
    pub text: String,
    pub size: f32,
    pub opacity: f32,
    /// Remaining life in ticks.
    pub life: f32,
    pub glow: f32,
    /// Set on first contact with a fish; size and opacity only shrink after.
    pub consumed: bool,
}

/// Pellets smaller than this are removed (with a consumption burst).
pub const FOOD_MIN_SIZE: f32 = 0.5;

/// Signal facts from the void, one per pellet.
pub const SIGNAL_FACTS: [&str; 10] = [
    "Octopi have three hearts and blue blood",
    "Honey never spoils - archaeologists found 3000-year-old honey that's still edible",
    "The human brain uses 20% of the body's energy despite being 2% of body weight",
    "Quantum entanglement allows particles to affect each other instantly across any distance",
    "Trees can communicate through underground fungal networks called the 'Wood Wide Web'",
    "Time moves faster at your head than your feet due to gravitational time dilation",
    "There are more possible chess games than atoms in the observable universe",
    "Tardigrades can survive in space, extreme radiation, and near absolute zero",
    "Your body contains more bacterial cells than human cells",
    "A day on Venus is longer than its year",
];

/// Bundle for spawning a food pellet.
#[derive(Bundle)]
pub struct FoodBundle {
    pub pellet: FoodPellet,
    pub position: Position,
    pub velocity: Velocity,
}

impl FoodBundle {
    /// Create a pellet at the drop position: slow sink, slight drift.
    pub fn random(rng: &mut StdRng, x: f32, y: f32) -> Self {
        Self {
            pellet: FoodPellet {
                text: SIGNAL_FACTS[rng.gen_range(0..SIGNAL_FACTS.len())].to_string(),
                size: 6.0 + rng.gen::<f32>() * 4.0,
                opacity: 1.0,
                life: 3000.0,
                glow: 0.0,
                consumed: false,
            },
            position: Position::new(x, y),
            velocity: Velocity::new(
                (rng.gen::<f32>() - 0.5) * 0.3,
                0.3 + rng.gen::<f32>() * 0.2,
            ),
        }
    }
}

// ============================================================================
// EFFECT PARTICLE COMPONENTS
// ============================================================================

/// Particle variant, controls how the renderer draws it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Generic,
    Capture,
    Sparkle,
    ScoreText,
}

impl ParticleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleKind::Generic => "generic",
            ParticleKind::Capture => "capture",
            ParticleKind::Sparkle => "sparkle",
            ParticleKind::ScoreText => "score-text",
        }
    }
}

/// An ephemeral effect particle. Velocity damps each tick; removed at
/// `life <= 0`.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub size: f32,
    pub color: String,
    /// Remaining life in ticks.
    pub life: f32,
    pub max_life: f32,
    /// Display string for ScoreText particles.
    pub text: Option<String>,
}

impl Particle {
    /// Render alpha derived from remaining life.
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Bundle for spawning an effect particle.
#[derive(Bundle)]
pub struct ParticleBundle {
    pub particle: Particle,
    pub position: Position,
    pub velocity: Velocity,
}

// ============================================================================
// BACKGROUND DROP COMPONENTS
// ============================================================================

/// Decorative matrix-rain glyph column. Purely background; never interacts
/// with fish or food.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct MatrixDrop {
    /// Fall speed in units per tick.
    pub speed: f32,
    /// Fixed glyph sequence for this drop.
    pub chars: String,
    /// Index of the currently highlighted glyph.
    pub char_index: usize,
    /// Accumulated ms toward the next glyph cycle.
    pub char_timer: f32,
    /// Glyph cycle interval in ms.
    pub char_interval: f32,
    pub alpha: f32,
}

/// Glyph alphabet for matrix drops.
const MATRIX_CHARS: &str =
    "01アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン";

/// Bundle for spawning a background drop at the top edge.
#[derive(Bundle)]
pub struct MatrixDropBundle {
    pub drop: MatrixDrop,
    pub position: Position,
}

impl MatrixDropBundle {
    pub fn random(rng: &mut StdRng, width: f32) -> Self {
        let glyphs: Vec<char> = MATRIX_CHARS.chars().collect();
        let len = 6 + rng.gen_range(0..8);
        let chars: String = (0..len)
            .map(|_| glyphs[rng.gen_range(0..glyphs.len())])
            .collect();
        Self {
            drop: MatrixDrop {
                speed: 0.5 + rng.gen::<f32>(),
                chars,
                char_index: 0,
                char_timer: 0.0,
                char_interval: 180.0 + rng.gen::<f32>() * 120.0,
                alpha: 0.2 + rng.gen::<f32>() * 0.25,
            },
            position: Position::new(rng.gen::<f32>() * width, -20.0),
        }
    }
}

// ============================================================================
// CORE RESOURCES
// ============================================================================

/// Playfield bounds used by boundary and wander logic. Resizable at runtime
/// without discarding entities.
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// The single simulation RNG. Seedable for deterministic runs; every
/// randomized value (timer intervals, spawn attributes, wander jitter)
/// draws from this stream.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

/// Monotonic fish id allocator.
#[derive(Resource, Debug, Default)]
pub struct FishIdGen(u32);

impl FishIdGen {
    pub fn next(&mut self) -> FishId {
        let id = FishId(self.0);
        self.0 = self.0.wrapping_add(1);
        id
    }
}

/// Transient visual link between a feeding fish and its pellet. Decays each
/// tick and is dropped once invisible.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeedingConnection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub alpha: f32,
}

/// All live feeding connections for the current frame window.
#[derive(Resource, Debug, Default)]
pub struct FeedingConnections(pub Vec<FeedingConnection>);
