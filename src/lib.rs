//! # Signal Kip Void Simulator
//!
//! Simulation core for an aquarium of autonomous fish swimming in a void:
//! flocking, feeding, predator emergence, pointer interaction, and a
//! capture-to-end-the-run scoring loop. Rendering and input capture belong
//! to the host; this crate owns all state and rules and hands frames out as
//! serializable snapshots.
//!
//! ## Quick start
//!
//! ```no_run
//! use kip_sim::{Aquarium, AquariumConfig};
//!
//! let mut aquarium = Aquarium::with_config(AquariumConfig {
//!     seed: Some(42),
//!     ..Default::default()
//! });
//! aquarium.start();
//! aquarium.set_pointer(320.0, 240.0);
//! aquarium.tick(16.67);
//! let frame = aquarium.snapshot();
//! println!("{} fish, score {}", frame.population, frame.score);
//! ```
//!
//! Ticks are driven by host timestamps; deltas are clamped so stalls never
//! turn into motion bursts, and a seeded [`Aquarium`] fed identical
//! timestamps and inputs replays identically.

pub mod api;
pub mod clock;
pub mod components;
pub mod effects;
pub mod score;
pub mod signal;
pub mod steering;
pub mod systems;
pub mod world;

pub use api::{Aquarium, AquariumConfig, RunEndCallback};
pub use clock::{SimulationClock, TickTime, MAX_DELTA_MS, NOMINAL_DELTA_MS};
pub use components::{Bounds, FishState};
pub use score::{RunState, ScoreBoard};
pub use signal::{RunSummary, SignalError, SignalSource, StaticSignalSource};
pub use world::Snapshot;
