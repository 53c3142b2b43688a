//! Per-tick systems, grouped by concern.
//!
//! Execution order within a tick: input actions, scheduled events, behavior
//! (views, hunger, steering), collisions (feeding, hunting), then decay.
//! The schedule in `api` wires the ordering.

pub mod behavior;
pub mod decay;
pub mod feeding;
pub mod input;
pub mod scheduler;
