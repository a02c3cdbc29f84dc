//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pipes in spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Collision, bounds_collision, pipe_collision, score_pipe};
pub use state::{Bird, GameState, Pipe, SessionState};
pub use tick::{TickInput, TickOutcome, advance_pipes, apply_jump, spawn_due, tick};
