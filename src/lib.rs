//! Skyward - a flappy-bird arcade game with ledger-backed best scores
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bird physics, pipes, collisions, scoring)
//! - `renderer`: Read-only draw list built from the simulation state
//! - `platform`: Frame driver and input latching shared by every host
//! - `persistence`: Best-score cache, remote score ledger bridge
//! - `settings`: Data-driven game tuning and network configuration
//! - `highscores`: Ledger leaderboard
//! - `game`: Session facade hosts drive

pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::{Frame, Game};
pub use highscores::{Leaderboard, PlayerId};
pub use settings::{NetworkConfig, Settings, Tuning};

/// Game configuration constants. Rates are per tick, and one tick runs per
/// animation frame.
pub mod consts {
    /// Playfield dimensions in canvas pixels
    pub const PLAYFIELD_WIDTH: f32 = 400.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;
    /// Height of the ground strip at the bottom of the playfield
    pub const GROUND_HEIGHT: f32 = 112.0;

    /// Bird defaults
    pub const BIRD_START_X: f32 = 100.0;
    pub const BIRD_START_Y: f32 = 250.0;
    /// Used until the bird sprite reports its natural size
    pub const BIRD_WIDTH: f32 = 34.0;
    pub const BIRD_HEIGHT: f32 = 24.0;
    /// Ticks each bird animation frame stays on screen
    pub const BIRD_ANIM_TICKS: u64 = 10;
    /// Number of bird animation frames
    pub const BIRD_FRAME_COUNT: usize = 3;

    /// Downward acceleration per tick
    pub const GRAVITY: f32 = 0.25;
    /// Velocity set by a jump (negative = upward)
    pub const JUMP_SPEED: f32 = -6.5;

    /// Pipe defaults
    pub const PIPE_GAP: f32 = 180.0;
    pub const PIPE_WIDTH: f32 = 52.0;
    /// Used until the pipe sprite reports its natural size
    pub const PIPE_SPRITE_HEIGHT: f32 = 320.0;
    /// Horizontal scroll per tick
    pub const PIPE_SPEED: f32 = 4.0;
    /// Ticks between consecutive pipes
    pub const PIPE_INTERVAL: u32 = 120;
    /// Tick on which the first pipe appears
    pub const FIRST_PIPE_DELAY: u32 = 60;
    /// Minimum distance between a gap and the ceiling, and between a gap and the ground
    pub const GAP_EDGE_CLEARANCE: f32 = 50.0;

    /// Leaderboard size
    pub const LEADERBOARD_SIZE: usize = 10;
    /// How far back (in ledger blocks) score events are queried
    pub const SCORE_EVENT_WINDOW: u64 = 10_000;
}
