//! Game state and core simulation types
//!
//! Pure data: the bird, the ordered pipe list and the session counters.
//! Only `sim::tick` mutates these between resets.

use glam::Vec2;

use crate::settings::Tuning;

/// Top-level session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Waiting for the first jump (start prompt shown)
    #[default]
    NotStarted,
    /// Active gameplay
    Running,
    /// Run ended; absorbing until reset
    Over,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::NotStarted => "not-started",
            SessionState::Running => "running",
            SessionState::Over => "over",
        }
    }
}

/// The player's bird
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    /// Top-left corner; x never changes after construction
    pub pos: Vec2,
    /// Vertical velocity (positive = downward)
    pub speed: f32,
    /// Current animation frame index
    pub frame: usize,
    /// Bounding box (width, height), fixed from the sprite at load time
    pub size: Vec2,
}

impl Bird {
    pub fn new(start: Vec2, size: Vec2) -> Self {
        Self {
            pos: start,
            speed: 0.0,
            frame: 0,
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

/// A pipe pair with a vertical gap
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    /// Left edge
    pub x: f32,
    /// Lower edge of the top pipe
    pub gap_top: f32,
    /// Upper edge of the bottom pipe
    pub gap_bottom: f32,
    /// Set once the bird has passed this pipe
    pub scored: bool,
}

impl Pipe {
    /// Build a pipe at `x` whose gap starts at `gap_top` and spans `gap`
    pub fn new(x: f32, gap_top: f32, gap: f32) -> Self {
        Self {
            x,
            gap_top,
            gap_bottom: gap_top + gap,
            scored: false,
        }
    }

    #[inline]
    pub fn right(&self, pipe_width: f32) -> f32 {
        self.x + pipe_width
    }
}

/// Complete session state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub session: SessionState,
    pub bird: Bird,
    /// Active pipes in spawn order
    pub pipes: Vec<Pipe>,
    /// Ticks simulated this session (drives the bird animation)
    pub frames: u64,
    /// Pipes passed this session
    pub score: u32,
    /// Running ticks since the session started (drives spawning)
    pub pipe_timer: u32,
}

impl GameState {
    /// Fresh session with the bird at its start position
    pub fn new(tuning: &Tuning, bird_size: Vec2) -> Self {
        Self {
            session: SessionState::NotStarted,
            bird: Bird::new(tuning.bird_start(), bird_size),
            pipes: Vec::new(),
            frames: 0,
            score: 0,
            pipe_timer: 0,
        }
    }

    /// Return to `NotStarted`, keeping the bird's bounding box
    pub fn reset(&mut self, tuning: &Tuning) {
        let size = self.bird.size;
        *self = Self::new(tuning, size);
    }

    pub fn is_running(&self) -> bool {
        self.session == SessionState::Running
    }

    pub fn is_over(&self) -> bool {
        self.session == SessionState::Over
    }
}
