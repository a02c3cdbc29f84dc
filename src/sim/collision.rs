//! Collision detection and pass-through scoring
//!
//! Everything is axis-aligned: the bird is a box, a pipe is a vertical band
//! with a gap. Checks are pure functions so they can be probed in isolation.

use super::state::{Bird, Pipe};

/// What ended a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    /// Bird's bottom edge crossed the ground line
    Ground,
    /// Bird's top edge went above the playfield
    Ceiling,
    /// Bird hit the pipe at this index in the active list
    Pipe(usize),
}

impl Collision {
    pub fn describe(&self) -> String {
        match self {
            Collision::Ground => "hit the ground".to_string(),
            Collision::Ceiling => "flew off the top".to_string(),
            Collision::Pipe(i) => format!("hit pipe #{}", i),
        }
    }
}

/// Check the bird against the playfield bounds
pub fn bounds_collision(bird: &Bird, ground_line: f32) -> Option<Collision> {
    if bird.bottom() > ground_line {
        Some(Collision::Ground)
    } else if bird.top() < 0.0 {
        Some(Collision::Ceiling)
    } else {
        None
    }
}

/// Whether the bird's horizontal span overlaps the pipe's
#[inline]
pub fn overlaps_horizontally(bird: &Bird, pipe: &Pipe, pipe_width: f32) -> bool {
    bird.right() > pipe.x && bird.left() < pipe.right(pipe_width)
}

/// Whether the bird's vertical span sits entirely inside the pipe's gap
#[inline]
pub fn inside_gap(bird: &Bird, pipe: &Pipe) -> bool {
    bird.top() >= pipe.gap_top && bird.bottom() <= pipe.gap_bottom
}

/// True if the bird touches the solid part of the pipe
pub fn pipe_collision(bird: &Bird, pipe: &Pipe, pipe_width: f32) -> bool {
    overlaps_horizontally(bird, pipe, pipe_width) && !inside_gap(bird, pipe)
}

/// Mark the pipe scored if the bird has fully passed it.
///
/// Returns true only on the call that flips the flag.
pub fn score_pipe(pipe: &mut Pipe, bird: &Bird, pipe_width: f32) -> bool {
    if !pipe.scored && pipe.right(pipe_width) < bird.left() {
        pipe.scored = true;
        return true;
    }
    false
}
