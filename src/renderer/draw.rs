//! Draw list generation
//!
//! Turns a read-only `GameState` into back-to-front draw commands. Hosts
//! paint them with whatever 2D API they have.

use glam::Vec2;

use super::assets::{AssetId, SpriteSheet};
use crate::consts::BIRD_FRAME_COUNT;
use crate::settings::Tuning;
use crate::sim::{GameState, SessionState};

/// RGBA, 0..1
pub type Color = [f32; 4];

/// Colors for overlay elements
pub mod colors {
    use super::Color;

    pub const TEXT: Color = [1.0, 1.0, 1.0, 1.0];
    pub const TEXT_OUTLINE: Color = [0.0, 0.0, 0.0, 1.0];
    pub const PROMPT_DIM: Color = [0.0, 0.0, 0.0, 0.5];
}

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }
}

/// How a pattern fill repeats its image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Both,
    X,
}

impl Repeat {
    /// Canvas `createPattern` repetition keyword
    pub fn as_css(self) -> &'static str {
        match self {
            Repeat::Both => "repeat",
            Repeat::X => "repeat-x",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill `rect` with the image tiled from the canvas origin
    Pattern {
        asset: AssetId,
        rect: Rect,
        repeat: Repeat,
    },
    /// Image at natural size. With `flip_y` it is mirrored about `pos.y`
    /// and extends upward from there.
    Sprite {
        asset: AssetId,
        pos: Vec2,
        size: Vec2,
        flip_y: bool,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    /// Bold sans-serif text centered on `pos.x`, baseline at `pos.y`
    Text {
        text: String,
        pos: Vec2,
        px: f32,
        fill: Color,
        outline: Option<Color>,
    },
}

pub type DrawList = Vec<DrawCommand>;

const SCORE_PX: f32 = 30.0;
const SCORE_BASELINE: f32 = 50.0;
const PROMPT_PX: f32 = 24.0;

/// Build the draw list for one frame
pub fn render(state: &GameState, tuning: &Tuning, sprites: &SpriteSheet) -> DrawList {
    let width = tuning.playfield_width;
    let height = tuning.playfield_height;
    let mut list = Vec::with_capacity(6 + state.pipes.len() * 2);

    list.push(DrawCommand::Pattern {
        asset: AssetId::Background,
        rect: Rect::new(0.0, 0.0, width, height),
        repeat: Repeat::Both,
    });

    for pipe in &state.pipes {
        list.push(DrawCommand::Sprite {
            asset: AssetId::Pipe,
            pos: Vec2::new(pipe.x, pipe.gap_top),
            size: sprites.pipe,
            flip_y: true,
        });
        list.push(DrawCommand::Sprite {
            asset: AssetId::Pipe,
            pos: Vec2::new(pipe.x, pipe.gap_bottom),
            size: sprites.pipe,
            flip_y: false,
        });
    }

    list.push(DrawCommand::Pattern {
        asset: AssetId::Ground,
        rect: Rect::new(0.0, tuning.ground_line(), width, tuning.ground_height),
        repeat: Repeat::X,
    });

    list.push(DrawCommand::Sprite {
        asset: AssetId::Bird(state.bird.frame % BIRD_FRAME_COUNT),
        pos: state.bird.pos,
        size: state.bird.size,
        flip_y: false,
    });

    list.push(DrawCommand::Text {
        text: state.score.to_string(),
        pos: Vec2::new(width / 2.0, SCORE_BASELINE),
        px: SCORE_PX,
        fill: colors::TEXT,
        outline: Some(colors::TEXT_OUTLINE),
    });

    if state.session == SessionState::NotStarted {
        list.push(DrawCommand::FillRect {
            rect: Rect::new(0.0, 0.0, width, height),
            color: colors::PROMPT_DIM,
        });
        for (line, dy) in [("Tap or Press Space", -30.0), ("to Start", 10.0)] {
            list.push(DrawCommand::Text {
                text: line.to_string(),
                pos: Vec2::new(width / 2.0, height / 2.0 + dy),
                px: PROMPT_PX,
                fill: colors::TEXT,
                outline: None,
            });
        }
    }

    list
}
