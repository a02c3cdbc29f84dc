//! Sprite assets
//!
//! The core never touches image data. Hosts load the files named by the
//! manifest and report each image's natural size through `AssetProvider`.

use glam::Vec2;

use crate::consts::*;

/// Every image the game draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetId {
    Background,
    Ground,
    /// One sprite serves both pipes; the top one is drawn mirrored
    Pipe,
    /// Bird animation frame
    Bird(usize),
}

impl AssetId {
    /// All assets in load order
    pub fn all() -> Vec<AssetId> {
        let mut ids = vec![AssetId::Background, AssetId::Ground, AssetId::Pipe];
        ids.extend((0..BIRD_FRAME_COUNT).map(AssetId::Bird));
        ids
    }

    /// Size used when the host cannot report one
    pub fn fallback_size(self) -> Vec2 {
        match self {
            AssetId::Background => Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT),
            AssetId::Ground => Vec2::new(PLAYFIELD_WIDTH, GROUND_HEIGHT),
            AssetId::Pipe => Vec2::new(PIPE_WIDTH, PIPE_SPRITE_HEIGHT),
            AssetId::Bird(_) => Vec2::new(BIRD_WIDTH, BIRD_HEIGHT),
        }
    }
}

/// Relative image paths, served next to the wasm bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    pub background: String,
    pub ground: String,
    pub pipe: String,
    pub bird: Vec<String>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            background: "assets/Background/Background1.png".to_string(),
            ground: "assets/Tiles/Style 1/TileStyle1.png".to_string(),
            pipe: "assets/Tiles/Style 1/PipeStyle1.png".to_string(),
            bird: (1..=BIRD_FRAME_COUNT)
                .map(|i| format!("assets/Player/StyleBird1/Bird1-{}.png", i))
                .collect(),
        }
    }
}

impl AssetManifest {
    pub fn path(&self, id: AssetId) -> Option<&str> {
        match id {
            AssetId::Background => Some(&self.background),
            AssetId::Ground => Some(&self.ground),
            AssetId::Pipe => Some(&self.pipe),
            AssetId::Bird(frame) => self.bird.get(frame).map(String::as_str),
        }
    }

    /// Every asset paired with its path
    pub fn entries(&self) -> Vec<(AssetId, &str)> {
        AssetId::all()
            .into_iter()
            .filter_map(|id| self.path(id).map(|p| (id, p)))
            .collect()
    }
}

/// Natural pixel dimensions of loaded images
pub trait AssetProvider {
    /// `None` when the image is missing or not decoded
    fn dimensions(&self, id: AssetId) -> Option<Vec2>;
}

/// Sprite sizes resolved once at load time
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    pub background: Vec2,
    pub ground: Vec2,
    pub pipe: Vec2,
    pub bird: Vec2,
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self {
            background: AssetId::Background.fallback_size(),
            ground: AssetId::Ground.fallback_size(),
            pipe: AssetId::Pipe.fallback_size(),
            bird: AssetId::Bird(0).fallback_size(),
        }
    }
}

impl SpriteSheet {
    /// Query every asset, falling back to default sizes for missing ones.
    /// The bird box comes from the first animation frame.
    pub fn from_provider(provider: &dyn AssetProvider) -> Self {
        let size = |id: AssetId| match provider.dimensions(id) {
            Some(dims) if dims.x > 0.0 && dims.y > 0.0 => dims,
            _ => {
                let fallback = id.fallback_size();
                log::warn!("No dimensions for {:?}, using {}x{}", id, fallback.x, fallback.y);
                fallback
            }
        };
        Self {
            background: size(AssetId::Background),
            ground: size(AssetId::Ground),
            pipe: size(AssetId::Pipe),
            bird: size(AssetId::Bird(0)),
        }
    }
}
