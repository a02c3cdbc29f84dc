//! Rendering
//!
//! The core produces a backend-neutral draw list from the simulation state;
//! hosts own the actual painter (canvas 2D in the browser).

pub mod assets;
pub mod draw;

pub use assets::{AssetId, AssetManifest, AssetProvider, SpriteSheet};
pub use draw::{DrawCommand, DrawList, Rect, Repeat, render};
