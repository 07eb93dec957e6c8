//! Minimal arcade engine: assets, bodies, input, rendering and the frame loop.

pub mod assets;
pub mod audio;
pub mod color;
pub mod game;
pub mod input;
pub mod math;
pub mod physics;
pub mod render;
pub mod terminal;

pub use assets::AssetLoader;
pub use audio::{AudioOut, Tone};
pub use game::{Game, Scene, SceneContext};
pub use input::{SPACE, Trigger};
pub use math::Vec2;
pub use physics::{BodyHandle, GroupHandle};
