//! The play scene, in two flavours of pipe handling.
//!
//! [`EndlessScene`] keeps its pipes in one group and recycles expired pairs
//! to the right of the field every frame. [`FiniteScene`] places each pair
//! once along a running cursor and lets the field scroll away.

use std::time::Duration;

use clap::ValueEnum;

use crate::config::{AssetConfig, BirdConfig};
use crate::engine::{AssetLoader, SPACE, SceneContext, Tone, Trigger};

pub mod bird;
pub mod endless;
pub mod finite;
pub mod placement;

pub use bird::Bird;
pub use endless::EndlessScene;
pub use finite::FiniteScene;

pub const SKY: &str = "sky";
pub const BIRD: &str = "bird";
pub const PIPE: &str = "pipe";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Pipes recycle forever.
    Endless,
    /// Four pipe pairs, placed once.
    Finite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Flap,
}

pub const FLAP_TONE: Tone = Tone {
    start_hz: 400.0,
    end_hz: 800.0,
    duration: Duration::from_millis(80),
    gain: 0.12,
};

pub const RESET_TONE: Tone = Tone {
    start_hz: 400.0,
    end_hz: 80.0,
    duration: Duration::from_millis(400),
    gain: 0.15,
};

/// One-line summary printed after a headless run.
pub trait Summary {
    fn summary(&self) -> String;
}

pub fn declare_images(load: &mut AssetLoader, assets: &AssetConfig) {
    load.image(SKY, &assets.sky);
    load.image(BIRD, &assets.bird);
    load.image(PIPE, &assets.pipe);
}

/// Background, bird and flap bindings, shared by both variants.
pub fn stage_bird(ctx: &mut SceneContext<Action>, config: &BirdConfig) -> Bird {
    ctx.add_image(0.0, 0.0, SKY).set_origin(0.0, 0.0);
    let bird = Bird::spawn(ctx, config);
    ctx.input.on(Trigger::PointerDown, Action::Flap);
    ctx.input.on(SPACE, Action::Flap);
    bird
}

/// Boundary check run at the top of every update.
pub fn keep_bird_in_bounds(ctx: &mut SceneContext<Action>, bird: &mut Bird) {
    if bird.is_out_of_bounds(&ctx.physics, ctx.viewport.y) {
        bird.reset(&mut ctx.physics);
        ctx.play(RESET_TONE);
    }
}
