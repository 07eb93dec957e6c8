use rand::Rng;

use crate::config::GameConfig;
use crate::engine::{AssetLoader, BodyHandle, Scene, SceneContext};

use super::placement::{PairOffsets, PlacementCursor, place_pair};
use super::{
    Action, Bird, FLAP_TONE, PIPE, Summary, declare_images, keep_bird_in_bounds, stage_bird,
};

struct Stage {
    bird: Bird,
    pairs: Vec<(BodyHandle, BodyHandle)>,
}

/// Pipe pairs placed once along a running cursor; nothing comes back.
pub struct FiniteScene<R> {
    config: GameConfig,
    rng: R,
    cursor: PlacementCursor,
    stage: Option<Stage>,
}

impl<R: Rng> FiniteScene<R> {
    pub fn new(config: GameConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            cursor: PlacementCursor::default(),
            stage: None,
        }
    }

    pub fn bird(&self) -> Option<&Bird> {
        self.stage.as_ref().map(|stage| &stage.bird)
    }

    /// (upper, lower) handles in placement order.
    pub fn pairs(&self) -> &[(BodyHandle, BodyHandle)] {
        self.stage
            .as_ref()
            .map(|stage| stage.pairs.as_slice())
            .unwrap_or_default()
    }

    pub fn cursor(&self) -> PlacementCursor {
        self.cursor
    }

    /// Moves the cursor, places the pair there and starts it scrolling.
    fn place_pipe(
        &mut self,
        ctx: &mut SceneContext<Action>,
        upper: BodyHandle,
        lower: BodyHandle,
    ) {
        let offsets = PairOffsets::draw(&mut self.rng, &self.config.pipes, ctx.viewport.y);
        let x = self.cursor.advance(offsets.horizontal);
        place_pair(&mut ctx.physics, upper, lower, x, offsets);

        let vx = self.config.pipes.velocity_x;
        ctx.physics.body_mut(upper).velocity.x = vx;
        ctx.physics.body_mut(lower).velocity.x = vx;
    }
}

impl<R: Rng> Scene for FiniteScene<R> {
    type Action = Action;

    fn preload(&mut self, load: &mut AssetLoader) {
        declare_images(load, &self.config.assets);
    }

    fn create(&mut self, ctx: &mut SceneContext<Action>) {
        let bird = stage_bird(ctx, &self.config.bird);

        let mut pairs = Vec::with_capacity(self.config.pipes.pairs);
        for _ in 0..self.config.pipes.pairs {
            let upper = ctx.add_sprite(0.0, 0.0, PIPE);
            ctx.physics.body_mut(upper).set_origin(0.0, 1.0);
            let lower = ctx.add_sprite(0.0, 0.0, PIPE);
            ctx.physics.body_mut(lower).set_origin(0.0, 0.0);

            self.place_pipe(ctx, upper, lower);
            pairs.push((upper, lower));
        }
        log::debug!("placed {} pipe pairs up to x={}", pairs.len(), self.cursor.x());
        self.stage = Some(Stage { bird, pairs });
    }

    fn update(&mut self, ctx: &mut SceneContext<Action>, _time: f64, _delta: f64) {
        if let Some(stage) = self.stage.as_mut() {
            keep_bird_in_bounds(ctx, &mut stage.bird);
        }
    }

    fn handle_action(&mut self, ctx: &mut SceneContext<Action>, action: Action) {
        let Some(stage) = self.stage.as_ref() else {
            return;
        };
        match action {
            Action::Flap => {
                stage.bird.flap(&mut ctx.physics);
                ctx.play(FLAP_TONE);
            }
        }
    }
}

impl<R: Rng> Summary for FiniteScene<R> {
    fn summary(&self) -> String {
        let resets = self.bird().map_or(0, Bird::resets);
        format!(
            "finite: {resets} bird resets, {} pairs placed up to x={}",
            self.pairs().len(),
            self.cursor().x()
        )
    }
}
