use rand::Rng;

use crate::config::GameConfig;
use crate::engine::{AssetLoader, GroupHandle, Scene, SceneContext};

use super::placement::{place_after_rightmost, recycle_pipes};
use super::{
    Action, Bird, FLAP_TONE, PIPE, Summary, declare_images, keep_bird_in_bounds, stage_bird,
};

struct Stage {
    bird: Bird,
    pipes: GroupHandle,
}

/// All pipes live in one group; expired pairs move back past the rightmost pipe.
pub struct EndlessScene<R> {
    config: GameConfig,
    rng: R,
    stage: Option<Stage>,
    recycled: u64,
}

impl<R: Rng> EndlessScene<R> {
    pub fn new(config: GameConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            stage: None,
            recycled: 0,
        }
    }

    pub fn bird(&self) -> Option<&Bird> {
        self.stage.as_ref().map(|stage| &stage.bird)
    }

    #[cfg(test)]
    pub fn pipes(&self) -> Option<GroupHandle> {
        self.stage.as_ref().map(|stage| stage.pipes)
    }

    /// Pairs moved back to the right since `create`.
    pub fn recycled(&self) -> u64 {
        self.recycled
    }
}

impl<R: Rng> Scene for EndlessScene<R> {
    type Action = Action;

    fn preload(&mut self, load: &mut AssetLoader) {
        declare_images(load, &self.config.assets);
    }

    fn create(&mut self, ctx: &mut SceneContext<Action>) {
        let bird = stage_bird(ctx, &self.config.bird);
        let height = ctx.viewport.y;
        let pipes = ctx.add_group();

        for _ in 0..self.config.pipes.pairs {
            let upper = ctx.create_in_group(pipes, 0.0, 0.0, PIPE);
            ctx.physics.body_mut(upper).set_origin(0.0, 1.0);
            let lower = ctx.create_in_group(pipes, 0.0, 0.0, PIPE);
            ctx.physics.body_mut(lower).set_origin(0.0, 0.0);

            place_after_rightmost(
                &mut ctx.physics,
                pipes,
                (upper, lower),
                &mut self.rng,
                &self.config.pipes,
                height,
            );
        }

        ctx.physics.set_group_velocity_x(pipes, self.config.pipes.velocity_x);
        self.stage = Some(Stage { bird, pipes });
    }

    fn update(&mut self, ctx: &mut SceneContext<Action>, _time: f64, _delta: f64) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        keep_bird_in_bounds(ctx, &mut stage.bird);

        let height = ctx.viewport.y;
        if recycle_pipes(
            &mut ctx.physics,
            stage.pipes,
            &mut self.rng,
            &self.config.pipes,
            height,
        ) {
            self.recycled += 1;
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

impl<R: Rng> Summary for EndlessScene<R> {
    fn summary(&self) -> String {
        let resets = self.bird().map_or(0, Bird::resets);
        format!(
            "endless: {resets} bird resets, {} pipe pairs recycled",
            self.recycled()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engine::{Game, SPACE, Trigger, Vec2};
    use crate::scene::testing::{boot, rng};
    use rand_chacha::ChaCha8Rng;

    fn booted(seed: u64) -> Game<EndlessScene<ChaCha8Rng>> {
        boot(EndlessScene::new(GameConfig::default(), rng(seed)))
    }

    const FRAME: Duration = Duration::from_millis(33);

    #[test]
    fn create_builds_the_stage() {
        let game = booted(1);
        let ctx = game.context();
        let scene = game.scene();

        assert_eq!(ctx.images.len(), 1);
        assert_eq!(ctx.images[0].origin, Vec2::ZERO);
        assert_eq!(ctx.input.actions_for(SPACE), vec![Action::Flap]);
        assert_eq!(ctx.input.actions_for(Trigger::PointerDown), vec![Action::Flap]);

        let bird = ctx.physics.body(scene.bird().unwrap().handle());
        assert_eq!(bird.position, Vec2::new(80.0, 300.0));
        assert_eq!(bird.gravity.y, 300.0);
        assert_eq!(ctx.physics.gravity, Vec2::ZERO);

        let pipes = ctx.physics.children(scene.pipes().unwrap());
        assert_eq!(pipes.len(), 8);
        assert_eq!(ctx.physics.len(), 9);
        for &pipe in pipes {
            assert_eq!(ctx.physics.body(pipe).velocity, Vec2::new(-200.0, 0.0));
        }
    }

    #[test]
    fn create_spaces_pairs_from_the_rightmost() {
        for seed in 0..20 {
            let game = booted(seed);
            let ctx = game.context();
            let pipes = ctx.physics.children(game.scene().pipes().unwrap());
            let mut rightmost = 0.0;
            for pair in pipes.chunks(2) {
                let upper = ctx.physics.body(pair[0]);
                let lower = ctx.physics.body(pair[1]);
                assert_eq!(upper.origin, Vec2::new(0.0, 1.0));
                assert_eq!(lower.origin, Vec2::ZERO);
                assert_eq!(upper.position.x, lower.position.x);

                let spacing = upper.position.x - rightmost;
                assert!((380.0..=430.0).contains(&spacing), "spacing={spacing}");
                let gap = lower.position.y - upper.position.y;
                assert!((150.0..=250.0).contains(&gap), "gap={gap}");
                assert!(upper.position.y >= 20.0 && upper.position.y <= 580.0 - gap);
                rightmost = upper.position.x;
            }
        }
    }

    #[test]
    fn flap_sets_upward_velocity_from_either_trigger() {
        let mut game = booted(2);
        let handle = game.scene().bird().unwrap().handle();

        game.advance(FRAME);
        assert!(game.context().physics.body(handle).velocity.y > 0.0);
        game.trigger(SPACE);
        assert_eq!(game.context().physics.body(handle).velocity.y, -250.0);

        game.advance(FRAME);
        game.trigger(Trigger::PointerDown);
        assert_eq!(game.context().physics.body(handle).velocity.y, -250.0);
        assert_eq!(game.context().physics.body(handle).velocity.x, 0.0);
    }

    #[test]
    fn flapping_into_the_ceiling_resets() {
        let mut game = booted(3);
        let mut frames = 0;
        while game.scene().bird().unwrap().resets() == 0 {
            game.trigger(SPACE);
            game.advance(FRAME);
            frames += 1;
            assert!(frames < 500, "bird never reached the ceiling");
        }
        let body = game
            .context()
            .physics
            .body(game.scene().bird().unwrap().handle());
        assert_eq!(body.position, Vec2::new(80.0, 300.0));
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn ten_idle_seconds_hit_the_floor_and_reset_once_per_crossing() {
        let mut game = booted(4);
        let handle = game.scene().bird().unwrap().handle();
        let floor = 600.0 - game.context().physics.body(handle).height();

        let mut jumps = 0;
        let mut first_jump_ms = None;
        let mut prev_y = game.context().physics.body(handle).position.y;
        while game.time_ms() < 10_000.0 {
            game.advance(FRAME);
            let body = game.context().physics.body(handle);
            let y = body.position.y;
            // Every crossing is caught in the frame it happens.
            assert!(y > 0.0 && y < floor, "y={y}");
            if y < prev_y {
                assert_eq!(body.position, Vec2::new(80.0, 300.0));
                assert_eq!(body.velocity.y, 0.0);
                jumps += 1;
                first_jump_ms.get_or_insert(game.time_ms());
            }
            prev_y = y;
        }

        let resets = game.scene().bird().unwrap().resets();
        assert!(resets >= 1);
        assert_eq!(jumps, resets);
        // 276 units from rest at 300 u/s² takes about 1.36 s.
        let first = first_jump_ms.unwrap();
        assert!((1200.0..1500.0).contains(&first), "first reset at {first} ms");
    }

    #[test]
    fn recycling_keeps_the_pipe_count() {
        let mut game = booted(5);
        game.simulate(Duration::from_secs(10));

        assert!(game.scene().recycled() >= 1);
        let ctx = game.context();
        let pipes = ctx.physics.children(game.scene().pipes().unwrap());
        assert_eq!(pipes.len(), 8);
        assert_eq!(ctx.physics.len(), 9);
        for pair in pipes.chunks(2) {
            let upper = ctx.physics.body(pair[0]);
            let lower = ctx.physics.body(pair[1]);
            assert_eq!(upper.position.x, lower.position.x);
            assert!(upper.bounds().right() > -10.0, "pair left behind");
        }
        assert!(game.scene().summary().starts_with("endless:"));
    }
}
