use crate::config::BirdConfig;
use crate::engine::physics::ArcadeWorld;
use crate::engine::{BodyHandle, SceneContext, Vec2};

use super::{Action, BIRD};

/// The player body plus the state needed to flap and respawn it.
#[derive(Debug)]
pub struct Bird {
    handle: BodyHandle,
    spawn: Vec2,
    flap_velocity: f64,
    resets: u64,
}

impl Bird {
    /// Spawns at a tenth of the width and half the height, anchored top-left.
    pub fn spawn(ctx: &mut SceneContext<Action>, config: &BirdConfig) -> Self {
        let spawn = Vec2::new(ctx.viewport.x / 10.0, ctx.viewport.y / 2.0);
        let handle = ctx.add_sprite(spawn.x, spawn.y, BIRD);
        let body = ctx.physics.body_mut(handle);
        body.set_origin(0.0, 0.0);
        body.gravity.y = config.gravity;
        Self {
            handle,
            spawn,
            flap_velocity: config.flap_velocity,
            resets: 0,
        }
    }

    #[cfg(test)]
    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }

    pub fn flap(&self, world: &mut ArcadeWorld) {
        world.body_mut(self.handle).velocity.y = -self.flap_velocity;
    }

    /// True once the body's top edge touches either end of the play band.
    pub fn is_out_of_bounds(&self, world: &ArcadeWorld, height: f64) -> bool {
        let body = world.body(self.handle);
        let y = body.bounds().top();
        y >= height - body.height() || y <= 0.0
    }

    /// Back to the spawn point with no vertical speed; vx is left alone.
    pub fn reset(&mut self, world: &mut ArcadeWorld) {
        let body = world.body_mut(self.handle);
        log::debug!(
            "bird left the play band at y={:.1}, respawning",
            body.position.y
        );
        body.position = self.spawn;
        body.velocity.y = 0.0;
        self.resets += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::{TextureStore, builtin_texture};

    fn context() -> SceneContext<Action> {
        let mut textures = TextureStore::default();
        textures.insert(BIRD, builtin_texture(BIRD));
        SceneContext::new(Vec2::new(800.0, 600.0), textures, ArcadeWorld::default())
    }

    #[test]
    fn spawns_top_left_anchored_with_gravity() {
        let mut ctx = context();
        let bird = Bird::spawn(&mut ctx, &BirdConfig::default());
        let body = ctx.physics.body(bird.handle());
        assert_eq!(body.position, Vec2::new(80.0, 300.0));
        assert_eq!(body.origin, Vec2::ZERO);
        assert_eq!(body.gravity, Vec2::new(0.0, 300.0));
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn flap_overwrites_vertical_velocity() {
        let mut ctx = context();
        let bird = Bird::spawn(&mut ctx, &BirdConfig::default());
        for prior in [-1000.0, 0.0, 37.5, 900.0] {
            ctx.physics.body_mut(bird.handle()).velocity.y = prior;
            bird.flap(&mut ctx.physics);
            assert_eq!(ctx.physics.body(bird.handle()).velocity.y, -250.0);
        }
        assert_eq!(ctx.physics.body(bird.handle()).velocity.x, 0.0);
    }

    #[test]
    fn bounds_are_inclusive_at_both_ends() {
        let mut ctx = context();
        let bird = Bird::spawn(&mut ctx, &BirdConfig::default());
        let cases = [
            (0.0, true),
            (-3.0, true),
            (0.5, false),
            (300.0, false),
            (575.9, false),
            (576.0, true),
            (640.0, true),
        ];
        for (y, out) in cases {
            ctx.physics.body_mut(bird.handle()).position.y = y;
            assert_eq!(bird.is_out_of_bounds(&ctx.physics, 600.0), out, "y={y}");
        }
    }

    #[test]
    fn reset_restores_spawn_and_keeps_vx() {
        let mut ctx = context();
        let mut bird = Bird::spawn(&mut ctx, &BirdConfig::default());
        {
            let body = ctx.physics.body_mut(bird.handle());
            body.position = Vec2::new(12.0, 590.0);
            body.velocity = Vec2::new(7.0, 320.0);
        }
        bird.reset(&mut ctx.physics);
        let body = ctx.physics.body(bird.handle());
        assert_eq!(body.position, Vec2::new(80.0, 300.0));
        assert_eq!(body.velocity, Vec2::new(7.0, 0.0));
        assert_eq!(bird.resets(), 1);
    }
}
