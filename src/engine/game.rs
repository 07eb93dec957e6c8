//! Scene lifecycle driver.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{event, event::Event, terminal};

use super::assets::{AssetLoader, TextureStore};
use super::audio::{AudioOut, Tone};
use super::input::{InputBindings, Trigger, is_quit};
use super::math::Vec2;
use super::physics::{ArcadeWorld, Body, BodyHandle, GroupHandle};
use super::render::{Image, PixelBuf, Renderer};
use crate::config::EngineConfig;

/// Hooks the game calls over a scene's lifetime.
pub trait Scene {
    type Action: Copy + fmt::Debug;

    /// Declares the images `create` will use.
    fn preload(&mut self, load: &mut AssetLoader);

    /// Runs once, after every declared image is available.
    fn create(&mut self, ctx: &mut SceneContext<Self::Action>);

    /// Runs once per frame. `time` and `delta` are in milliseconds.
    fn update(&mut self, ctx: &mut SceneContext<Self::Action>, time: f64, delta: f64);

    /// Runs for each action bound to a trigger that fired.
    fn handle_action(&mut self, ctx: &mut SceneContext<Self::Action>, action: Self::Action);
}

/// Everything a scene can touch from its hooks.
pub struct SceneContext<A> {
    pub viewport: Vec2,
    pub textures: TextureStore,
    pub physics: ArcadeWorld,
    pub images: Vec<Image>,
    pub input: InputBindings<A>,
    sounds: Vec<Tone>,
}

impl<A: Copy> SceneContext<A> {
    pub fn new(viewport: Vec2, textures: TextureStore, physics: ArcadeWorld) -> Self {
        Self {
            viewport,
            textures,
            physics,
            images: Vec::new(),
            input: InputBindings::default(),
            sounds: Vec::new(),
        }
    }

    pub fn add_image(&mut self, x: f64, y: f64, key: &str) -> &mut Image {
        self.images.push(Image::new(key, x, y));
        let last = self.images.len() - 1;
        &mut self.images[last]
    }

    /// Adds a body sized after its texture.
    pub fn add_sprite(&mut self, x: f64, y: f64, key: &str) -> BodyHandle {
        let body = self.sprite(x, y, key);
        self.physics.add(body)
    }

    pub fn add_group(&mut self) -> GroupHandle {
        self.physics.add_group()
    }

    pub fn create_in_group(
        &mut self,
        group: GroupHandle,
        x: f64,
        y: f64,
        key: &str,
    ) -> BodyHandle {
        let body = self.sprite(x, y, key);
        self.physics.add_to_group(group, body)
    }

    pub fn play(&mut self, tone: Tone) {
        self.sounds.push(tone);
    }

    fn sprite(&self, x: f64, y: f64, key: &str) -> Body {
        let (w, h) = self.textures.size(key);
        Body::new(key, Vec2::new(x, y), Vec2::new(w, h))
    }

    fn take_sounds(&mut self) -> Vec<Tone> {
        std::mem::take(&mut self.sounds)
    }
}

pub struct Game<S: Scene> {
    scene: S,
    ctx: SceneContext<S::Action>,
    renderer: Renderer,
    audio: AudioOut,
    frame: Duration,
    step: f64,
    accumulator: f64,
    time_ms: f64,
    frames: u64,
}

impl<S: Scene> Game<S> {
    /// Runs `preload`, loads the declared images, then runs `create`.
    pub fn boot(config: &EngineConfig, asset_root: &Path, mut scene: S, audio: AudioOut) -> Self {
        let mut loader = AssetLoader::new(asset_root);
        scene.preload(&mut loader);
        log::debug!("preloading {:?}", loader.queued().collect::<Vec<_>>());
        let textures = loader.load();

        let viewport = Vec2::new(config.width, config.height);
        let physics = ArcadeWorld::new(Vec2::new(0.0, config.physics.gravity_y));
        let mut ctx = SceneContext::new(viewport, textures, physics);
        scene.create(&mut ctx);
        log::info!(
            "scene created: {} textures, {} bodies, {} images, {} input bindings",
            ctx.textures.len(),
            ctx.physics.len(),
            ctx.images.len(),
            ctx.input.len()
        );

        let mut game = Self {
            scene,
            ctx,
            renderer: Renderer {
                viewport,
                pixel_art: config.pixel_art,
                debug: config.physics.debug,
            },
            audio,
            frame: Duration::from_millis(config.frame_ms),
            step: 1.0 / config.physics.fps,
            accumulator: 0.0,
            time_ms: 0.0,
            frames: 0,
        };
        game.flush_sounds();
        game
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn context(&self) -> &SceneContext<S::Action> {
        &self.ctx
    }

    /// Simulated milliseconds since boot.
    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// One frame: fixed physics steps covering `delta`, then `update`.
    pub fn advance(&mut self, delta: Duration) {
        let delta_s = delta.as_secs_f64();
        self.accumulator += delta_s;
        while self.accumulator >= self.step {
            self.ctx.physics.step(self.step);
            self.accumulator -= self.step;
        }
        let delta_ms = delta_s * 1000.0;
        self.time_ms += delta_ms;
        self.frames += 1;
        self.scene.update(&mut self.ctx, self.time_ms, delta_ms);
        self.flush_sounds();
    }

    pub fn trigger(&mut self, trigger: Trigger) {
        for action in self.ctx.input.actions_for(trigger) {
            log::trace!("{trigger:?} -> {action:?}");
            self.scene.handle_action(&mut self.ctx, action);
        }
        self.flush_sounds();
    }

    pub fn draw(&self, buf: &mut PixelBuf) {
        self.renderer
            .draw(buf, &self.ctx.textures, &self.ctx.images, &self.ctx.physics);
    }

    /// Advances whole frames without a terminal until `duration` has elapsed.
    pub fn simulate(&mut self, duration: Duration) {
        let end = self.time_ms + duration.as_secs_f64() * 1000.0;
        while self.time_ms < end {
            self.advance(self.frame);
        }
    }

    /// Terminal loop: drain input, advance, draw, pace. Returns on a quit key.
    pub fn run(&mut self, out: &mut impl Write) -> Result<()> {
        let (cols, rows) = terminal::size()?;
        let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);
        let mut last = Instant::now();

        loop {
            let frame_start = Instant::now();

            // Input
            while event::poll(Duration::ZERO)? {
                let event = event::read()?;
                if is_quit(&event) {
                    log::info!("quit after {} frames", self.frames);
                    return Ok(());
                }
                if let Event::Resize(c, r) = event {
                    buf.resize(c as usize, r as usize * 2);
                    continue;
                }
                if let Some(trigger) = Trigger::from_event(&event) {
                    self.trigger(trigger);
                }
            }

            // Update
            let now = Instant::now();
            self.advance(now - last);
            last = now;

            // Render
            self.draw(&mut buf);
            buf.render(out)?;

            // Frame pacing
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame {
                thread::sleep(self.frame - elapsed);
            }
        }
    }

    fn flush_sounds(&mut self) {
        for tone in self.ctx.take_sounds() {
            self.audio.play(tone);
        }
    }
}
