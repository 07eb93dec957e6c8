//! Game configuration, loaded from an optional TOML file.
//!
//! Every field has a default, so a file only needs the values it changes:
//!
//! ```toml
//! [engine.physics]
//! debug = false
//!
//! [pipes]
//! pairs = 6
//! horizontal_distance = { min = 300, max = 360 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GameConfig {
    pub engine: EngineConfig,
    pub bird: BirdConfig,
    pub pipes: PipeConfig,
    pub assets: AssetConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub width: f64,
    pub height: f64,
    pub pixel_art: bool,
    /// Target frame time of the terminal loop.
    pub frame_ms: u64,
    /// Play tone cues. Defaults to on only in builds with the `audio` feature.
    pub audio: bool,
    pub physics: ArcadeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            pixel_art: true,
            frame_ms: 33,
            audio: cfg!(feature = "audio"),
            physics: ArcadeConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ArcadeConfig {
    pub gravity_y: f64,
    pub debug: bool,
    /// Fixed physics steps per second.
    pub fps: f64,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            gravity_y: 0.0,
            debug: true,
            fps: 60.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BirdConfig {
    pub gravity: f64,
    /// Upward speed set by a flap; applied as a negative y velocity.
    pub flap_velocity: f64,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            gravity: 300.0,
            flap_velocity: 250.0,
        }
    }
}

/// Inclusive integer range for random draws.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct DrawRange {
    pub min: i64,
    pub max: i64,
}

impl DrawRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PipeConfig {
    pub pairs: usize,
    pub velocity_x: f64,
    pub horizontal_distance: DrawRange,
    pub vertical_distance: DrawRange,
    /// Minimum distance between the gap and the top or bottom edge.
    pub margin: i64,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            pairs: 4,
            velocity_x: -200.0,
            horizontal_distance: DrawRange::new(380, 430),
            vertical_distance: DrawRange::new(150, 250),
            margin: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub root: PathBuf,
    pub sky: PathBuf,
    pub bird: PathBuf,
    pub pipe: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            sky: PathBuf::from("sky.png"),
            bird: PathBuf::from("bird.png"),
            pipe: PathBuf::from("pipe.png"),
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let engine = &self.engine;
        ensure!(
            engine.width > 0.0 && engine.height > 0.0,
            "viewport must be non-empty, got {}x{}",
            engine.width,
            engine.height
        );
        ensure!(
            engine.physics.fps > 0.0,
            "physics fps must be positive, got {}",
            engine.physics.fps
        );
        ensure!(engine.frame_ms > 0, "frame_ms must be positive");

        let pipes = &self.pipes;
        ensure!(pipes.pairs > 0, "at least one pipe pair is required");
        for (name, range) in [
            ("horizontal_distance", pipes.horizontal_distance),
            ("vertical_distance", pipes.vertical_distance),
        ] {
            ensure!(
                range.min <= range.max,
                "pipes.{name}: min {} exceeds max {}",
                range.min,
                range.max
            );
            ensure!(range.min > 0, "pipes.{name} must be positive, got min {}", range.min);
        }
        ensure!(pipes.margin >= 0, "pipes.margin must not be negative");
        let widest = pipes
            .margin
            .checked_mul(2)
            .and_then(|margins| margins.checked_add(pipes.vertical_distance.max));
        ensure!(
            widest.is_some_and(|widest| widest as f64 <= engine.height),
            "a {} unit gap plus {} unit margins does not fit a {} unit viewport",
            pipes.vertical_distance.max,
            pipes.margin,
            engine.height
        );
        Ok(())
    }
}
