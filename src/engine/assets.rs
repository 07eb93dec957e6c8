//! Image declarations and texture storage.
//!
//! Scenes declare images by key during preload; the game resolves them before
//! `create` runs. A file that cannot be read is replaced by a built-in texture
//! so the game can always boot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::color::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    /// Row-major; `None` is a transparent texel.
    pub texels: Vec<Option<Rgb>>,
}

impl Texture {
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            texels: vec![None; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            self.texels[y * self.width + x]
        } else {
            None
        }
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.texels[y as usize * self.width + x as usize] = Some(c);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn decode(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("failed to decode {}", path.display()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let texels = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                (a >= 128).then_some(Rgb(r, g, b))
            })
            .collect();
        Ok(Self {
            width: width as usize,
            height: height as usize,
            texels,
        })
    }
}

/// Loaded textures, keyed by the name they were declared under.
#[derive(Debug, Default)]
pub struct TextureStore {
    textures: HashMap<String, Texture>,
}

impl TextureStore {
    pub fn get(&self, key: &str) -> Option<&Texture> {
        self.textures.get(key)
    }

    /// Size in world units; unknown keys fall back to the placeholder size.
    pub fn size(&self, key: &str) -> (f64, f64) {
        self.get(key)
            .map(|t| (t.width as f64, t.height as f64))
            .unwrap_or((PLACEHOLDER_SIZE as f64, PLACEHOLDER_SIZE as f64))
    }

    pub fn insert(&mut self, key: impl Into<String>, texture: Texture) {
        self.textures.insert(key.into(), texture);
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }
}

/// Collects image declarations made in `Scene::preload`.
#[derive(Debug)]
pub struct AssetLoader {
    root: PathBuf,
    queue: Vec<(String, PathBuf)>,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            queue: Vec::new(),
        }
    }

    /// Declares an image; `path` is relative to the asset root.
    pub fn image(&mut self, key: &str, path: impl AsRef<Path>) {
        self.queue.push((key.to_string(), self.root.join(path)));
    }

    pub fn queued(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(|(key, _)| key.as_str())
    }

    pub fn load(self) -> TextureStore {
        let mut store = TextureStore::default();
        for (key, path) in self.queue {
            let texture = match Texture::decode(&path) {
                Ok(texture) => {
                    log::info!(
                        "loaded '{key}' from {} ({}x{})",
                        path.display(),
                        texture.width,
                        texture.height
                    );
                    texture
                }
                Err(err) => {
                    log::warn!("{err:#}; using built-in texture for '{key}'");
                    builtin_texture(&key)
                }
            };
            store.insert(key, texture);
        }
        store
    }
}

const PLACEHOLDER_SIZE: usize = 32;

pub const SKY_SIZE: (usize, usize) = (800, 600);
pub const BIRD_SIZE: (usize, usize) = (34, 24);
pub const PIPE_SIZE: (usize, usize) = (52, 480);

pub fn builtin_texture(key: &str) -> Texture {
    match key {
        "sky" => paint_sky(SKY_SIZE.0, SKY_SIZE.1),
        "bird" => paint_bird(BIRD_SIZE.0, BIRD_SIZE.1),
        "pipe" => paint_pipe(PIPE_SIZE.0, PIPE_SIZE.1),
        _ => paint_placeholder(),
    }
}

fn paint_sky(w: usize, h: usize) -> Texture {
    let mut tex = Texture::blank(w, h);
    let ground_h = h / 16;
    let sky_h = h - ground_h;
    let scale = h as f64 / 48.0;

    for y in 0..sky_h {
        let t = ((y * 256) / sky_h.max(1)) as u16;
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
        for x in 0..w {
            tex.set(x as i32, y as i32, c);
        }
    }

    let base = sky_h as i32;
    for (color, freq, a, b, lift) in [
        (HILL_FAR, 0.04 / scale, 6.0, 1.7, 4.0),
        (HILL_NEAR, 0.06 / scale, 4.0, 2.3, 2.0),
    ] {
        for x in 0..w as i32 {
            let fx = x as f64 * freq;
            let hill = (fx.sin() * a + (fx * b).sin() * a / 2.0) * scale;
            let top = base - hill as i32 - (lift * scale) as i32;
            for y in top..base {
                tex.set(x, y, color);
            }
        }
    }

    for x in 0..w as i32 {
        let alt = (x / 6) % 2 == 0;
        tex.fill_rect(x, base, 1, 3, if alt { GRASS } else { GRASS_LIGHT });
    }
    for y in (base + 3)..h as i32 {
        for x in 0..w as i32 {
            let stripe = (x + (y - base) * 2) % 24 < 12;
            tex.set(x, y, if stripe { DIRT } else { DIRT_DARK });
        }
    }
    tex
}

fn paint_bird(w: usize, h: usize) -> Texture {
    let mut tex = Texture::blank(w, h);
    let s = h as f64 / 7.0;
    let bw = (3.0 * s) as i32;
    let bh = (2.0 * s) as i32;
    let tail_w = (1.5 * s).max(1.0) as i32;
    let cx = bw + tail_w;
    let cy = h as i32 / 2;

    // Body
    tex.fill_rect(cx - bw, cy - bh, bw * 2 + 1, bh * 2, BIRD_Y);
    tex.fill_rect(cx - bw + 1, cy - bh, bw * 2 - 2, 1.max((s * 0.8) as i32), BIRD_HI);

    // Wing
    let wing_h = (1.5 * s).max(1.0) as i32;
    let wing_w = (2.0 * s).max(1.0) as i32;
    tex.fill_rect(cx - bw + 1, cy - 1, wing_w, wing_h, BIRD_WING);

    // Eye
    let ex = cx + bw - (1.5 * s) as i32;
    let ey = cy - bh + (1.0 * s).max(1.0) as i32;
    let eye_r = (0.8 * s).max(1.0) as i32;
    tex.fill_rect(ex, ey, eye_r + 1, eye_r + 1, BIRD_EYE);
    tex.set(ex + eye_r, ey + eye_r, BIRD_PUPIL);
    tex.set(ex + eye_r - 1, ey + eye_r, BIRD_PUPIL);

    // Beak
    let beak_x = cx + bw;
    let beak_y = cy - (0.5 * s) as i32;
    let beak_w = w as i32 - beak_x;
    let beak_h = (1.5 * s).max(1.0) as i32;
    tex.fill_rect(beak_x, beak_y, beak_w, beak_h / 2 + 1, BIRD_BEAK_HI);
    tex.fill_rect(beak_x, beak_y + beak_h / 2 + 1, beak_w, beak_h / 2, BIRD_BEAK);

    // Tail
    tex.fill_rect(cx - bw - tail_w, cy - 1, tail_w, 3, BIRD_WING);
    tex
}

fn paint_pipe(w: usize, h: usize) -> Texture {
    let mut tex = Texture::blank(w, h);
    let pw = w as i32;
    let cap_h = 24;
    for x in 0..pw {
        let c = pipe_shade(x, pw);
        for y in 0..h as i32 {
            tex.set(x, y, c);
        }
    }
    // A cap band at each end, so either anchor reads as a pipe mouth.
    for y0 in [0, h as i32 - cap_h] {
        for x in 0..pw {
            tex.set(x, y0, CAP_DARK);
            tex.set(x, y0 + cap_h - 1, CAP_DARK);
        }
    }
    tex
}

fn paint_placeholder() -> Texture {
    let mut tex = Texture::blank(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE);
    for y in 0..PLACEHOLDER_SIZE as i32 {
        for x in 0..PLACEHOLDER_SIZE as i32 {
            let c = if (x / 8 + y / 8) % 2 == 0 {
                DEBUG_BODY
            } else {
                BIRD_PUPIL
            };
            tex.set(x, y, c);
        }
    }
    tex
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}
