//! Half-block terminal rendering of the world.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use super::assets::{Texture, TextureStore};
use super::color::{DEBUG_BODY, DEBUG_VELOCITY, LETTERBOX, Rgb};
use super::math::{Rect, Vec2};
use super::physics::ArcadeWorld;

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![LETTERBOX; w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, LETTERBOX);
    }

    pub fn fill(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(out, style::SetBackgroundColor(to_term(top)))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(to_term(top)))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(to_term(bot)))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn to_term(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── Viewport fitting ────────────────────────────────────────────────────────

/// Uniform scale plus letterbox offset from world units to buffer pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub scale: f64,
    pub offset: Vec2,
    pub world: Vec2,
}

impl Fit {
    pub fn new(world: Vec2, buf_w: usize, buf_h: usize) -> Self {
        let scale = (buf_w as f64 / world.x).min(buf_h as f64 / world.y);
        let offset = Vec2::new(
            ((buf_w as f64 - world.x * scale) / 2.0).floor(),
            ((buf_h as f64 - world.y * scale) / 2.0).floor(),
        );
        Self {
            scale,
            offset,
            world,
        }
    }

    pub fn to_buf(&self, p: Vec2) -> Vec2 {
        p * self.scale + self.offset
    }

    pub fn to_world(&self, p: Vec2) -> Vec2 {
        (p - self.offset) * (1.0 / self.scale)
    }

    /// Buffer pixel range covered by the world rectangle, clipped to the viewport.
    fn span(&self, r: Rect) -> (i32, i32, i32, i32) {
        let view = self.to_buf(self.world);
        let a = self.to_buf(Vec2::new(r.left(), r.top()));
        let b = self.to_buf(Vec2::new(r.right(), r.bottom()));
        (
            a.x.max(self.offset.x).floor() as i32,
            a.y.max(self.offset.y).floor() as i32,
            b.x.min(view.x).ceil() as i32,
            b.y.min(view.y).ceil() as i32,
        )
    }
}

/// A display object without a body, such as the background.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub texture: String,
    pub position: Vec2,
    pub origin: Vec2,
}

impl Image {
    pub fn new(texture: &str, x: f64, y: f64) -> Self {
        Self {
            texture: texture.to_string(),
            position: Vec2::new(x, y),
            origin: Vec2::new(0.5, 0.5),
        }
    }

    pub fn set_origin(&mut self, x: f64, y: f64) -> &mut Self {
        self.origin = Vec2::new(x, y);
        self
    }

    fn bounds(&self, size: (f64, f64)) -> Rect {
        Rect::new(
            self.position.x - self.origin.x * size.0,
            self.position.y - self.origin.y * size.1,
            size.0,
            size.1,
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    pub viewport: Vec2,
    /// Nearest-texel sampling; otherwise 2x2 averaging.
    pub pixel_art: bool,
    /// Draw arcade body outlines and velocity lines.
    pub debug: bool,
}

impl Renderer {
    pub fn draw(
        &self,
        buf: &mut PixelBuf,
        textures: &TextureStore,
        images: &[Image],
        world: &ArcadeWorld,
    ) {
        buf.fill(LETTERBOX);
        let fit = Fit::new(self.viewport, buf.width(), buf.height());

        for image in images {
            if let Some(tex) = textures.get(&image.texture) {
                self.blit(buf, &fit, tex, image.bounds(textures.size(&image.texture)));
            }
        }
        for body in world.bodies() {
            if let Some(tex) = textures.get(&body.texture) {
                self.blit(buf, &fit, tex, body.bounds());
            }
        }
        if self.debug {
            for body in world.bodies() {
                let r = body.bounds();
                outline(buf, &fit, r);
                let center = Vec2::new(r.x + r.w / 2.0, r.y + r.h / 2.0);
                line(buf, &fit, center, center + body.velocity * 0.5, DEBUG_VELOCITY);
            }
        }
    }

    fn blit(&self, buf: &mut PixelBuf, fit: &Fit, tex: &Texture, rect: Rect) {
        if rect.w <= 0.0 || rect.h <= 0.0 {
            return;
        }
        let (x0, y0, x1, y1) = fit.span(rect);
        for by in y0..y1 {
            for bx in x0..x1 {
                let w = fit.to_world(Vec2::new(bx as f64 + 0.5, by as f64 + 0.5));
                let u = (w.x - rect.x) / rect.w;
                let v = (w.y - rect.y) / rect.h;
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }
                let tx = u * tex.width as f64;
                let ty = v * tex.height as f64;
                let texel = if self.pixel_art {
                    tex.get(tx as usize, ty as usize)
                } else {
                    smooth_sample(tex, tx, ty)
                };
                if let Some(c) = texel {
                    buf.set(bx, by, c);
                }
            }
        }
    }
}

fn smooth_sample(tex: &Texture, tx: f64, ty: f64) -> Option<Rgb> {
    let x = (tx - 0.5).max(0.0) as usize;
    let y = (ty - 0.5).max(0.0) as usize;
    let samples: Vec<Rgb> = [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]
        .into_iter()
        .filter_map(|(sx, sy)| tex.get(sx.min(tex.width - 1), sy.min(tex.height - 1)))
        .collect();
    if samples.len() < 2 {
        return None;
    }
    Rgb::average(&samples)
}

fn outline(buf: &mut PixelBuf, fit: &Fit, r: Rect) {
    let corners = [
        Vec2::new(r.left(), r.top()),
        Vec2::new(r.right(), r.top()),
        Vec2::new(r.right(), r.bottom()),
        Vec2::new(r.left(), r.bottom()),
    ];
    for i in 0..4 {
        line(buf, fit, corners[i], corners[(i + 1) % 4], DEBUG_BODY);
    }
}

fn line(buf: &mut PixelBuf, fit: &Fit, from: Vec2, to: Vec2, c: Rgb) {
    let a = fit.to_buf(from);
    let b = fit.to_buf(to);
    let view = fit.to_buf(fit.world);
    let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let p = a + (b - a) * t;
        if p.x < fit.offset.x || p.y < fit.offset.y || p.x >= view.x || p.y >= view.y {
            continue;
        }
        buf.set(p.x as i32, p.y as i32, c);
    }
}
