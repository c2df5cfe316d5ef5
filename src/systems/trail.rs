//! Trail - software radial-gradient renderer for the 2D tier
//!
//! Draws into a premultiplied f32 RGBA surface:
//! - destination-out fade of the whole surface each tick
//! - a speed-scaled gradient disc under the pointer while it is active
//! - a slowly wandering idle disc otherwise
//! Discs are composited with screen blending.

use crate::core::{smoothstep, Vec2};
use crate::domain::config::TrailConfig;
use crate::domain::palette::{Palette, Rgb};
use crate::spatial::grid::for_each_row;

/// Pointer velocity decay per tick
const VELOCITY_DECAY: f32 = 0.9;
/// Pointer speed (device px per event) that maps to full intensity
const SPEED_NORM: f32 = 60.0;

const IDLE_TIME_SCALE: f64 = 0.00025;
const IDLE_RADIUS_FACTOR: f32 = 0.85;
const IDLE_RADIUS_MIN_FACTOR: f32 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq)]
struct GradientStop {
    at: f32,
    color: Rgb,
    alpha: f32,
}

/// Three-stop radial gradient, evaluated at `t` in [0, 1]
#[derive(Clone, Copy, Debug)]
struct Gradient([GradientStop; 3]);

impl Gradient {
    fn eval(&self, t: f32) -> (Rgb, f32) {
        let s = &self.0;
        if t <= s[0].at {
            return (s[0].color, s[0].alpha);
        }
        for pair in s.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.at {
                let f = (t - a.at) / (b.at - a.at);
                return (a.color.lerp(b.color, f), a.alpha + (b.alpha - a.alpha) * f);
            }
        }
        (s[2].color, s[2].alpha)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct TrailPointer {
    pos: Option<Vec2>,
    prev: Option<Vec2>,
    vel: Vec2,
    active: bool,
}

pub struct TrailRenderer {
    config: TrailConfig,
    colors: [Rgb; 3],
    width: u32,
    height: u32,
    /// Surface pixels per CSS pixel
    scale: f32,
    surface: Vec<f32>,
    pixels: Vec<u8>,
    pointer: TrailPointer,
    last_frame_ms: Option<f64>,
}

impl TrailRenderer {
    pub fn new(config: TrailConfig, palette: &Palette) -> Self {
        let stops = palette.stops();
        let c0 = stops[0];
        let c1 = stops.get(1).copied().unwrap_or(c0);
        let c2 = stops.get(2).copied().unwrap_or(c1);
        Self {
            config,
            colors: [c0, c1, c2],
            width: 0,
            height: 0,
            scale: 1.0,
            surface: Vec::new(),
            pixels: Vec::new(),
            pointer: TrailPointer::default(),
            last_frame_ms: None,
        }
    }

    /// Size the surface to `css * dpr * resolution`; clears it
    pub fn resize(&mut self, css_width: f32, css_height: f32, dpr: f32) -> (u32, u32) {
        let scale = dpr * self.config.resolution;
        let axis = |css: f32| -> u32 {
            let css = if css.is_finite() { css.floor().max(1.0) } else { 1.0 };
            let v = (css * scale).floor();
            if v.is_finite() && v >= 1.0 { v as u32 } else { 1 }
        };
        let (w, h) = (axis(css_width), axis(css_height));
        self.scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        if (w, h) != (self.width, self.height) {
            self.width = w;
            self.height = h;
            self.surface = vec![0.0; w as usize * h as usize * 4];
            self.pixels = vec![0; w as usize * h as usize * 4];
        }
        (w, h)
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Tiny surfaces are skipped, there is nothing worth drawing
    #[inline]
    pub fn drawable(&self) -> bool {
        self.width > 1 && self.height > 1
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.pointer.active
    }

    /// Pointer moved to (x, y) in CSS pixels relative to the container
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let p = Vec2::new(x, y) * self.scale;
        let m = &mut self.pointer;
        if let Some(prev) = m.prev {
            m.vel = p - prev;
        }
        m.prev = Some(p);
        m.pos = Some(p);
        m.active = true;
    }

    pub fn pointer_leave(&mut self) {
        self.pointer.active = false;
    }

    /// Full rate while the pointer is active, `idle_fps` otherwise
    pub fn frame_due(&self, now_ms: f64) -> bool {
        if self.pointer.active || self.config.idle_fps == 0 {
            return true;
        }
        match self.last_frame_ms {
            None => true,
            Some(last) => now_ms - last >= 1000.0 / self.config.idle_fps as f64,
        }
    }

    pub fn render(&mut self, now_ms: f64) {
        self.last_frame_ms = Some(now_ms);
        if !self.drawable() {
            return;
        }

        self.fade();

        self.pointer.vel = self.pointer.vel * VELOCITY_DECAY;
        let speed = (self.pointer.vel.length() / SPEED_NORM * self.config.intensity).min(1.0);
        let base = self.config.cursor_size * self.scale;

        if self.pointer.active {
            if let Some(center) = self.pointer.pos {
                let gradient = Gradient([
                    GradientStop { at: 0.0, color: self.colors[0], alpha: 0.28 + 0.22 * speed },
                    GradientStop { at: 0.55, color: self.colors[1], alpha: 0.18 + 0.18 * speed },
                    GradientStop { at: 1.0, color: self.colors[2], alpha: 0.0 },
                ]);
                self.splat(center, base * (0.65 + speed), &gradient);
            }
        } else {
            let t = now_ms * IDLE_TIME_SCALE;
            let center = Vec2::new(
                ((0.5 + 0.5 * (t * 1.2).sin()) * self.width as f64) as f32,
                ((0.5 + 0.5 * (t * 1.05).cos()) * self.height as f64) as f32,
            );
            let radius = (base * IDLE_RADIUS_FACTOR).max(base * IDLE_RADIUS_MIN_FACTOR);
            let gradient = Gradient([
                GradientStop { at: 0.0, color: self.colors[0], alpha: 0.18 },
                GradientStop { at: 0.6, color: self.colors[1], alpha: 0.10 },
                GradientStop { at: 1.0, color: self.colors[2], alpha: 0.0 },
            ]);
            self.splat(center, radius, &gradient);
        }

        self.export();
    }

    /// destination-out with alpha `fade`
    fn fade(&mut self) {
        let keep = 1.0 - self.config.fade.clamp(0.0, 1.0);
        let width = self.width as usize * 4;
        for_each_row(width, &mut self.surface, |_, row| {
            row.iter_mut().for_each(|c| *c *= keep);
        });
    }

    /// Screen-blend a gradient disc; the edge is softened over `blur` pixels
    fn splat(&mut self, center: Vec2, radius: f32, gradient: &Gradient) {
        if radius.is_nan() || radius <= 0.0 || !center.is_finite() {
            return;
        }
        let blur = (self.config.blur * self.scale).max(0.0);
        let outer = radius + blur;
        let w = self.width as i64;
        let h = self.height as i64;
        let x0 = ((center.x - outer).floor() as i64).max(0);
        let x1 = ((center.x + outer).ceil() as i64).min(w - 1);
        let y0 = ((center.y - outer).floor() as i64).max(0);
        let y1 = ((center.y + outer).ceil() as i64).min(h - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center).length();
                if d >= outer {
                    continue;
                }
                let (color, mut alpha) = gradient.eval(d / outer);
                if blur > 0.0 && d > radius {
                    alpha *= 1.0 - smoothstep((d - radius) / blur);
                }
                if alpha <= 0.0 {
                    continue;
                }
                let i = (y as usize * self.width as usize + x as usize) * 4;
                let src = [color.r * alpha, color.g * alpha, color.b * alpha, alpha];
                for (dst, s) in self.surface[i..i + 4].iter_mut().zip(src) {
                    *dst = s + *dst - s * *dst;
                }
            }
        }
    }

    /// Premultiplied f32 -> straight-alpha RGBA8
    fn export(&mut self) {
        for (px, c) in self.pixels.chunks_exact_mut(4).zip(self.surface.chunks_exact(4)) {
            let a = c[3].clamp(0.0, 1.0);
            if a <= 0.0 {
                px.copy_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            for k in 0..3 {
                px[k] = ((c[k] / a).clamp(0.0, 1.0) * 255.0).round() as u8;
            }
            px[3] = (a * 255.0).round() as u8;
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Alpha of surface pixel (x, y), for tests and diagnostics
    pub fn alpha_at(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.surface[(y as usize * self.width as usize + x as usize) * 4 + 3]
    }

    pub fn memory_bytes(&self) -> usize {
        self.surface.len() * std::mem::size_of::<f32>() + self.pixels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> TrailRenderer {
        let palette = Palette::from_hex(&["#5227FF", "#FF9FFC", "#B19EEF"]).unwrap();
        let mut r = TrailRenderer::new(TrailConfig::default(), &palette);
        r.resize(200.0, 100.0, 1.0);
        r
    }

    #[test]
    fn resize_uses_dpr_and_resolution() {
        let palette = Palette::from_hex(&["#fff"]).unwrap();
        let cfg = TrailConfig { resolution: 0.5, ..TrailConfig::default() };
        let mut r = TrailRenderer::new(cfg, &palette);
        assert_eq!(r.resize(300.7, 100.0, 2.0), (300, 100));
        assert_eq!(r.pixels().len(), 300 * 100 * 4);
        assert!(r.drawable());
        r.resize(0.0, 0.0, 1.0);
        assert!(!r.drawable());
    }

    #[test]
    fn active_pointer_paints_under_cursor() {
        let mut r = renderer();
        r.pointer_move(50.0, 50.0);
        r.render(0.0);
        assert!(r.alpha_at(50, 50) > 0.2);
        assert!(r.pixels()[(50 * 200 + 50) * 4 + 3] > 0);
    }

    #[test]
    fn fade_removes_a_fixed_fraction() {
        let mut r = renderer();
        r.pointer_move(50.0, 50.0);
        r.render(0.0);
        let painted = r.alpha_at(50, 50);
        r.fade();
        assert!((r.alpha_at(50, 50) - painted * 0.92).abs() < 1e-6);
    }

    #[test]
    fn idle_pacing() {
        let mut r = renderer();
        assert!(r.frame_due(0.0));
        r.render(0.0);
        assert!(!r.frame_due(20.0));
        assert!(r.frame_due(1000.0 / 24.0 + 0.1));
        r.pointer_move(5.0, 5.0);
        assert!(r.frame_due(1.0));
    }

    #[test]
    fn faster_pointer_paints_brighter() {
        let mut slow = renderer();
        slow.pointer_move(100.0, 50.0);
        slow.pointer_move(101.0, 50.0);
        slow.render(0.0);

        let mut fast = renderer();
        fast.pointer_move(40.0, 50.0);
        fast.pointer_move(100.0, 50.0);
        fast.render(0.0);

        assert!(fast.alpha_at(100, 50) > slow.alpha_at(100, 50));
    }
}
