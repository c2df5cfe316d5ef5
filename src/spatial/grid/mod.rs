//! Grid - Structure of Arrays (SoA) velocity/scalar fields
//!
//! Row 0 is the bottom of the domain (uv y points up), matching how the
//! fields are addressed in uv space. Colorize flips rows for output.
//!
//! Instead of: Vec<(f32, f32)>
//! We have:    x[], y[]  (linear memory, one component per pass)

use crate::core::Vec2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Grid dimensions in cells
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const ONE: GridSize = GridSize { width: 1, height: 1 };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width.max(1), height: height.max(1) }
    }

    /// `max(1, round(scale * dim))` per axis; NaN and negatives clamp to 1
    pub fn from_viewport(width_px: f32, height_px: f32, scale: f32) -> Self {
        Self {
            width: scaled_axis(width_px, scale),
            height: scaled_axis(height_px, scale),
        }
    }

    #[inline]
    pub fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// One cell in uv units
    #[inline]
    pub fn cell(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    /// Aspect correction applied to displacements: `max(w, h) / size`
    #[inline]
    pub fn ratio(&self) -> Vec2 {
        let m = self.width.max(self.height) as f32;
        Vec2::new(m / self.width as f32, m / self.height as f32)
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// uv of the center of cell (x, y)
    #[inline]
    pub fn texel_center(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) / self.width as f32,
            (y as f32 + 0.5) / self.height as f32,
        )
    }
}

#[inline]
fn scaled_axis(dim: f32, scale: f32) -> u32 {
    let v = (dim * scale).round();
    if v.is_finite() && v >= 1.0 {
        v.min(u32::MAX as f32) as u32
    } else {
        1
    }
}

/// Bilinear weights for a clamp-to-edge lookup at `uv`
#[derive(Clone, Copy, Debug)]
struct Taps {
    i00: usize,
    i10: usize,
    i01: usize,
    i11: usize,
    fx: f32,
    fy: f32,
}

#[inline]
fn taps(size: GridSize, uv: Vec2) -> Taps {
    let w = size.width as usize;
    let h = size.height as usize;
    let max_x = (w - 1) as f32;
    let max_y = (h - 1) as f32;
    let u = if uv.x.is_nan() { 0.0 } else { uv.x };
    let v = if uv.y.is_nan() { 0.0 } else { uv.y };
    let gx = (u * w as f32 - 0.5).clamp(0.0, max_x);
    let gy = (v * h as f32 - 0.5).clamp(0.0, max_y);
    let x0 = gx.floor() as usize;
    let y0 = gy.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    Taps {
        i00: y0 * w + x0,
        i10: y0 * w + x1,
        i01: y1 * w + x0,
        i11: y1 * w + x1,
        fx: gx - x0 as f32,
        fy: gy - y0 as f32,
    }
}

#[inline]
fn blend(data: &[f32], t: &Taps) -> f32 {
    let bottom = data[t.i00] + (data[t.i10] - data[t.i00]) * t.fx;
    let top = data[t.i01] + (data[t.i11] - data[t.i01]) * t.fx;
    bottom + (top - bottom) * t.fy
}

#[derive(Clone, Debug)]
pub struct ScalarField {
    size: GridSize,
    pub data: Vec<f32>,
}

impl ScalarField {
    pub fn new(size: GridSize) -> Self {
        Self { size, data: vec![0.0; size.cells()] }
    }

    #[inline]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[self.size.index(x, y)]
    }

    /// Neighbor read with clamped integer offsets
    #[inline]
    pub fn get_offset(&self, x: u32, y: u32, dx: i32, dy: i32) -> f32 {
        let (cx, cy) = clamp_offset(self.size, x, y, dx, dy);
        self.data[self.size.index(cx, cy)]
    }

    pub fn sample(&self, uv: Vec2) -> f32 {
        blend(&self.data, &taps(self.size, uv))
    }

    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|v| *v = 0.0);
    }
}

#[derive(Clone, Debug)]
pub struct VectorField {
    size: GridSize,
    pub x: Vec<f32>,
    pub y: Vec<f32>,
}

impl VectorField {
    pub fn new(size: GridSize) -> Self {
        let n = size.cells();
        Self { size, x: vec![0.0; n], y: vec![0.0; n] }
    }

    #[inline]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Vec2 {
        let i = self.size.index(x, y);
        Vec2::new(self.x[i], self.y[i])
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, v: Vec2) {
        let i = self.size.index(x, y);
        self.x[i] = v.x;
        self.y[i] = v.y;
    }

    #[inline]
    pub fn get_offset(&self, x: u32, y: u32, dx: i32, dy: i32) -> Vec2 {
        let (cx, cy) = clamp_offset(self.size, x, y, dx, dy);
        self.get(cx, cy)
    }

    pub fn sample(&self, uv: Vec2) -> Vec2 {
        let t = taps(self.size, uv);
        Vec2::new(blend(&self.x, &t), blend(&self.y, &t))
    }

    pub fn clear(&mut self) {
        self.x.iter_mut().for_each(|v| *v = 0.0);
        self.y.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Both components, mutably, for row kernels
    #[inline]
    pub fn components_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.x, &mut self.y)
    }

    pub fn copy_from(&mut self, other: &VectorField) {
        self.x.copy_from_slice(&other.x);
        self.y.copy_from_slice(&other.y);
    }

    pub fn max_magnitude(&self) -> f32 {
        self.x
            .iter()
            .zip(self.y.iter())
            .map(|(x, y)| (x * x + y * y).sqrt())
            .fold(0.0, f32::max)
    }

    /// Force the outer ring of cells to zero velocity (walls)
    pub fn zero_border(&mut self) {
        let w = self.size.width;
        let h = self.size.height;
        for x in 0..w {
            self.set(x, 0, Vec2::ZERO);
            self.set(x, h - 1, Vec2::ZERO);
        }
        for y in 0..h {
            self.set(0, y, Vec2::ZERO);
            self.set(w - 1, y, Vec2::ZERO);
        }
    }

    /// Copy the adjacent interior cell into the outer ring (open domain)
    pub fn extrapolate_border(&mut self) {
        let w = self.size.width;
        let h = self.size.height;
        if w < 3 || h < 3 {
            return;
        }
        for x in 0..w {
            let ix = x.clamp(1, w - 2);
            let bottom = self.get(ix, 1);
            let top = self.get(ix, h - 2);
            self.set(x, 0, bottom);
            self.set(x, h - 1, top);
        }
        for y in 1..h - 1 {
            let left = self.get(1, y);
            let right = self.get(w - 2, y);
            self.set(0, y, left);
            self.set(w - 1, y, right);
        }
    }
}

#[inline]
fn clamp_offset(size: GridSize, x: u32, y: u32, dx: i32, dy: i32) -> (u32, u32) {
    let cx = (x as i32 + dx).clamp(0, size.width as i32 - 1) as u32;
    let cy = (y as i32 + dy).clamp(0, size.height as i32 - 1) as u32;
    (cx, cy)
}

/// Run `f(row, out_row)` over every row of a buffer `width` elements wide
pub fn for_each_row<T, F>(width: usize, out: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        out.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
    #[cfg(not(feature = "parallel"))]
    {
        out.chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
}

/// Run `f(row, out_x_row, out_y_row)` over every row of a vector buffer
pub fn for_each_row2<F>(width: usize, out_x: &mut [f32], out_y: &mut [f32], f: F)
where
    F: Fn(usize, &mut [f32], &mut [f32]) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        out_x
            .par_chunks_mut(width)
            .zip(out_y.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (rx, ry))| f(y, rx, ry));
    }
    #[cfg(not(feature = "parallel"))]
    {
        out_x
            .chunks_mut(width)
            .zip(out_y.chunks_mut(width))
            .enumerate()
            .for_each(|(y, (rx, ry))| f(y, rx, ry));
    }
}
