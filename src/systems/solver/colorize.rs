//! Colorize - velocity magnitude to straight-alpha RGBA8
//!
//! `len = clamp(|v|, 0, 1)`, color = palette(len), alpha = len.
//! Output rows run top-down (row 0 of the field is the bottom).

use crate::domain::palette::Palette;
use crate::spatial::grid::{for_each_row, VectorField};

pub fn colorize(vel: &VectorField, palette: &Palette, out: &mut [u8]) {
    let size = vel.size();
    let width = size.width as usize;
    let height = size.height as usize;
    debug_assert_eq!(out.len(), size.cells() * 4, "colorize: wrong output length");

    for_each_row(width * 4, out, |row, pixels| {
        let y = (height - 1 - row) as u32;
        for (x, px) in pixels.chunks_exact_mut(4).enumerate() {
            let len = vel.get(x as u32, y).length();
            let len = if len.is_finite() { len.clamp(0.0, 1.0) } else { 0.0 };
            let [r, g, b] = palette.lookup(len);
            px[0] = r;
            px[1] = g;
            px[2] = b;
            px[3] = (len * 255.0).round() as u8;
        }
    });
}
