//! Advection - semi-Lagrangian transport of the velocity field by itself
//!
//! Displacements are in uv units scaled by the grid aspect ratio so a unit
//! velocity covers the same distance along both axes.

use crate::core::Vec2;
use crate::spatial::grid::{for_each_row2, VectorField};

/// Trace one cell back along the velocity and sample there
#[inline]
fn trace_back(src: &VectorField, uv: Vec2, step: Vec2) -> Vec2 {
    let vel = src.sample(uv);
    src.sample(uv - vel.mul_elem(step))
}

/// Back-and-forth error compensation: advect back, forward again, and
/// correct the start point by half the round-trip error before the real trace
#[inline]
fn trace_bfecc(src: &VectorField, uv: Vec2, step: Vec2) -> Vec2 {
    let vel_old = src.sample(uv);
    let spot_old = uv - vel_old.mul_elem(step);
    let vel_new = src.sample(spot_old);
    let spot_round_trip = spot_old + vel_new.mul_elem(step);
    let error = spot_round_trip - uv;
    let spot_corrected = uv - error / 2.0;
    let vel_corrected = src.sample(spot_corrected);
    src.sample(spot_corrected - vel_corrected.mul_elem(step))
}

pub fn advect(src: &VectorField, dst: &mut VectorField, dt: f32, bfecc: bool) {
    let size = src.size();
    debug_assert_eq!(size, dst.size(), "advect: mismatched fields");
    let step = size.ratio() * dt;
    let width = size.width as usize;
    let (out_x, out_y) = dst.components_mut();

    for_each_row2(width, out_x, out_y, |y, row_x, row_y| {
        for x in 0..width {
            let uv = size.texel_center(x as u32, y as u32);
            let v = if bfecc {
                trace_bfecc(src, uv, step)
            } else {
                trace_back(src, uv, step)
            };
            row_x[x] = v.x;
            row_y[x] = v.y;
        }
    });
}
