//! Viscosity - implicit diffusion by Jacobi relaxation
//!
//! Each sweep solves `4·v = 4·v_old + ν·dt·Σ v(±2 cells)` normalized by
//! `4·(1 + ν·dt)`, alternating between the two scratch buffers.

use crate::spatial::buffers::PingPong;
use crate::spatial::grid::{for_each_row2, VectorField};

/// One Jacobi sweep from `guess` into `out`
fn relax(old: &VectorField, guess: &VectorField, out: &mut VectorField, nu_dt: f32) {
    let size = old.size();
    let width = size.width as usize;
    let denom = 4.0 * (1.0 + nu_dt);
    let (out_x, out_y) = out.components_mut();

    for_each_row2(width, out_x, out_y, |y, row_x, row_y| {
        let y = y as u32;
        for x in 0..width {
            let xi = x as u32;
            let sum = guess.get_offset(xi, y, 2, 0)
                + guess.get_offset(xi, y, -2, 0)
                + guess.get_offset(xi, y, 0, 2)
                + guess.get_offset(xi, y, 0, -2);
            let v = (old.get(xi, y) * 4.0 + sum * nu_dt) / denom;
            row_x[x] = v.x;
            row_y[x] = v.y;
        }
    });
}

/// Diffuse `old` into `scratch`; the result is `scratch.front()`
pub fn diffuse(
    old: &VectorField,
    scratch: &mut PingPong<VectorField>,
    viscosity: f32,
    dt: f32,
    iterations: u32,
) {
    scratch.front_mut().copy_from(old);
    let nu_dt = viscosity * dt;
    for _ in 0..iterations {
        let (guess, out) = scratch.split();
        relax(old, guess, out, nu_dt);
        scratch.swap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec2;
    use crate::spatial::grid::GridSize;

    #[test]
    fn zero_iterations_is_identity() {
        let size = GridSize::new(8, 8);
        let mut old = VectorField::new(size);
        old.set(3, 3, Vec2::new(1.0, 0.0));
        let mut scratch = PingPong::vector(size);
        diffuse(&old, &mut scratch, 30.0, 0.014, 0);
        assert_eq!(scratch.front().get(3, 3), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn spike_spreads_out() {
        let size = GridSize::new(16, 16);
        let mut old = VectorField::new(size);
        old.set(8, 8, Vec2::new(1.0, 0.0));
        let mut scratch = PingPong::vector(size);
        diffuse(&old, &mut scratch, 30.0, 0.014, 32);
        let out = scratch.front();
        assert!(out.get(8, 8).x < 1.0);
        assert!(out.get(10, 8).x > 0.0);
        assert!(out.get(8, 6).x > 0.0);
    }
}
