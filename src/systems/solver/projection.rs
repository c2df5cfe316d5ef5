//! Projection - divergence, pressure Poisson solve, gradient subtraction
//!
//! Divergence and gradient are central differences over ±1 cell; the
//! Poisson sweep uses the matching ±2 cell stencil. Pressure is transient
//! and starts from zero every frame.

use crate::spatial::buffers::PingPong;
use crate::spatial::grid::{for_each_row, for_each_row2, ScalarField, VectorField};

/// `div = (x(+1) - x(-1) + y(+1) - y(-1)) / 2 / dt`
pub fn divergence(vel: &VectorField, out: &mut ScalarField, dt: f32) {
    let size = vel.size();
    let width = size.width as usize;
    let inv = 1.0 / (2.0 * dt);

    for_each_row(width, &mut out.data, |y, row| {
        let y = y as u32;
        for (x, cell) in row.iter_mut().enumerate() {
            let x = x as u32;
            let x0 = vel.get_offset(x, y, -1, 0).x;
            let x1 = vel.get_offset(x, y, 1, 0).x;
            let y0 = vel.get_offset(x, y, 0, -1).y;
            let y1 = vel.get_offset(x, y, 0, 1).y;
            *cell = (x1 - x0 + y1 - y0) * inv;
        }
    });
}

fn poisson_sweep(guess: &ScalarField, div: &ScalarField, out: &mut ScalarField) {
    let width = div.size().width as usize;
    for_each_row(width, &mut out.data, |y, row| {
        let y = y as u32;
        for (x, cell) in row.iter_mut().enumerate() {
            let x = x as u32;
            let sum = guess.get_offset(x, y, 2, 0)
                + guess.get_offset(x, y, -2, 0)
                + guess.get_offset(x, y, 0, 2)
                + guess.get_offset(x, y, 0, -2);
            *cell = sum / 4.0 - div.get(x, y);
        }
    });
}

/// Jacobi solve; the result is `pressure.front()`
pub fn solve_pressure(div: &ScalarField, pressure: &mut PingPong<ScalarField>, iterations: u32) {
    pressure.front_mut().clear();
    pressure.back_mut().clear();
    for _ in 0..iterations {
        let (guess, out) = pressure.split();
        poisson_sweep(guess, div, out);
        pressure.swap();
    }
}

/// `v -= (p(+1) - p(-1)) / 2 * dt`
pub fn subtract_gradient(pressure: &ScalarField, vel: &VectorField, out: &mut VectorField, dt: f32) {
    let width = vel.size().width as usize;
    let (out_x, out_y) = out.components_mut();

    for_each_row2(width, out_x, out_y, |y, row_x, row_y| {
        let y = y as u32;
        for x in 0..width {
            let xi = x as u32;
            let gx = (pressure.get_offset(xi, y, 1, 0) - pressure.get_offset(xi, y, -1, 0)) * 0.5;
            let gy = (pressure.get_offset(xi, y, 0, 1) - pressure.get_offset(xi, y, 0, -1)) * 0.5;
            let v = vel.get(xi, y);
            row_x[x] = v.x - gx * dt;
            row_y[x] = v.y - gy * dt;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec2;
    use crate::spatial::grid::GridSize;

    #[test]
    fn uniform_flow_has_no_divergence() {
        let size = GridSize::new(8, 8);
        let mut vel = VectorField::new(size);
        vel.x.iter_mut().for_each(|c| *c = 0.5);
        let mut div = ScalarField::new(size);
        divergence(&vel, &mut div, 0.014);
        assert!(div.data.iter().all(|d| *d == 0.0));
    }

    #[test]
    fn source_has_positive_divergence() {
        let size = GridSize::new(8, 8);
        let mut vel = VectorField::new(size);
        vel.set(5, 4, Vec2::new(1.0, 0.0));
        vel.set(3, 4, Vec2::new(-1.0, 0.0));
        let mut div = ScalarField::new(size);
        divergence(&vel, &mut div, 0.5);
        assert_eq!(div.get(4, 4), 2.0);
    }

    #[test]
    fn pressure_resets_each_solve() {
        let size = GridSize::new(8, 8);
        let div = ScalarField::new(size);
        let mut p = PingPong::scalar(size);
        p.front_mut().data.iter_mut().for_each(|v| *v = 9.0);
        solve_pressure(&div, &mut p, 4);
        assert!(p.front().data.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn projection_reduces_divergence() {
        let size = GridSize::new(24, 24);
        let dt = 0.014;
        let mut vel = VectorField::new(size);
        for y in 10..14 {
            for x in 10..14 {
                vel.set(x, y, Vec2::new(if x < 12 { -1.0 } else { 1.0 }, 0.0));
            }
        }
        let mut div = ScalarField::new(size);
        divergence(&vel, &mut div, dt);
        let before: f32 = div.data.iter().map(|d| d * d).sum();

        let mut p = PingPong::scalar(size);
        solve_pressure(&div, &mut p, 32);
        let mut out = VectorField::new(size);
        subtract_gradient(p.front(), &vel, &mut out, dt);

        divergence(&out, &mut div, dt);
        let after: f32 = div.data.iter().map(|d| d * d).sum();
        assert!(after < before);
    }
}
