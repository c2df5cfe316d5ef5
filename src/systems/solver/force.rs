//! External force - additive splat of pointer motion into the velocity field

use crate::core::Vec2;
use crate::spatial::grid::VectorField;

/// What the pointer contributes this frame, in NDC
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForceInput {
    pub coords: Vec2,
    pub diff: Vec2,
}

/// Footprint center, kept far enough from the walls that the whole square
/// plus two cells of margin fits. Collapses to 0 when it cannot fit.
#[inline]
pub fn clamp_center(c: f32, half: f32, cell: f32) -> f32 {
    let lo = -1.0 + half + cell * 2.0;
    let hi = 1.0 - half - cell * 2.0;
    if lo > hi {
        0.0
    } else {
        c.clamp(lo, hi)
    }
}

/// Falloff inside the footprint: `(1 - min(|local|, 1))²`
#[inline]
pub fn falloff(local: Vec2) -> f32 {
    let d = 1.0 - local.length().min(1.0);
    d * d
}

/// Add `diff / 2 * mouse_force` weighted by the falloff over a square of
/// half-extent `cursor_size * cell` around the clamped pointer
pub fn apply_force(field: &mut VectorField, input: ForceInput, mouse_force: f32, cursor_size: f32) {
    let force = input.diff / 2.0 * mouse_force;
    if force.is_origin() || !force.is_finite() || !input.coords.is_finite() {
        return;
    }

    let size = field.size();
    let cell = size.cell();
    let half = cell * cursor_size;
    if half.x <= 0.0 || half.y <= 0.0 {
        return;
    }
    let center = Vec2::new(
        clamp_center(input.coords.x, half.x, cell.x),
        clamp_center(input.coords.y, half.y, cell.y),
    );

    // NDC -> cell index range covering the footprint
    let w = size.width as f32;
    let h = size.height as f32;
    let x0 = (((center.x - half.x + 1.0) * 0.5 * w) - 0.5).floor().max(0.0) as u32;
    let x1 = (((center.x + half.x + 1.0) * 0.5 * w) - 0.5).ceil().min(w - 1.0).max(0.0) as u32;
    let y0 = (((center.y - half.y + 1.0) * 0.5 * h) - 0.5).floor().max(0.0) as u32;
    let y1 = (((center.y + half.y + 1.0) * 0.5 * h) - 0.5).ceil().min(h - 1.0).max(0.0) as u32;

    for y in y0..=y1 {
        let ndc_y = (y as f32 + 0.5) / h * 2.0 - 1.0;
        for x in x0..=x1 {
            let ndc_x = (x as f32 + 0.5) / w * 2.0 - 1.0;
            let local = Vec2::new((ndc_x - center.x) / half.x, (ndc_y - center.y) / half.y);
            if local.x.abs() > 1.0 || local.y.abs() > 1.0 {
                continue;
            }
            let weight = falloff(local);
            if weight <= 0.0 {
                continue;
            }
            let v = field.get(x, y) + force * weight;
            field.set(x, y, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::grid::GridSize;

    #[test]
    fn center_clamp_keeps_margin() {
        // cell 0.01, half 0.2 -> range [-0.78, 0.78]
        assert!((clamp_center(1.0, 0.2, 0.01) - 0.78).abs() < 1e-6);
        assert!((clamp_center(-1.0, 0.2, 0.01) + 0.78).abs() < 1e-6);
        assert_eq!(clamp_center(0.3, 0.2, 0.01), 0.3);
        assert_eq!(clamp_center(0.9, 1.5, 0.01), 0.0);
    }

    #[test]
    fn falloff_peaks_at_center() {
        assert_eq!(falloff(Vec2::ZERO), 1.0);
        assert_eq!(falloff(Vec2::new(1.0, 0.0)), 0.0);
        assert!((falloff(Vec2::new(0.5, 0.0)) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn zero_diff_adds_nothing() {
        let mut f = VectorField::new(GridSize::new(64, 64));
        apply_force(&mut f, ForceInput { coords: Vec2::ZERO, diff: Vec2::ZERO }, 20.0, 10.0);
        assert_eq!(f.max_magnitude(), 0.0);
    }

    #[test]
    fn splat_points_along_motion() {
        let size = GridSize::new(64, 64);
        let mut f = VectorField::new(size);
        let input = ForceInput { coords: Vec2::ZERO, diff: Vec2::new(0.1, 0.0) };
        apply_force(&mut f, input, 20.0, 10.0);
        // center of the grid receives close to the full force (0.05 * 20 = 1)
        let v = f.get(32, 32);
        assert!(v.x > 0.5 && v.x <= 1.0);
        assert_eq!(v.y, 0.0);
        // far corner untouched
        assert_eq!(f.get(0, 0), Vec2::ZERO);
    }
}
