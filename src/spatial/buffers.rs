//! Buffers - explicit double buffering for the solver
//!
//! A `PingPong` hands out the read side and the write side as two borrows
//! of distinct elements, so a stage can never read the buffer it writes.

use super::grid::{GridSize, ScalarField, VectorField};

#[derive(Clone, Debug)]
pub struct PingPong<T> {
    bufs: [T; 2],
    front: usize,
}

impl<T> PingPong<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { bufs: [a, b], front: 0 }
    }

    /// Buffer holding the latest result
    #[inline]
    pub fn front(&self) -> &T {
        &self.bufs[self.front]
    }

    #[inline]
    pub fn front_mut(&mut self) -> &mut T {
        &mut self.bufs[self.front]
    }

    #[inline]
    pub fn back_mut(&mut self) -> &mut T {
        &mut self.bufs[1 - self.front]
    }

    /// `(read, write)` = `(front, back)`
    #[inline]
    pub fn split(&mut self) -> (&T, &mut T) {
        let (a, b) = self.bufs.split_at_mut(1);
        if self.front == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    /// Publish the back buffer as the new front
    #[inline]
    pub fn swap(&mut self) {
        self.front = 1 - self.front;
    }

    /// Number of swaps mod 2
    #[inline]
    pub fn generation(&self) -> usize {
        self.front
    }
}

impl PingPong<VectorField> {
    pub fn vector(size: GridSize) -> Self {
        Self::new(VectorField::new(size), VectorField::new(size))
    }
}

impl PingPong<ScalarField> {
    pub fn scalar(size: GridSize) -> Self {
        Self::new(ScalarField::new(size), ScalarField::new(size))
    }
}

/// Named storage slots of the solver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Velocity,
    Viscous,
    Divergence,
    Pressure,
}

/// Every field the solver owns, sized together
#[derive(Clone, Debug)]
pub struct FieldArena {
    size: GridSize,
    pub velocity: PingPong<VectorField>,
    pub viscous: PingPong<VectorField>,
    pub pressure: PingPong<ScalarField>,
    pub divergence: ScalarField,
}

impl FieldArena {
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            velocity: PingPong::vector(size),
            viscous: PingPong::vector(size),
            pressure: PingPong::scalar(size),
            divergence: ScalarField::new(size),
        }
    }

    #[inline]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Reallocate all slots; previous contents are discarded
    pub fn resize(&mut self, size: GridSize) {
        *self = FieldArena::new(size);
    }

    /// Approximate heap footprint in bytes
    pub fn memory_bytes(&self) -> usize {
        // 2 vector pairs (4 comps each side) + pressure pair + divergence
        self.size.cells() * std::mem::size_of::<f32>() * (8 + 2 + 1)
    }
}
