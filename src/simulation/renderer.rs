//! Renderer seam between the engine and whichever tier is active

use crate::spatial::grid::GridSize;
use crate::systems::solver::FluidSolver;
use crate::systems::trail::TrailRenderer;

/// Container size in CSS pixels plus the clamped device pixel ratio
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub css_width: f32,
    pub css_height: f32,
    pub dpr: f32,
}

impl Viewport {
    pub const EMPTY: Viewport = Viewport { css_width: 0.0, css_height: 0.0, dpr: 1.0 };

    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.css_width >= 1.0 && self.css_height >= 1.0
    }

    /// Backing-store size of the presentation canvas
    pub fn device_size(&self) -> (u32, u32) {
        let px = |css: f32| (css * self.dpr).floor().max(1.0) as u32;
        (px(self.css_width), px(self.css_height))
    }
}

pub trait Renderer {
    /// Reallocate for a new viewport; returns whether storage changed
    fn resize(&mut self, viewport: &Viewport) -> bool;
    /// Straight-alpha RGBA8, top-down rows
    fn pixels(&self) -> &[u8];
    fn surface_size(&self) -> (u32, u32);
    fn memory_bytes(&self) -> usize;
}

impl Renderer for FluidSolver {
    fn resize(&mut self, viewport: &Viewport) -> bool {
        let size = GridSize::from_viewport(viewport.css_width, viewport.css_height, self.params().resolution);
        FluidSolver::resize(self, size)
    }

    fn pixels(&self) -> &[u8] {
        FluidSolver::pixels(self)
    }

    fn surface_size(&self) -> (u32, u32) {
        let size = self.size();
        (size.width, size.height)
    }

    fn memory_bytes(&self) -> usize {
        FluidSolver::memory_bytes(self)
    }
}

impl Renderer for TrailRenderer {
    fn resize(&mut self, viewport: &Viewport) -> bool {
        let before = self.size();
        TrailRenderer::resize(self, viewport.css_width, viewport.css_height, viewport.dpr) != before
    }

    fn pixels(&self) -> &[u8] {
        TrailRenderer::pixels(self)
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size()
    }

    fn memory_bytes(&self) -> usize {
        TrailRenderer::memory_bytes(self)
    }
}

/// The renderer for the engine's current tier
pub enum ActiveRenderer {
    Fluid(FluidSolver),
    Trail(TrailRenderer),
    /// Disabled tier or disposed engine
    Inert,
}

impl ActiveRenderer {
    fn as_renderer(&self) -> Option<&dyn Renderer> {
        match self {
            ActiveRenderer::Fluid(s) => Some(s),
            ActiveRenderer::Trail(t) => Some(t),
            ActiveRenderer::Inert => None,
        }
    }

    pub fn is_inert(&self) -> bool {
        matches!(self, ActiveRenderer::Inert)
    }
}

impl Renderer for ActiveRenderer {
    fn resize(&mut self, viewport: &Viewport) -> bool {
        match self {
            ActiveRenderer::Fluid(s) => Renderer::resize(s, viewport),
            ActiveRenderer::Trail(t) => Renderer::resize(t, viewport),
            ActiveRenderer::Inert => false,
        }
    }

    fn pixels(&self) -> &[u8] {
        self.as_renderer().map(|r| r.pixels()).unwrap_or(&[])
    }

    fn surface_size(&self) -> (u32, u32) {
        self.as_renderer().map(|r| r.surface_size()).unwrap_or((0, 0))
    }

    fn memory_bytes(&self) -> usize {
        self.as_renderer().map(|r| r.memory_bytes()).unwrap_or(0)
    }
}
