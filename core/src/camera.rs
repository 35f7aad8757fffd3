//! Scrolling camera that maps world coordinates onto the screen.

use crate::WorldPoint;

/// Logical render target dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Width of the render target.
    pub width: f64,
    /// Height of the render target.
    pub height: f64,
}

impl Viewport {
    /// Fixed logical resolution the game is designed for.
    pub const LOGICAL: Self = Self::new(1000.0, 600.0);

    /// Creates a viewport with explicit dimensions.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::LOGICAL
    }
}

/// World-to-screen offset tracking the vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Camera {
    /// World x-coordinate drawn at the left edge of the screen.
    pub x: f64,
    /// World y-coordinate drawn at the bottom edge of the screen.
    pub y: f64,
    viewport: Viewport,
}

impl Camera {
    /// Derives the camera that keeps the vehicle one third from the left edge
    /// and vertically centred.
    ///
    /// The horizontal offset never becomes negative, so the start of the track
    /// stays pinned to the left edge until the vehicle has travelled a third of
    /// the viewport.
    #[must_use]
    pub fn recompute(vehicle: WorldPoint, viewport: Viewport) -> Self {
        Self {
            x: (vehicle.x - viewport.width / 3.0).max(0.0),
            y: vehicle.y - viewport.height / 2.0,
            viewport,
        }
    }

    /// Projects a world point to screen pixels; the y-axis is inverted so
    /// larger world heights are drawn nearer the top of the screen.
    #[must_use]
    pub fn project(&self, point: WorldPoint) -> (f64, f64) {
        (
            point.x - self.x,
            self.viewport.height - (point.y - self.y),
        )
    }

    /// Inclusive range of world x-coordinates visible on screen.
    #[must_use]
    pub fn visible_span(&self) -> (f64, f64) {
        (self.x, self.x + self.viewport.width)
    }
}
