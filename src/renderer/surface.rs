//! Drawing surface abstraction
//!
//! The engine renders exclusively through this trait. Coordinates are
//! surface pixels with the origin at the top-left and y pointing down.

use glam::Vec2;

use crate::error::SurfaceError;
use crate::palette::Color;

pub trait Surface {
    /// Called once before any drawing in a tick
    fn begin_frame(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }

    /// Called once after the last draw call of a tick. Presenting surfaces
    /// submit here and report loss or unavailability.
    fn end_frame(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }

    /// Current size in pixels
    fn size(&self) -> Vec2;

    /// Reconfigure after a host resize or a lost surface
    fn resize(&mut self, width: f32, height: f32);

    /// Replace every pixel with `color`
    fn clear(&mut self, color: Color);

    /// Blend `color` over the whole surface, leaving a fading trail of the
    /// previous frame. Surfaces that cannot preserve contents clear instead.
    fn fade(&mut self, color: Color) {
        self.clear(color);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);

    /// Radial gradient disc from `inner` at the center to `outer` at `radius`
    fn glow(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color);

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    /// Filled star-shaped outline (fan from the vertex centroid)
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);

    /// Axis-aligned filled rectangle
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        let points = [
            origin,
            origin + Vec2::new(size.x, 0.0),
            origin + size,
            origin + Vec2::new(0.0, size.y),
        ];
        self.fill_polygon(&points, color);
    }

    /// Text anchored at its baseline center, rotated by `rotation` radians
    fn text(&mut self, text: &str, at: Vec2, size: f32, rotation: f32, color: Color);
}
