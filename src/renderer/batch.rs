//! CPU shape batch
//!
//! A [`Surface`] that tessellates every draw call into one triangle list.
//! The WebGPU surface presents a batch each frame; on native and in tests
//! the batch itself is the surface.

use glam::Vec2;

use super::shapes;
use super::surface::Surface;
use super::vertex::Vertex;
use crate::error::SurfaceError;
use crate::palette::{Color, TRANSPARENT};

/// Text is not tessellated; it is collected for an overlay to draw
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub at: Vec2,
    pub size: f32,
    pub rotation: f32,
    pub color: Color,
}

/// Per-frame draw call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub clears: u32,
    pub fades: u32,
    pub circles: u32,
    pub rings: u32,
    pub glows: u32,
    pub lines: u32,
    pub polygons: u32,
    pub texts: u32,
}

impl DrawStats {
    pub fn total(&self) -> u32 {
        self.clears
            + self.fades
            + self.circles
            + self.rings
            + self.glows
            + self.lines
            + self.polygons
            + self.texts
    }
}

#[derive(Debug, Clone)]
pub struct ShapeBatch {
    size: Vec2,
    clear_color: Color,
    vertices: Vec<Vertex>,
    texts: Vec<TextRun>,
    stats: DrawStats,
    frames: u64,
    in_frame: bool,
}

impl ShapeBatch {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            clear_color: TRANSPARENT,
            vertices: Vec::new(),
            texts: Vec::new(),
            stats: DrawStats::default(),
            frames: 0,
            in_frame: false,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn texts(&self) -> &[TextRun] {
        &self.texts
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn stats(&self) -> DrawStats {
        self.stats
    }

    /// Completed frames
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn extend(&mut self, vertices: Vec<Vertex>) {
        self.vertices.extend(vertices);
    }
}

impl Surface for ShapeBatch {
    fn begin_frame(&mut self) -> Result<(), SurfaceError> {
        self.vertices.clear();
        self.texts.clear();
        self.stats = DrawStats::default();
        self.in_frame = true;
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), SurfaceError> {
        if self.in_frame {
            self.frames += 1;
            self.in_frame = false;
        }
        Ok(())
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    fn clear(&mut self, color: Color) {
        self.vertices.clear();
        self.texts.clear();
        self.clear_color = color;
        self.stats.clears += 1;
    }

    /// Batches do not keep the previous frame, so a fade becomes an opaque clear
    fn fade(&mut self, color: Color) {
        self.vertices.clear();
        self.texts.clear();
        self.clear_color = [color[0], color[1], color[2], 1.0];
        self.stats.fades += 1;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        self.extend(shapes::circle(center, radius, color, shapes::segments_for(radius)));
        self.stats.circles += 1;
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        if radius <= 0.0 || width <= 0.0 {
            return;
        }
        let half = width * 0.5;
        self.extend(shapes::ring(
            center,
            (radius - half).max(0.0),
            radius + half,
            color,
            shapes::segments_for(radius),
        ));
        self.stats.rings += 1;
    }

    fn glow(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) {
        if radius <= 0.0 {
            return;
        }
        self.extend(shapes::radial_gradient(
            center,
            radius,
            inner,
            outer,
            shapes::segments_for(radius),
        ));
        self.stats.glows += 1;
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.extend(shapes::line(from, to, width, color));
        self.stats.lines += 1;
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.extend(shapes::polygon(points, color));
        self.stats.polygons += 1;
    }

    fn text(&mut self, text: &str, at: Vec2, size: f32, rotation: f32, color: Color) {
        self.texts.push(TextRun {
            text: text.to_string(),
            at,
            size,
            rotation,
            color,
        });
        self.stats.texts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_discards_earlier_draws() {
        let mut batch = ShapeBatch::new(100.0, 100.0);
        batch.begin_frame().expect("begin");
        batch.fill_circle(Vec2::splat(50.0), 10.0, [1.0; 4]);
        batch.text("HA HA", Vec2::ZERO, 20.0, 0.0, [1.0; 4]);
        batch.clear([0.0, 0.0, 0.0, 1.0]);
        assert!(batch.vertices().is_empty());
        assert!(batch.texts().is_empty());
        assert_eq!(batch.clear_color(), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_fade_is_opaque_clear() {
        let mut batch = ShapeBatch::new(100.0, 100.0);
        batch.fade([0.1, 0.2, 0.3, 0.1]);
        assert_eq!(batch.clear_color(), [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(batch.stats().fades, 1);
    }

    #[test]
    fn test_begin_frame_resets_stats() {
        let mut batch = ShapeBatch::new(100.0, 100.0);
        batch.begin_frame().expect("begin");
        batch.line(Vec2::ZERO, Vec2::ONE, 1.0, [1.0; 4]);
        batch.fill_rect(Vec2::ZERO, Vec2::ONE, [1.0; 4]);
        assert_eq!(batch.stats().total(), 2);
        batch.end_frame().expect("end");
        batch.begin_frame().expect("begin");
        assert_eq!(batch.stats(), DrawStats::default());
        assert_eq!(batch.frames(), 1);
    }

    #[test]
    fn test_zero_radius_draws_nothing() {
        let mut batch = ShapeBatch::new(100.0, 100.0);
        batch.fill_circle(Vec2::ZERO, 0.0, [1.0; 4]);
        batch.glow(Vec2::ZERO, -1.0, [1.0; 4], TRANSPARENT);
        assert!(batch.vertices().is_empty());
        assert_eq!(batch.stats().total(), 0);
    }
}
