//! Shape generation for 2D primitives
//!
//! Everything is emitted as a triangle list in surface pixel coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;
use crate::palette::Color;

/// Segment count for a circle of the given radius
pub fn segments_for(radius: f32) -> u32 {
    ((radius * 0.75) as u32).clamp(8, 64)
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::at(center, color));
        vertices.push(Vertex::at(center + Vec2::from_angle(theta1) * radius, color));
        vertices.push(Vertex::at(center + Vec2::from_angle(theta2) * radius, color));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: Color,
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let d1 = Vec2::from_angle((i as f32 / segments as f32) * 2.0 * PI);
        let d2 = Vec2::from_angle(((i + 1) as f32 / segments as f32) * 2.0 * PI);

        let inner1 = center + d1 * inner_radius;
        let outer1 = center + d1 * outer_radius;
        let inner2 = center + d2 * inner_radius;
        let outer2 = center + d2 * outer_radius;

        // Two triangles per segment
        vertices.push(Vertex::at(inner1, color));
        vertices.push(Vertex::at(outer1, color));
        vertices.push(Vertex::at(inner2, color));

        vertices.push(Vertex::at(inner2, color));
        vertices.push(Vertex::at(outer1, color));
        vertices.push(Vertex::at(outer2, color));
    }

    vertices
}

/// Disc with a radial color gradient, `inner` at the center, `outer` at the rim
pub fn radial_gradient(
    center: Vec2,
    radius: f32,
    inner: Color,
    outer: Color,
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let d1 = Vec2::from_angle((i as f32 / segments as f32) * 2.0 * PI);
        let d2 = Vec2::from_angle(((i + 1) as f32 / segments as f32) * 2.0 * PI);

        vertices.push(Vertex::at(center, inner));
        vertices.push(Vertex::at(center + d1 * radius, outer));
        vertices.push(Vertex::at(center + d2 * radius, outer));
    }

    vertices
}

/// Thick line segment as a quad
pub fn line(from: Vec2, to: Vec2, width: f32, color: Color) -> Vec<Vertex> {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);

    let a1 = from + perp;
    let a2 = from - perp;
    let b1 = to + perp;
    let b2 = to - perp;

    vec![
        Vertex::at(a1, color),
        Vertex::at(a2, color),
        Vertex::at(b1, color),
        Vertex::at(b1, color),
        Vertex::at(a2, color),
        Vertex::at(b2, color),
    ]
}

/// Fan from the vertex centroid. Correct for convex and star-shaped outlines.
pub fn polygon(points: &[Vec2], color: Color) -> Vec<Vertex> {
    if points.len() < 3 {
        return Vec::new();
    }
    let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;

    let mut vertices = Vec::with_capacity(points.len() * 3);
    for (i, p) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        vertices.push(Vertex::at(centroid, color));
        vertices.push(Vertex::at(*p, color));
        vertices.push(Vertex::at(next, color));
    }
    vertices
}

fn quadratic(p0: Vec2, c: Vec2, p1: Vec2, steps: u32, out: &mut Vec<Vec2>) {
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let u = 1.0 - t;
        out.push(p0 * (u * u) + c * (2.0 * u * t) + p1 * (t * t));
    }
}

fn cubic(p0: Vec2, c0: Vec2, c1: Vec2, p1: Vec2, steps: u32, out: &mut Vec<Vec2>) {
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let u = 1.0 - t;
        out.push(
            p0 * (u * u * u) + c0 * (3.0 * u * u * t) + c1 * (3.0 * u * t * t) + p1 * (t * t * t),
        );
    }
}

/// Batarang outline in local units (about 60 wide), centered on the origin
pub fn batarang_outline() -> Vec<Vec2> {
    const STEPS: u32 = 6;
    let v = Vec2::new;
    let mut pts = vec![v(0.0, -10.0)];
    cubic(v(0.0, -10.0), v(5.0, -15.0), v(20.0, -10.0), v(30.0, -5.0), STEPS, &mut pts);
    quadratic(v(30.0, -5.0), v(25.0, 5.0), v(30.0, 15.0), STEPS, &mut pts);
    quadratic(v(30.0, 15.0), v(15.0, 10.0), v(8.0, 12.0), STEPS, &mut pts);
    pts.push(v(0.0, 5.0));
    pts.push(v(-8.0, 12.0));
    quadratic(v(-8.0, 12.0), v(-15.0, 10.0), v(-30.0, 15.0), STEPS, &mut pts);
    quadratic(v(-30.0, 15.0), v(-25.0, 5.0), v(-30.0, -5.0), STEPS, &mut pts);
    cubic(v(-30.0, -5.0), v(-20.0, -10.0), v(-5.0, -15.0), v(0.0, -10.0), STEPS, &mut pts);
    // Last bezier point closes back onto the first
    pts.pop();
    pts
}

/// Scale, rotate and translate an outline
pub fn transform(points: &[Vec2], at: Vec2, scale: f32, rotation: f32) -> Vec<Vec2> {
    let rot = Vec2::from_angle(rotation);
    points.iter().map(|p| at + rot.rotate(*p * scale)).collect()
}
