//! Steady-state entity record
//!
//! One record shape for every visual category: a shared base (position,
//! velocity, radius, color) plus a category payload in [`EntityKind`].

use glam::Vec2;

use crate::config::EntityStyle;
use crate::palette::Color;

/// Category-specific state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    /// Anchored star; elastic return to `Entity::base`
    Star,
    /// Free-moving point that bounces off the surface edges
    Drifter,
    /// Falling streak of the given length
    Raindrop { length: f32 },
    /// Rising candle with horizontal sway
    Candle {
        height: f32,
        sway: f32,
        sway_phase: f32,
        flicker: f32,
    },
    /// Flow-field follower
    FlowParticle,
}

impl EntityKind {
    pub fn style(&self) -> EntityStyle {
        match self {
            EntityKind::Star => EntityStyle::Star,
            EntityKind::Drifter => EntityStyle::Drifter,
            EntityKind::Raindrop { .. } => EntityStyle::Raindrop,
            EntityKind::Candle { .. } => EntityStyle::Candle,
            EntityKind::FlowParticle => EntityStyle::FlowParticle,
        }
    }

    /// Whether the entity has a base position it relaxes back to
    pub fn is_anchored(&self) -> bool {
        matches!(self, EntityKind::Star)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub pos: Vec2,
    /// Per-tick displacement (px/tick)
    pub vel: Vec2,
    /// Rest position for anchored kinds
    pub base: Vec2,
    pub radius: f32,
    /// Pointer push multiplier ("mass" in reverse)
    pub density: f32,
    pub color: Color,
    /// Extra brightness applied at draw time (pointer glow on raindrops)
    pub glow: f32,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(pos: Vec2, radius: f32, color: Color, kind: EntityKind) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            base: pos,
            radius,
            density: 1.0,
            color,
            glow: 0.0,
            kind,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn is_finite(&self) -> bool {
        crate::math::is_finite(self.pos) && crate::math::is_finite(self.vel)
    }

    /// True when the entity lies inside `[-margin, size + margin]` on both axes
    pub fn within(&self, size: Vec2, margin: f32) -> bool {
        self.pos.x >= -margin
            && self.pos.y >= -margin
            && self.pos.x <= size.x + margin
            && self.pos.y <= size.y + margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_rests_at_base() {
        let e = Entity::new(Vec2::new(10.0, 20.0), 2.0, [1.0; 4], EntityKind::Star);
        assert_eq!(e.pos, e.base);
        assert_eq!(e.vel, Vec2::ZERO);
        assert!(e.kind.is_anchored());
        assert_eq!(e.kind.style(), EntityStyle::Star);
    }

    #[test]
    fn test_within_margin() {
        let e = Entity::new(Vec2::new(-5.0, 50.0), 1.0, [1.0; 4], EntityKind::Drifter);
        let size = Vec2::new(100.0, 100.0);
        assert!(!e.within(size, 0.0));
        assert!(e.within(size, 10.0));
    }

    #[test]
    fn test_non_finite_detected() {
        let e = Entity::new(Vec2::ZERO, 1.0, [1.0; 4], EntityKind::FlowParticle)
            .with_velocity(Vec2::new(f32::NAN, 0.0));
        assert!(!e.is_finite());
    }
}
