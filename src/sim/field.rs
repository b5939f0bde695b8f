//! Force fields applied to the entity pool each tick
//!
//! Two variants:
//! - Radial: pointer-centered repulsion/attraction with elastic return to base
//! - Flow: a coarse grid of fixed angles that steers entity velocities
//!
//! Neither variant scales by `dt`; one call is one fixed tick.

use glam::Vec2;

use super::entity::Entity;
use crate::config::{FlowFieldConfig, ForceMode, Polarity, RadialConfig};
use crate::math::{direction_and_distance, relax_toward};

/// Scale of the pointer push when it feeds velocity rather than position
const FLOW_POINTER_GAIN: f32 = 0.5;

/// Pointer as seen by the simulation for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub pos: Vec2,
    /// Current (possibly press-amplified) interaction radius
    pub radius: f32,
    /// Current (possibly press-amplified) strength multiplier
    pub strength: f32,
    /// Displacement since the previous tick
    pub velocity: Vec2,
}

impl Pointer {
    pub fn at(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            radius,
            strength: 1.0,
            velocity: Vec2::ZERO,
        }
    }

    /// Normalized proximity in `(0, 1]` for points inside the radius
    pub fn influence(&self, point: Vec2) -> Option<(Vec2, f32, f32)> {
        let (away, dist) = direction_and_distance(self.pos, point);
        if dist >= self.radius || self.radius <= 0.0 {
            return None;
        }
        Some((away, dist, (self.radius - dist) / self.radius))
    }
}

/// Displacement the pointer imposes on a point with the given density.
///
/// Attraction is capped at the current distance so nothing is flung past
/// the pointer.
pub fn pointer_push(point: Vec2, density: f32, pointer: &Pointer, polarity: Polarity) -> Option<Vec2> {
    let (away, dist, force) = pointer.influence(point)?;
    let magnitude = force * pointer.strength * density;
    Some(match polarity {
        Polarity::Repel => away * magnitude,
        Polarity::Attract => -away * magnitude.min(dist),
    })
}

/// Grid of fixed steering angles, rebuilt on resize
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField {
    config: FlowFieldConfig,
    cols: usize,
    rows: usize,
    angles: Vec<f32>,
}

impl FlowField {
    pub fn new(config: FlowFieldConfig, width: f32, height: f32) -> Self {
        let mut field = Self {
            config,
            cols: 0,
            rows: 0,
            angles: Vec::new(),
        };
        field.resize(width, height);
        field
    }

    /// Recompute the grid for a new surface size
    pub fn resize(&mut self, width: f32, height: f32) {
        let cell = self.config.cell_size.max(1.0);
        self.cols = ((width.max(0.0) / cell).ceil() as usize).max(1);
        self.rows = ((height.max(0.0) / cell).ceil() as usize).max(1);
        self.angles.clear();
        self.angles.reserve(self.cols * self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let a = ((col as f32 * self.config.zoom).cos()
                    + (row as f32 * self.config.zoom).sin())
                    * self.config.curve;
                self.angles.push(a);
            }
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.config.cell_size
    }

    /// Cell containing `pos`, clamped to the grid
    pub fn cell_of(&self, pos: Vec2) -> (usize, usize) {
        let cell = self.config.cell_size.max(1.0);
        let col = (pos.x / cell).floor().clamp(0.0, (self.cols - 1) as f32) as usize;
        let row = (pos.y / cell).floor().clamp(0.0, (self.rows - 1) as f32) as usize;
        (col, row)
    }

    pub fn angle_at(&self, pos: Vec2) -> f32 {
        let (col, row) = self.cell_of(pos);
        self.angles
            .get(row * self.cols + col)
            .copied()
            .unwrap_or(0.0)
    }

    /// Accelerate along the cell angle, apply friction, clamp speed
    pub fn steer(&self, entity: &mut Entity) {
        let dir = Vec2::from_angle(self.angle_at(entity.pos));
        entity.vel += dir * self.config.acceleration;
        entity.vel *= self.config.friction;
        entity.vel = entity.vel.clamp_length_max(self.config.max_speed);
    }
}

/// The configured force field for one world
#[derive(Debug, Clone, PartialEq)]
pub enum ForceField {
    Radial(RadialConfig),
    Flow(FlowField),
}

impl ForceField {
    pub fn new(mode: &ForceMode, width: f32, height: f32) -> Self {
        match mode {
            ForceMode::Radial(radial) => ForceField::Radial(*radial),
            ForceMode::FlowField(flow) => ForceField::Flow(FlowField::new(*flow, width, height)),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if let ForceField::Flow(field) = self {
            field.resize(width, height);
        }
    }

    /// Apply one tick of force to every entity. `pointer` is `None` while
    /// the pointer is off the surface; entities then fall back to idle.
    pub fn apply(&self, entities: &mut [Entity], pointer: Option<&Pointer>) {
        match self {
            ForceField::Radial(radial) => {
                for entity in entities.iter_mut() {
                    let push = pointer.and_then(|p| {
                        pointer_push(entity.pos, entity.density, p, radial.polarity)
                    });
                    match push {
                        Some(delta) => entity.pos += delta,
                        None if entity.kind.is_anchored() => {
                            entity.pos = relax_toward(entity.pos, entity.base, radial.damping);
                        }
                        None => {}
                    }
                }
            }
            ForceField::Flow(field) => {
                for entity in entities.iter_mut() {
                    let push = pointer.and_then(|p| {
                        pointer_push(entity.pos, entity.density, p, Polarity::Repel)
                    });
                    if let Some(delta) = push {
                        entity.vel += delta * FLOW_POINTER_GAIN;
                    }
                    field.steer(entity);
                }
            }
        }
    }
}
