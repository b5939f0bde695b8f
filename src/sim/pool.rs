//! Entity pool
//!
//! Fixed-size storage for the steady-state entities. The pool is seeded on
//! start and on resize; during steady state entities are only ever recycled
//! in place, never added or removed.

use glam::Vec2;
use rand::Rng;

use super::entity::{Entity, EntityKind};
use super::silhouette::SilhouetteMask;
use crate::config::{EntityStyle, PopulationConfig};
use crate::palette::Palette;

/// Depth of the band below the bottom edge that candles respawn in
const CANDLE_SPAWN_MARGIN: f32 = 200.0;

/// Everything needed to (re)create one entity
pub struct Spawner<'a> {
    pub population: &'a PopulationConfig,
    pub palette: &'a Palette,
    pub mask: Option<&'a SilhouetteMask>,
    pub size: Vec2,
}

impl Spawner<'_> {
    /// Position for a fresh entity: inside the silhouette if any, else uniform
    fn place<R: Rng>(&self, rng: &mut R) -> Vec2 {
        match self.mask {
            Some(mask) => mask.sample(rng),
            None => Vec2::new(
                rng.random::<f32>() * self.size.x,
                rng.random::<f32>() * self.size.y,
            ),
        }
    }

    /// A new entity anywhere on the surface
    pub fn spawn<R: Rng>(&self, rng: &mut R) -> Entity {
        let pos = self.place(rng);
        self.build(pos, rng)
    }

    /// A replacement for an entity that left the scene. Falling and rising
    /// styles come back at the edge they enter from.
    pub fn respawn<R: Rng>(&self, rng: &mut R) -> Entity {
        let mut entity = self.spawn(rng);
        match entity.kind {
            EntityKind::Raindrop { length } => {
                entity.pos.y = -length;
            }
            EntityKind::Candle { .. } => {
                entity.pos.y = self.size.y + rng.random::<f32>() * CANDLE_SPAWN_MARGIN;
            }
            _ => {}
        }
        entity.base = entity.pos;
        entity
    }

    fn build<R: Rng>(&self, pos: Vec2, rng: &mut R) -> Entity {
        let pop = self.population;
        let radius = pop.radius.sample(rng);
        let color = self.palette.pick_entity(rng);
        let density = pop.density.sample(rng);

        match pop.style {
            EntityStyle::Star => {
                Entity::new(pos, radius, color, EntityKind::Star).with_density(density)
            }
            EntityStyle::Drifter => {
                let speed = pop.speed.sample(rng);
                let angle = rng.random::<f32>() * std::f32::consts::TAU;
                Entity::new(pos, radius, color, EntityKind::Drifter)
                    .with_velocity(Vec2::from_angle(angle) * speed)
                    .with_density(density)
            }
            EntityStyle::Raindrop => {
                let length = pop.length.sample(rng);
                let speed = pop.speed.sample(rng);
                Entity::new(pos, radius, color, EntityKind::Raindrop { length })
                    .with_velocity(Vec2::new(0.0, speed))
                    .with_density(density)
            }
            EntityStyle::Candle => {
                let height = pop.length.sample(rng);
                let speed = pop.speed.sample(rng);
                let kind = EntityKind::Candle {
                    height,
                    sway: rng.random::<f32>() * 0.02,
                    sway_phase: rng.random::<f32>() * std::f32::consts::TAU,
                    flicker: rng.random::<f32>(),
                };
                Entity::new(pos, radius, color, kind)
                    .with_velocity(Vec2::new(0.0, -speed))
                    .with_density(density)
            }
            EntityStyle::FlowParticle => {
                let speed = pop.speed.sample(rng);
                let angle = rng.random::<f32>() * std::f32::consts::TAU;
                Entity::new(pos, radius, color, EntityKind::FlowParticle)
                    .with_velocity(Vec2::from_angle(angle) * speed)
                    .with_density(density)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityPool {
    entities: Vec<Entity>,
}

impl EntityPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pool contents with `count` fresh entities
    pub fn initialize<R: Rng>(&mut self, count: usize, spawner: &Spawner<'_>, rng: &mut R) {
        self.entities.clear();
        self.entities.reserve(count);
        for _ in 0..count {
            self.entities.push(spawner.spawn(rng));
        }
    }

    /// Reinitialize a single entity in place. Out-of-range indices are ignored.
    pub fn recycle<R: Rng>(&mut self, index: usize, spawner: &Spawner<'_>, rng: &mut R) {
        if let Some(slot) = self.entities.get_mut(index) {
            *slot = spawner.respawn(rng);
        }
    }

    /// Recycle every entity with a non-finite position or velocity.
    /// Returns how many were replaced.
    pub fn recycle_non_finite<R: Rng>(&mut self, spawner: &Spawner<'_>, rng: &mut R) -> usize {
        let mut replaced = 0;
        for slot in self.entities.iter_mut() {
            if !slot.is_finite() {
                *slot = spawner.spawn(rng);
                replaced += 1;
            }
        }
        replaced
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn as_mut_slice(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.entities.iter().map(|e| e.pos).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Population, Span};
    use crate::sim::silhouette::Silhouette;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn population(style: EntityStyle) -> PopulationConfig {
        PopulationConfig {
            count: Population::Fixed { count: 50 },
            style,
            speed: Span::new(1.0, 2.0),
            ..PopulationConfig::default()
        }
    }

    #[test]
    fn test_initialize_within_bounds() {
        let pop = population(EntityStyle::Star);
        let palette = Palette::default();
        let spawner = Spawner {
            population: &pop,
            palette: &palette,
            mask: None,
            size: Vec2::new(640.0, 480.0),
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = EntityPool::new();
        pool.initialize(50, &spawner, &mut rng);

        assert_eq!(pool.len(), 50);
        for e in pool.iter() {
            assert!(e.within(spawner.size, 0.0));
            assert_eq!(e.pos, e.base);
            assert!(e.density >= 1.0 && e.density <= 31.0);
        }
    }

    #[test]
    fn test_recycle_touches_only_one_entity() {
        let pop = population(EntityStyle::Drifter);
        let palette = Palette::default();
        let spawner = Spawner {
            population: &pop,
            palette: &palette,
            mask: None,
            size: Vec2::new(300.0, 300.0),
        };
        let mut rng = Pcg32::seed_from_u64(2);
        let mut pool = EntityPool::new();
        pool.initialize(10, &spawner, &mut rng);
        let before = pool.as_slice().to_vec();

        pool.recycle(4, &spawner, &mut rng);
        pool.recycle(99, &spawner, &mut rng);

        assert_eq!(pool.len(), 10);
        for (i, (a, b)) in before.iter().zip(pool.iter()).enumerate() {
            if i == 4 {
                assert_ne!(a, b);
            } else {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_raindrop_respawns_above_top() {
        let pop = population(EntityStyle::Raindrop);
        let palette = Palette::default();
        let spawner = Spawner {
            population: &pop,
            palette: &palette,
            mask: None,
            size: Vec2::new(300.0, 300.0),
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let drop = spawner.respawn(&mut rng);
        assert!(drop.pos.y < 0.0);
        assert!(drop.vel.y > 0.0);
    }

    #[test]
    fn test_candle_respawns_below_bottom() {
        let pop = population(EntityStyle::Candle);
        let palette = Palette::default();
        let spawner = Spawner {
            population: &pop,
            palette: &palette,
            mask: None,
            size: Vec2::new(300.0, 300.0),
        };
        let mut rng = Pcg32::seed_from_u64(4);
        let candle = spawner.respawn(&mut rng);
        assert!(candle.pos.y >= 300.0);
        assert!(candle.vel.y < 0.0);
    }

    #[test]
    fn test_silhouette_seeding() {
        let pop = population(EntityStyle::FlowParticle);
        let palette = Palette::default();
        let mask = SilhouetteMask::fit(Silhouette::WolfHead, 800.0, 600.0);
        let spawner = Spawner {
            population: &pop,
            palette: &palette,
            mask: Some(&mask),
            size: Vec2::new(800.0, 600.0),
        };
        let mut rng = Pcg32::seed_from_u64(5);
        let mut pool = EntityPool::new();
        pool.initialize(200, &spawner, &mut rng);
        assert!(pool.iter().all(|e| mask.contains(e.pos)));
    }

    #[test]
    fn test_non_finite_entities_are_recycled() {
        let pop = population(EntityStyle::Drifter);
        let palette = Palette::default();
        let spawner = Spawner {
            population: &pop,
            palette: &palette,
            mask: None,
            size: Vec2::new(300.0, 300.0),
        };
        let mut rng = Pcg32::seed_from_u64(6);
        let mut pool = EntityPool::new();
        pool.initialize(5, &spawner, &mut rng);
        if let Some(e) = pool.get_mut(2) {
            e.pos.x = f32::NAN;
        }
        assert_eq!(pool.recycle_non_finite(&spawner, &mut rng), 1);
        assert!(pool.iter().all(Entity::is_finite));
        assert_eq!(pool.len(), 5);
    }
}
