//! Per-instance simulation world
//!
//! Owns every piece of mutable simulation state for one mounted engine:
//! the entity pool, force field, effect list, ambient layers and the seeded
//! RNG. [`World::tick`] advances one frame in a fixed layer order and hands
//! each layer to a [`LayerSink`] right after updating it, so drawing code
//! never needs to know about update order.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ambient::AmbientLayer;
use super::effects::{Effect, EffectManager};
use super::entity::{Entity, EntityKind};
use super::field::{ForceField, Pointer};
use super::pool::{EntityPool, Spawner};
use super::proximity::{self, Connection, PointerLink, ProximityParams};
use super::silhouette::SilhouetteMask;
use crate::config::EngineConfig;
use crate::consts::{FALLBACK_HEIGHT, FALLBACK_WIDTH};
use crate::error::ConfigError;
use crate::math::linear_falloff;
use crate::palette::Palette;

/// Horizontal sway amplitude of candles, px/tick
const CANDLE_SWAY: f32 = 0.5;
/// Candles are recycled this far above their own height past the top edge
const CANDLE_EXIT_MARGIN: f32 = 20.0;
/// Peak extra brightness of raindrops at the pointer
const RAIN_GLOW: f32 = 0.8;
/// Cursor glyph tilt per px of horizontal pointer motion
const CURSOR_TILT_GAIN: f32 = 0.05;
const CURSOR_TILT_MAX: f32 = 0.5;

/// Input consumed by one tick. Produced by the host bindings; the world
/// only ever reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// `None` while the pointer is off the surface
    pub pointer: Option<Pointer>,
    /// Click positions since the previous tick, oldest first
    pub clicks: Vec<Vec2>,
    /// Pointer-move positions since the previous tick, oldest first
    pub trail: Vec<Vec2>,
    /// Page scroll offset, for parallax layers
    pub scroll_y: f32,
}

/// Draw layers, back to front, in the order a tick produces them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Clear or fade
    Background,
    Ambient,
    Connections,
    Entities,
    Effects,
    /// Pointer glyph, above everything
    Cursor,
}

impl Layer {
    pub const ORDER: [Layer; 6] = [
        Layer::Background,
        Layer::Ambient,
        Layer::Connections,
        Layer::Entities,
        Layer::Effects,
        Layer::Cursor,
    ];
}

/// Receives each layer as soon as it has been updated
pub trait LayerSink {
    fn layer(&mut self, layer: Layer, world: &World);
}

/// Counters for one tick, for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub connections: usize,
    pub effects_spawned: usize,
    pub effects_expired: usize,
    pub recycled: usize,
    pub non_finite: usize,
}

pub struct World {
    config: EngineConfig,
    palette: Palette,
    rng: Pcg32,
    size: Vec2,
    pool: EntityPool,
    mask: Option<SilhouetteMask>,
    field: ForceField,
    effects: EffectManager,
    ambient: AmbientLayer,
    connections: Vec<Connection>,
    pointer_links: Vec<PointerLink>,
    pointer: Option<Pointer>,
    cursor_tilt: f32,
    ticks: u64,
}

impl World {
    /// Build a world at the fallback size; call [`World::resize`] once the
    /// host knows the real surface dimensions.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_size(config, FALLBACK_WIDTH, FALLBACK_HEIGHT)
    }

    pub fn with_size(config: EngineConfig, width: f32, height: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        let size = sanitize_size(width, height);
        let palette = config.resolved_palette();
        let field = ForceField::new(&config.force, size.x, size.y);
        let effects = EffectManager::new(config.max_effects(), config.max_trail());
        let ambient = AmbientLayer::new(config.effects.lightning_decay);

        let mut world = Self {
            rng: Pcg32::seed_from_u64(config.seed),
            palette,
            size,
            pool: EntityPool::new(),
            mask: None,
            field,
            effects,
            ambient,
            connections: Vec::new(),
            pointer_links: Vec::new(),
            pointer: None,
            cursor_tilt: 0.0,
            ticks: 0,
            config,
        };
        world.reseed();
        Ok(world)
    }

    /// Restore the just-constructed state: same seed, fresh pool, no effects
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.config.seed);
        self.effects.clear();
        self.pointer = None;
        self.cursor_tilt = 0.0;
        self.ticks = 0;
        self.reseed();
    }

    /// Adopt new surface dimensions. Grid structures are rebuilt and the
    /// pool is reseeded; in-flight entity state is discarded.
    pub fn resize(&mut self, width: f32, height: f32) {
        let size = sanitize_size(width, height);
        log::info!(
            "Resize {}x{} -> {}x{}",
            self.size.x,
            self.size.y,
            size.x,
            size.y
        );
        self.size = size;
        self.field.resize(size.x, size.y);
        self.reseed();
    }

    fn reseed(&mut self) {
        self.mask = self
            .config
            .population
            .silhouette
            .clone()
            .map(|shape| SilhouetteMask::fit(shape, self.size.x, self.size.y));

        let count = self.config.population.count.count_for(self.size.x, self.size.y);
        let spawner = Spawner {
            population: &self.config.population,
            palette: &self.palette,
            mask: self.mask.as_ref(),
            size: self.size,
        };
        self.pool.initialize(count, &spawner, &mut self.rng);

        self.ambient.seed(
            self.config.nebula_count(),
            &self.config.ambient,
            &self.palette,
            self.size,
            &mut self.rng,
        );
        self.connections.clear();
        self.pointer_links.clear();
        log::debug!("Seeded {} entities at {}x{}", count, self.size.x, self.size.y);
    }

    /// Advance one frame. Layers are updated and handed to `sink` strictly
    /// in [`Layer::ORDER`].
    pub fn tick(&mut self, input: &FrameInput, sink: &mut dyn LayerSink) -> TickStats {
        let mut stats = TickStats::default();
        self.pointer = input.pointer;
        stats.effects_spawned = self.ingest(input);

        sink.layer(Layer::Background, self);

        self.ambient.update(self.size, input.scroll_y);
        sink.layer(Layer::Ambient, self);

        self.update_connections();
        stats.connections = self.connections.len();
        sink.layer(Layer::Connections, self);

        let (recycled, non_finite) = self.update_entities();
        stats.recycled = recycled;
        stats.non_finite = non_finite;
        sink.layer(Layer::Entities, self);

        stats.effects_expired = self.effects.step();
        sink.layer(Layer::Effects, self);

        self.update_cursor();
        sink.layer(Layer::Cursor, self);

        self.ticks += 1;
        stats
    }

    /// Turn this frame's clicks and moves into effects
    fn ingest(&mut self, input: &FrameInput) -> usize {
        let before = self.effects.len();
        let mut spawned = 0;
        let fx = self.config.effects;

        for &at in &input.clicks {
            if fx.ripple {
                self.effects.spawn(Effect::ripple(at, &fx, self.palette.accent));
                spawned += 1;
            }
            for i in 0..fx.burst_count {
                self.effects
                    .spawn(Effect::burst(at, i, fx.burst_count, &fx, self.palette.burst));
                spawned += 1;
            }
            let label = if fx.labels {
                self.palette.pick_label(&mut self.rng)
            } else {
                None
            };
            if let Some(text) = label {
                let color = self.palette.pick_label_color(&mut self.rng);
                self.effects
                    .spawn(Effect::label(at, text, &fx, color, &mut self.rng));
                spawned += 1;
            }
            if fx.lightning_chance > 0.0 && self.rng.random::<f32>() < fx.lightning_chance {
                self.ambient.trigger_flash();
            }
        }

        if self.config.max_trail() > 0 {
            for &at in &input.trail {
                for _ in 0..fx.trail_per_move {
                    let puff = Effect::trail_puff(at, &fx, self.palette.trail, &mut self.rng);
                    self.effects.spawn(puff);
                    spawned += 1;
                }
            }
        }

        if fx.shooting_star_chance > 0.0 && self.rng.random::<f32>() < fx.shooting_star_chance {
            let star = Effect::shooting_star(self.size, &fx, self.palette.accent, &mut self.rng);
            self.effects.spawn(star);
            spawned += 1;
        }

        if spawned > 0 {
            log::trace!("Spawned {} effects ({} -> {})", spawned, before, self.effects.len());
        }
        spawned
    }

    fn update_connections(&mut self) {
        self.connections.clear();
        self.pointer_links.clear();
        if !self.config.connections_enabled() {
            return;
        }
        let positions = self.pool.positions();
        let params = ProximityParams::from(&self.config.connections);
        self.connections = proximity::connections(&positions, &params, self.config.connections.strategy);
        if let Some(pointer) = self.pointer.filter(|_| self.config.connections.pointer_links) {
            self.pointer_links =
                proximity::pointer_links(&positions, &pointer, self.config.connections.max_opacity);
        }
    }

    /// Apply forces, integrate per-kind motion, recycle leavers.
    /// Returns `(recycled, non_finite)`.
    fn update_entities(&mut self) -> (usize, usize) {
        let size = self.size;
        let pointer = self.pointer;
        self.field.apply(self.pool.as_mut_slice(), pointer.as_ref());

        let mut leavers: Vec<usize> = Vec::new();
        for (i, entity) in self.pool.iter_mut().enumerate() {
            let flicker = self.rng.random::<f32>() * 2.0;
            if integrate(entity, size, pointer.as_ref(), flicker) {
                leavers.push(i);
            }
        }

        let spawner = Spawner {
            population: &self.config.population,
            palette: &self.palette,
            mask: self.mask.as_ref(),
            size: self.size,
        };
        for &i in &leavers {
            self.pool.recycle(i, &spawner, &mut self.rng);
        }
        let non_finite = self.pool.recycle_non_finite(&spawner, &mut self.rng);
        if non_finite > 0 {
            log::warn!("Recycled {} entities with non-finite state", non_finite);
        }
        (leavers.len(), non_finite)
    }

    fn update_cursor(&mut self) {
        self.cursor_tilt = match &self.pointer {
            Some(p) if self.config.cursor_glyph => {
                (p.velocity.x * CURSOR_TILT_GAIN).clamp(-CURSOR_TILT_MAX, CURSOR_TILT_MAX)
            }
            _ => 0.0,
        };
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn entities(&self) -> &[Entity] {
        self.pool.as_slice()
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    pub fn effects(&self) -> &EffectManager {
        &self.effects
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn pointer_links(&self) -> &[PointerLink] {
        &self.pointer_links
    }

    pub fn pointer(&self) -> Option<&Pointer> {
        self.pointer.as_ref()
    }

    pub fn ambient(&self) -> &AmbientLayer {
        &self.ambient
    }

    pub fn field(&self) -> &ForceField {
        &self.field
    }

    pub fn silhouette(&self) -> Option<&SilhouetteMask> {
        self.mask.as_ref()
    }

    pub fn cursor_tilt(&self) -> f32 {
        self.cursor_tilt
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Zero, negative or non-finite dimensions collapse to 1px
fn sanitize_size(width: f32, height: f32) -> Vec2 {
    let clean = |v: f32| if v.is_finite() && v >= 1.0 { v } else { 1.0 };
    Vec2::new(clean(width), clean(height))
}

/// Per-kind motion after forces. Returns true when the entity has left
/// the scene and must be recycled.
fn integrate(entity: &mut Entity, size: Vec2, pointer: Option<&Pointer>, flicker_roll: f32) -> bool {
    match &mut entity.kind {
        EntityKind::Star => false,
        EntityKind::Drifter => {
            entity.pos += entity.vel;
            if entity.pos.x < 0.0 || entity.pos.x > size.x {
                entity.vel.x = -entity.vel.x;
                entity.pos.x = entity.pos.x.clamp(0.0, size.x);
            }
            if entity.pos.y < 0.0 || entity.pos.y > size.y {
                entity.vel.y = -entity.vel.y;
                entity.pos.y = entity.pos.y.clamp(0.0, size.y);
            }
            false
        }
        EntityKind::Raindrop { length } => {
            entity.pos += entity.vel;
            entity.glow = pointer
                .map(|p| linear_falloff(entity.pos.distance(p.pos), p.radius) * RAIN_GLOW)
                .unwrap_or(0.0);
            entity.pos.y > size.y + *length || entity.pos.x < 0.0 || entity.pos.x > size.x
        }
        EntityKind::Candle {
            height,
            sway,
            sway_phase,
            flicker,
        } => {
            entity.pos.y += entity.vel.y;
            *sway_phase += *sway;
            entity.pos.x += sway_phase.sin() * CANDLE_SWAY;
            *flicker = flicker_roll;
            entity.pos.y < -*height - CANDLE_EXIT_MARGIN
        }
        EntityKind::FlowParticle => {
            entity.pos += entity.vel;
            !entity.within(size, 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EntityStyle, ForceMode, Population, RadialConfig, ScenePreset};
    use crate::math::distance;

    /// Records the order layers arrive in
    #[derive(Default)]
    struct Recorder {
        layers: Vec<Layer>,
    }

    impl LayerSink for Recorder {
        fn layer(&mut self, layer: Layer, _world: &World) {
            self.layers.push(layer);
        }
    }

    fn starfield(count: usize) -> EngineConfig {
        let mut config = EngineConfig::preset(ScenePreset::Starfield);
        config.population.count = Population::Fixed { count };
        config.force = ForceMode::Radial(RadialConfig {
            damping: 10.0,
            ..RadialConfig::default()
        });
        config.pointer.radius = 150.0;
        config
    }

    fn pointer_at(x: f32, y: f32) -> FrameInput {
        FrameInput {
            pointer: Some(Pointer::at(Vec2::new(x, y), 150.0)),
            ..FrameInput::default()
        }
    }

    fn mean_distance(world: &World, p: Vec2) -> f32 {
        let total: f32 = world.entities().iter().map(|e| distance(e.pos, p)).sum();
        total / world.entities().len() as f32
    }

    #[test]
    fn test_layer_order() {
        let mut world = World::new(starfield(20)).expect("valid config");
        let mut recorder = Recorder::default();
        world.tick(&pointer_at(10.0, 10.0), &mut recorder);
        assert_eq!(recorder.layers, Layer::ORDER.to_vec());
    }

    #[test]
    fn test_pointer_scenario_net_repulsion() {
        let mut world = World::with_size(starfield(100), 800.0, 600.0).expect("valid config");
        let mut sink = Recorder::default();
        let pointer = Vec2::new(400.0, 300.0);
        let input = pointer_at(pointer.x, pointer.y);

        world.tick(&input, &mut sink);
        let first = mean_distance(&world, pointer);
        for _ in 1..30 {
            world.tick(&input, &mut sink);
        }
        let last = mean_distance(&world, pointer);

        assert!(last > first, "mean distance {last} should exceed {first}");
        assert!(world.entities().iter().all(Entity::is_finite));
    }

    #[test]
    fn test_idle_relaxation_after_pointer_leaves() {
        let mut world = World::with_size(starfield(60), 800.0, 600.0).expect("valid config");
        let mut sink = Recorder::default();
        for _ in 0..20 {
            world.tick(&pointer_at(400.0, 300.0), &mut sink);
        }
        let idle = FrameInput::default();
        for _ in 0..200 {
            world.tick(&idle, &mut sink);
        }
        for e in world.entities() {
            assert!(distance(e.pos, e.base) < 0.05, "{e:?} did not settle");
        }
    }

    #[test]
    fn test_resize_keeps_fixed_count_and_bounds() {
        let mut config = starfield(75);
        config.population.style = EntityStyle::Drifter;
        let mut world = World::with_size(config, 1200.0, 900.0).expect("valid config");
        let mut sink = Recorder::default();
        for _ in 0..10 {
            world.tick(&FrameInput::default(), &mut sink);
        }
        world.resize(320.0, 240.0);
        assert_eq!(world.entities().len(), 75);
        let size = world.size();
        assert!(world.entities().iter().all(|e| e.within(size, 0.0)));

        world.tick(&FrameInput::default(), &mut sink);
        assert!(world.entities().iter().all(|e| e.within(size, 0.0)));
    }

    #[test]
    fn test_degenerate_resize_does_not_panic() {
        let mut world = World::new(starfield(10)).expect("valid config");
        world.resize(0.0, f32::NAN);
        assert_eq!(world.size(), Vec2::ONE);
        world.tick(&pointer_at(0.0, 0.0), &mut Recorder::default());
        assert!(world.entities().iter().all(Entity::is_finite));
    }

    #[test]
    fn test_same_seed_same_scene() {
        let config = EngineConfig::preset(ScenePreset::GothamRain);
        let mut a = World::with_size(config.clone(), 640.0, 480.0).expect("valid config");
        let mut b = World::with_size(config, 640.0, 480.0).expect("valid config");
        let mut input = pointer_at(100.0, 100.0);
        input.clicks.push(Vec2::new(50.0, 50.0));
        let mut sink = Recorder::default();
        for _ in 0..15 {
            a.tick(&input, &mut sink);
            b.tick(&input, &mut sink);
        }
        assert_eq!(a.entities(), b.entities());
        assert_eq!(a.effects().as_slice(), b.effects().as_slice());
    }

    #[test]
    fn test_click_spawns_ripple_and_bursts() {
        let config = EngineConfig::preset(ScenePreset::BatarangCursor);
        let mut world = World::new(config).expect("valid config");
        let input = FrameInput {
            clicks: vec![Vec2::new(200.0, 200.0)],
            ..FrameInput::default()
        };
        let stats = world.tick(&input, &mut Recorder::default());
        assert_eq!(stats.effects_spawned, 4);
        assert_eq!(world.effects().len(), 4);
        // Spawned and aged in the same tick
        assert!(world.effects().iter().all(|e| e.age == 1));
    }

    #[test]
    fn test_raindrops_recycle_at_top() {
        let config = EngineConfig::preset(ScenePreset::GothamRain);
        let mut world = World::with_size(config, 400.0, 300.0).expect("valid config");
        let count = world.entities().len();
        let mut sink = Recorder::default();
        let mut recycled = 0;
        for _ in 0..60 {
            recycled += world.tick(&FrameInput::default(), &mut sink).recycled;
        }
        assert!(recycled > 0);
        assert_eq!(world.entities().len(), count);
        for e in world.entities() {
            if let EntityKind::Raindrop { length } = e.kind {
                assert!(e.pos.y <= 300.0 + length + 25.0);
            }
        }
    }

    #[test]
    fn test_connections_respect_threshold() {
        let mut world = World::with_size(starfield(80), 500.0, 500.0).expect("valid config");
        world.tick(&FrameInput::default(), &mut Recorder::default());
        let threshold = world.config().connections.threshold;
        assert!(!world.connections().is_empty());
        for c in world.connections() {
            assert!(c.distance < threshold);
        }
    }

    #[test]
    fn test_cursor_tilt_is_clamped() {
        let config = EngineConfig::preset(ScenePreset::BatarangCursor);
        let mut world = World::new(config).expect("valid config");
        let mut input = pointer_at(100.0, 100.0);
        if let Some(p) = input.pointer.as_mut() {
            p.velocity = Vec2::new(400.0, 0.0);
        }
        world.tick(&input, &mut Recorder::default());
        assert_eq!(world.cursor_tilt(), 0.5);
    }

    #[test]
    fn test_non_finite_entity_recycled_and_counted() {
        let mut world = World::new(starfield(10)).expect("valid config");
        if let Some(entity) = world.pool.get_mut(3) {
            entity.pos.x = f32::NAN;
        }
        let stats = world.tick(&FrameInput::default(), &mut Recorder::default());
        assert_eq!(stats.non_finite, 1);
        assert!(world.entities().iter().all(Entity::is_finite));
        assert_eq!(world.entities().len(), 10);
    }

    #[test]
    fn test_reset_restores_initial_scene() {
        let config = starfield(30);
        let mut world = World::new(config.clone()).expect("valid config");
        let initial = world.entities().to_vec();
        for _ in 0..5 {
            world.tick(&pointer_at(300.0, 300.0), &mut Recorder::default());
        }
        world.reset();
        assert_eq!(world.entities(), initial.as_slice());
        assert_eq!(world.ticks(), 0);
    }
}
