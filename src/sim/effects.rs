//! Transient effect lifecycle
//!
//! Every effect follows the same contract regardless of category:
//! it is `Spawned` with age 0, ages by exactly one each tick, and is
//! `Expired` once its opacity reaches zero. Expired effects are removed in
//! the same step that expires them, with a stable filter so the draw order
//! of the survivors never changes.

use glam::Vec2;
use rand::Rng;

use crate::config::EffectsConfig;
use crate::palette::Color;

/// Ripple radius at spawn
const RIPPLE_START_RADIUS: f32 = 10.0;
/// Burst projectile scale relative to the cursor glyph
const BURST_SCALE: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectPhase {
    Spawned,
    Aging,
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    /// Expanding ring
    Ripple { radius: f32, growth: f32 },
    /// Spinning projectile thrown outward from a click
    Burst { rotation: f32, spin: f32, scale: f32 },
    /// Fast streak with a fading tail
    ShootingStar { length: f32 },
    /// Floating text that grows as it fades
    Label { text: String, size: f32, growth: f32, tilt: f32 },
    /// Pointer trail puff with optional gravity
    TrailPuff { radius: f32, gravity: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Ticks since spawn
    pub age: u32,
    /// Opacity at age 0
    pub initial_opacity: f32,
    /// Opacity lost per tick
    pub decay: f32,
    pub color: Color,
    pub kind: EffectKind,
}

impl Effect {
    pub fn new(pos: Vec2, decay: f32, color: Color, kind: EffectKind) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            age: 0,
            initial_opacity: 1.0,
            decay,
            color,
            kind,
        }
    }

    pub fn ripple(pos: Vec2, config: &EffectsConfig, color: Color) -> Self {
        Self::new(
            pos,
            config.ripple_decay,
            color,
            EffectKind::Ripple {
                radius: RIPPLE_START_RADIUS,
                growth: config.ripple_growth,
            },
        )
    }

    /// Projectile `index` of `count`, evenly fanned and starting straight up
    pub fn burst(pos: Vec2, index: u32, count: u32, config: &EffectsConfig, color: Color) -> Self {
        let angle = std::f32::consts::TAU * index as f32 / count.max(1) as f32
            - std::f32::consts::FRAC_PI_2;
        let mut effect = Self::new(
            pos,
            config.burst_decay,
            color,
            EffectKind::Burst {
                rotation: 0.0,
                spin: config.burst_spin,
                scale: BURST_SCALE,
            },
        );
        effect.vel = Vec2::from_angle(angle) * config.burst_speed;
        effect
    }

    pub fn label<R: Rng>(
        pos: Vec2,
        text: String,
        config: &EffectsConfig,
        color: Color,
        rng: &mut R,
    ) -> Self {
        let mut effect = Self::new(
            pos,
            config.label_decay,
            color,
            EffectKind::Label {
                text,
                size: rng.random_range(20.0..40.0),
                growth: config.label_growth,
                tilt: rng.random_range(-0.1..0.1),
            },
        );
        effect.vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * 2.0,
            -2.0 - rng.random::<f32>() * 2.0,
        );
        effect
    }

    pub fn trail_puff<R: Rng>(pos: Vec2, config: &EffectsConfig, color: Color, rng: &mut R) -> Self {
        let mut effect = Self::new(
            pos,
            config.trail_decay * rng.random_range(0.5..1.5),
            color,
            EffectKind::TrailPuff {
                radius: config.trail_size.sample(rng),
                gravity: config.trail_gravity,
            },
        );
        effect.vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * config.trail_spread,
            (rng.random::<f32>() - 0.5) * config.trail_spread,
        );
        effect
    }

    /// Streak entering from the top half, heading down and right
    pub fn shooting_star<R: Rng>(size: Vec2, config: &EffectsConfig, color: Color, rng: &mut R) -> Self {
        let start = Vec2::new(rng.random::<f32>() * size.x, rng.random::<f32>() * size.y * 0.5);
        let angle: f32 = rng.random_range(0.35..0.7);
        let speed: f32 = rng.random_range(8.0..14.0);
        let mut effect = Self::new(
            start,
            config.shooting_star_decay,
            color,
            EffectKind::ShootingStar {
                length: rng.random_range(60.0..100.0),
            },
        );
        effect.vel = Vec2::from_angle(angle) * speed;
        effect
    }

    /// Current opacity; `<= 0` means expired
    pub fn opacity(&self) -> f32 {
        self.initial_opacity - self.decay * self.age as f32
    }

    pub fn phase(&self) -> EffectPhase {
        if self.opacity() <= 0.0 {
            EffectPhase::Expired
        } else if self.age == 0 {
            EffectPhase::Spawned
        } else {
            EffectPhase::Aging
        }
    }

    pub fn is_trail(&self) -> bool {
        matches!(self.kind, EffectKind::TrailPuff { .. })
    }

    /// One tick of aging and motion
    fn advance(&mut self) {
        self.age = self.age.saturating_add(1);
        self.pos += self.vel;
        match &mut self.kind {
            EffectKind::Ripple { radius, growth } => *radius += *growth,
            EffectKind::Burst { rotation, spin, .. } => *rotation += *spin,
            EffectKind::ShootingStar { .. } => {}
            EffectKind::Label { size, growth, .. } => *size *= *growth,
            EffectKind::TrailPuff { gravity, .. } => self.vel.y += *gravity,
        }
    }
}

/// Owns every live effect. Nothing else removes effects.
#[derive(Debug, Clone, Default)]
pub struct EffectManager {
    effects: Vec<Effect>,
    capacity: usize,
    trail_capacity: usize,
}

impl EffectManager {
    pub fn new(capacity: usize, trail_capacity: usize) -> Self {
        Self {
            effects: Vec::with_capacity(capacity.min(1024)),
            capacity,
            trail_capacity,
        }
    }

    /// Add an effect, evicting the oldest when over a cap. Trail puffs
    /// evict the oldest puff; everything else the oldest effect overall.
    pub fn spawn(&mut self, effect: Effect) {
        if self.capacity == 0 || (effect.is_trail() && self.trail_capacity == 0) {
            return;
        }
        if effect.is_trail() && self.trail_count() >= self.trail_capacity {
            if let Some(oldest) = self.effects.iter().position(Effect::is_trail) {
                self.effects.remove(oldest);
            }
        }
        if self.effects.len() >= self.capacity {
            self.effects.remove(0);
        }
        self.effects.push(effect);
    }

    /// Age every effect by one tick and drop the expired ones.
    /// Returns the number removed.
    pub fn step(&mut self) -> usize {
        for effect in self.effects.iter_mut() {
            effect.advance();
        }
        let before = self.effects.len();
        self.effects.retain(|e| e.opacity() > 0.0);
        before - self.effects.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn as_slice(&self) -> &[Effect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn trail_count(&self) -> usize {
        self.effects.iter().filter(|e| e.is_trail()).count()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ripple_at(x: f32, decay: f32) -> Effect {
        Effect::new(
            Vec2::new(x, 0.0),
            decay,
            [1.0; 4],
            EffectKind::Ripple {
                radius: 10.0,
                growth: 3.0,
            },
        )
    }

    #[test]
    fn test_phases() {
        let mut manager = EffectManager::new(16, 4);
        manager.spawn(ripple_at(0.0, 0.5));
        assert_eq!(manager.as_slice()[0].phase(), EffectPhase::Spawned);
        manager.step();
        assert_eq!(manager.as_slice()[0].phase(), EffectPhase::Aging);
        // 1.0 - 0.5 * 2 = 0 -> expired and removed in the same step
        assert_eq!(manager.step(), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_ripple_grows() {
        let mut manager = EffectManager::new(16, 4);
        manager.spawn(Effect::ripple(Vec2::ZERO, &EffectsConfig::default(), [1.0; 4]));
        manager.step();
        match &manager.as_slice()[0].kind {
            EffectKind::Ripple { radius, .. } => assert_eq!(*radius, 13.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_removal_is_stable() {
        let mut manager = EffectManager::new(16, 4);
        manager.spawn(ripple_at(0.0, 0.1));
        manager.spawn(ripple_at(1.0, 0.6));
        manager.spawn(ripple_at(2.0, 0.1));
        manager.spawn(ripple_at(3.0, 0.6));
        manager.step();
        manager.step();
        let xs: Vec<f32> = manager.iter().map(|e| e.pos.x).collect();
        assert_eq!(xs, vec![0.0, 2.0]);
    }

    #[test]
    fn test_burst_fan_starts_upward() {
        let config = EffectsConfig::default();
        let first = Effect::burst(Vec2::ZERO, 0, 3, &config, [1.0; 4]);
        assert!(first.vel.x.abs() < 1e-4);
        assert!((first.vel.y + config.burst_speed).abs() < 1e-4);
        let second = Effect::burst(Vec2::ZERO, 1, 3, &config, [1.0; 4]);
        assert!(second.vel.x > 0.0);
    }

    #[test]
    fn test_trail_cap_evicts_oldest_puff() {
        let config = EffectsConfig::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut manager = EffectManager::new(100, 3);
        manager.spawn(ripple_at(-1.0, 0.01));
        for i in 0..5 {
            manager.spawn(Effect::trail_puff(Vec2::new(i as f32 * 100.0, 0.0), &config, [1.0; 4], &mut rng));
        }
        assert_eq!(manager.trail_count(), 3);
        assert_eq!(manager.len(), 4);
        // Ripple survives, the two oldest puffs are gone
        assert_eq!(manager.as_slice()[0].pos.x, -1.0);
        assert_eq!(manager.as_slice()[1].pos.x, 200.0);
    }

    #[test]
    fn test_global_cap() {
        let mut manager = EffectManager::new(2, 2);
        for i in 0..5 {
            manager.spawn(ripple_at(i as f32, 0.01));
        }
        let xs: Vec<f32> = manager.iter().map(|e| e.pos.x).collect();
        assert_eq!(xs, vec![3.0, 4.0]);
    }

    #[test]
    fn test_disabled_trail_spawns_nothing() {
        let config = EffectsConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut manager = EffectManager::new(10, 0);
        manager.spawn(Effect::trail_puff(Vec2::ZERO, &config, [1.0; 4], &mut rng));
        assert!(manager.is_empty());
    }

    proptest! {
        #[test]
        fn prop_age_increases_until_removed(decays in prop::collection::vec(0.005f32..0.5, 1..20)) {
            let mut manager = EffectManager::new(64, 8);
            for (i, d) in decays.iter().enumerate() {
                manager.spawn(ripple_at(i as f32, *d));
            }
            let mut removed_ids: Vec<u32> = Vec::new();
            for _ in 0..300 {
                let before: Vec<(u32, u32)> = manager.iter().map(|e| (e.pos.x as u32, e.age)).collect();
                manager.step();
                for e in manager.iter() {
                    let id = e.pos.x as u32;
                    prop_assert!(e.opacity() > 0.0);
                    prop_assert!(!removed_ids.contains(&id));
                    let prev = before.iter().find(|(pid, _)| *pid == id).map(|(_, age)| *age);
                    prop_assert_eq!(prev.map(|a| a + 1), Some(e.age));
                }
                for (id, _) in &before {
                    if !manager.iter().any(|e| e.pos.x as u32 == *id) {
                        removed_ids.push(*id);
                    }
                }
            }
            prop_assert!(manager.is_empty());
        }
    }
}
