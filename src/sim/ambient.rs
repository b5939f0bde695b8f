//! Background layers drawn behind connections and entities

use glam::Vec2;
use rand::Rng;

use crate::config::AmbientConfig;
use crate::math::wrap_with_margin;
use crate::palette::{Color, Palette};

/// Large, faint radial glow drifting slowly across the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NebulaOrb {
    /// Position before parallax
    pub base: Vec2,
    /// Drawn position
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Color,
    /// Fraction of the page scroll offset applied to `pos.y`
    pub parallax: f32,
}

#[derive(Debug, Clone, Default)]
pub struct AmbientLayer {
    orbs: Vec<NebulaOrb>,
    flash: f32,
    flash_decay: f32,
}

impl AmbientLayer {
    pub fn new(flash_decay: f32) -> Self {
        Self {
            orbs: Vec::new(),
            flash: 0.0,
            flash_decay,
        }
    }

    /// Replace the orbs with `count` fresh ones spread over `size`
    pub fn seed<R: Rng>(
        &mut self,
        count: usize,
        config: &AmbientConfig,
        palette: &Palette,
        size: Vec2,
        rng: &mut R,
    ) {
        self.orbs.clear();
        for _ in 0..count {
            let base = Vec2::new(rng.random::<f32>() * size.x, rng.random::<f32>() * size.y);
            let speed = config.nebula_speed;
            self.orbs.push(NebulaOrb {
                base,
                pos: base,
                vel: Vec2::new(
                    (rng.random::<f32>() * 2.0 - 1.0) * speed,
                    (rng.random::<f32>() * 2.0 - 1.0) * speed,
                ),
                radius: config.nebula_radius.sample(rng),
                color: palette.pick_nebula(rng),
                parallax: rng.random_range(0.05..0.15),
            });
        }
    }

    /// Drift, wrap around the edges, and decay the flash
    pub fn update(&mut self, size: Vec2, scroll_y: f32) {
        for orb in self.orbs.iter_mut() {
            orb.base += orb.vel;
            orb.base.x = wrap_with_margin(orb.base.x, size.x, orb.radius);
            orb.base.y = wrap_with_margin(orb.base.y, size.y, orb.radius);
            orb.pos = Vec2::new(orb.base.x, orb.base.y - scroll_y * orb.parallax);
        }
        self.flash = (self.flash - self.flash_decay).max(0.0);
    }

    pub fn trigger_flash(&mut self) {
        self.flash = 1.0;
    }

    /// Flash intensity in `[0, 1]`
    pub fn flash(&self) -> f32 {
        self.flash
    }

    pub fn orbs(&self) -> &[NebulaOrb] {
        &self.orbs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_orbs_wrap() {
        let mut layer = AmbientLayer::new(0.05);
        let config = AmbientConfig {
            nebula_speed: 50.0,
            ..AmbientConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(8);
        let size = Vec2::new(400.0, 300.0);
        layer.seed(4, &config, &Palette::default(), size, &mut rng);
        for _ in 0..500 {
            layer.update(size, 0.0);
            for orb in layer.orbs() {
                assert!(orb.base.x >= -orb.radius && orb.base.x <= size.x + orb.radius);
                assert!(orb.base.y >= -orb.radius && orb.base.y <= size.y + orb.radius);
            }
        }
    }

    #[test]
    fn test_parallax_offsets_drawn_position() {
        let mut layer = AmbientLayer::new(0.05);
        let mut rng = Pcg32::seed_from_u64(2);
        let size = Vec2::new(400.0, 300.0);
        layer.seed(1, &AmbientConfig::default(), &Palette::default(), size, &mut rng);
        layer.update(size, 100.0);
        let orb = layer.orbs()[0];
        assert!(orb.pos.y < orb.base.y);
    }

    #[test]
    fn test_flash_decays_to_zero() {
        let mut layer = AmbientLayer::new(0.05);
        layer.trigger_flash();
        assert_eq!(layer.flash(), 1.0);
        for _ in 0..25 {
            layer.update(Vec2::new(10.0, 10.0), 0.0);
        }
        assert_eq!(layer.flash(), 0.0);
    }
}
