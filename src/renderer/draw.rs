//! Layer drawing
//!
//! [`Painter`] receives layers from `World::tick` and turns the world's
//! state into `Surface` calls, dispatching on entity and effect kind.

use glam::Vec2;

use super::shapes;
use super::surface::Surface;
use crate::math::with_alpha;
use crate::palette::{Color, rgba};
use crate::sim::{Effect, EffectKind, Entity, EntityKind, Layer, LayerSink, World};

const CURSOR_SCALE: f32 = 0.8;
const CURSOR_COLOR: Color = rgba(10, 10, 10, 1.0);
const GLYPH_EDGE: Color = rgba(51, 51, 51, 1.0);
const FLAME_CORE: Color = rgba(255, 255, 255, 1.0);
const FLAME_MID: Color = rgba(255, 215, 0, 0.9);
const FLAME_EDGE: Color = rgba(255, 60, 0, 0.0);
const RAIN_WIDTH: f32 = 1.0;
const RIPPLE_WIDTH: f32 = 2.0;
const RIPPLE_INNER: Color = rgba(30, 30, 40, 0.5);

pub struct Painter<'a> {
    surface: &'a mut dyn Surface,
    glyph: Vec<Vec2>,
}

impl<'a> Painter<'a> {
    pub fn new(surface: &'a mut dyn Surface) -> Self {
        Self {
            surface,
            glyph: shapes::batarang_outline(),
        }
    }

    fn background(&mut self, world: &World) {
        let palette = world.palette();
        match world.config().ambient.fade {
            Some(alpha) => self.surface.fade(with_alpha(palette.background, alpha)),
            None => self.surface.clear(palette.background),
        }
        let flash = world.ambient().flash();
        if flash > 0.0 {
            let size = self.surface.size();
            self.surface
                .fill_rect(Vec2::ZERO, size, with_alpha(palette.flash, flash));
        }
    }

    fn ambient(&mut self, world: &World) {
        for orb in world.ambient().orbs() {
            let rim = [orb.color[0], orb.color[1], orb.color[2], 0.0];
            self.surface.glow(orb.pos, orb.radius, orb.color, rim);
        }
    }

    fn connections(&mut self, world: &World) {
        let entities = world.entities();
        let palette = world.palette();
        let width = world.config().connections.line_width;
        for c in world.connections() {
            if let (Some(a), Some(b)) = (entities.get(c.a), entities.get(c.b)) {
                self.surface
                    .line(a.pos, b.pos, width, with_alpha(palette.connection, c.opacity));
            }
        }
        if let Some(pointer) = world.pointer() {
            for link in world.pointer_links() {
                if let Some(e) = entities.get(link.index) {
                    self.surface
                        .line(pointer.pos, e.pos, width, with_alpha(palette.accent, link.opacity));
                }
            }
        }
    }

    fn entity(&mut self, e: &Entity) {
        match e.kind {
            EntityKind::Star | EntityKind::Drifter | EntityKind::FlowParticle => {
                self.surface.fill_circle(e.pos, e.radius, e.color);
            }
            EntityKind::Raindrop { length } => {
                let alpha = (e.color[3] + e.glow).min(1.0);
                let color = [e.color[0], e.color[1], e.color[2], alpha];
                self.surface
                    .line(e.pos, e.pos + Vec2::new(0.0, length), RAIN_WIDTH, color);
            }
            EntityKind::Candle {
                height, flicker, ..
            } => {
                let width = e.radius;
                self.surface
                    .fill_rect(e.pos, Vec2::new(width, height), e.color);
                let flame = e.pos + Vec2::new(width * 0.5, -5.0);
                self.surface.glow(flame, 8.0 + flicker, FLAME_MID, FLAME_EDGE);
                self.surface.fill_circle(flame, 2.0, FLAME_CORE);
            }
        }
    }

    fn effect(&mut self, fx: &Effect, world: &World) {
        let opacity = fx.opacity().clamp(0.0, 1.0);
        let color = with_alpha(fx.color, opacity);
        match &fx.kind {
            EffectKind::Ripple { radius, .. } => {
                self.surface.stroke_circle(fx.pos, *radius, RIPPLE_WIDTH, color);
                self.surface.stroke_circle(
                    fx.pos,
                    radius * 0.7,
                    RIPPLE_WIDTH * 0.5,
                    with_alpha(RIPPLE_INNER, opacity),
                );
            }
            EffectKind::Burst {
                rotation, scale, ..
            } => {
                let core = with_alpha(world.palette().accent, opacity);
                self.batarang(fx.pos, *scale, *rotation, color, core);
            }
            EffectKind::ShootingStar { length } => {
                let tail = fx.pos - fx.vel.normalize_or_zero() * *length;
                self.surface.line(tail, fx.pos, 1.5, color);
                self.surface.fill_circle(fx.pos, 1.5, color);
            }
            EffectKind::Label {
                text, size, tilt, ..
            } => {
                self.surface.text(text, fx.pos, *size, *tilt, color);
            }
            EffectKind::TrailPuff { radius, .. } => {
                self.surface.fill_circle(fx.pos, *radius, color);
            }
        }
    }

    fn batarang(&mut self, at: Vec2, scale: f32, rotation: f32, body: Color, core: Color) {
        let outline = shapes::transform(&self.glyph, at, scale, rotation);
        self.surface.fill_polygon(&outline, body);
        for (i, p) in outline.iter().enumerate() {
            let next = outline[(i + 1) % outline.len()];
            self.surface.line(*p, next, 1.0, with_alpha(GLYPH_EDGE, body[3]));
        }
        self.surface.fill_circle(at, 2.0 * scale.max(0.5), core);
    }

    fn cursor(&mut self, world: &World) {
        if !world.config().cursor_glyph {
            return;
        }
        if let Some(pointer) = world.pointer() {
            self.batarang(
                pointer.pos,
                CURSOR_SCALE,
                world.cursor_tilt(),
                CURSOR_COLOR,
                world.palette().accent,
            );
        }
    }
}

impl LayerSink for Painter<'_> {
    fn layer(&mut self, layer: Layer, world: &World) {
        match layer {
            Layer::Background => self.background(world),
            Layer::Ambient => self.ambient(world),
            Layer::Connections => self.connections(world),
            Layer::Entities => {
                for e in world.entities() {
                    self.entity(e);
                }
            }
            Layer::Effects => {
                for fx in world.effects().iter() {
                    self.effect(fx, world);
                }
            }
            Layer::Cursor => self.cursor(world),
        }
    }
}
