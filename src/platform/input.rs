//! Host input model
//!
//! Host events are queued into [`InputState`] between ticks. At the start of
//! each tick the engine drains it into a [`FrameInput`] for the simulation.

use glam::Vec2;

use crate::config::PointerConfig;
use crate::math::relax_scalar;
use crate::sim::{FrameInput, Pointer};

/// Events the engine consumes from its host, in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerMove { x: f32, y: f32 },
    /// Pointer left the surface; the simulation falls back to idle behavior
    PointerLeave,
    PointerDown,
    PointerUp,
    Click { x: f32, y: f32 },
    Resize { width: f32, height: f32 },
    /// Absolute vertical page scroll offset
    Scroll { y: f32 },
}

/// Pointer position plus press amplification
#[derive(Debug, Clone)]
pub struct PointerState {
    config: PointerConfig,
    pos: Option<Vec2>,
    pressed: bool,
    radius: f32,
    strength: f32,
}

impl PointerState {
    pub fn new(config: PointerConfig) -> Self {
        Self {
            config,
            pos: None,
            pressed: false,
            radius: config.radius,
            strength: config.strength,
        }
    }

    pub fn position(&self) -> Option<Vec2> {
        self.pos
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn move_to(&mut self, pos: Vec2) {
        self.pos = Some(pos);
    }

    pub fn leave(&mut self) {
        self.pos = None;
        self.pressed = false;
    }

    /// Pressing jumps straight to the amplified radius and strength
    pub fn press(&mut self) {
        self.pressed = true;
        self.radius = self.config.radius * self.config.press_radius_factor;
        self.strength = self.config.strength * self.config.press_strength_factor;
    }

    /// Releasing lets [`PointerState::relax`] bring them back to rest
    pub fn release(&mut self) {
        self.pressed = false;
    }

    /// One tick of recovery toward the resting radius and strength
    pub fn relax(&mut self) {
        if self.pressed {
            return;
        }
        let k = self.config.recovery;
        self.radius = relax_scalar(self.radius, self.config.radius, k);
        self.strength = relax_scalar(self.strength, self.config.strength, k);
    }

    pub fn pointer(&self, velocity: Vec2) -> Option<Pointer> {
        self.pos.map(|pos| Pointer {
            pos,
            radius: self.radius,
            strength: self.strength,
            velocity,
        })
    }
}

/// Input accumulated between two ticks
#[derive(Debug, Clone)]
pub struct InputState {
    pointer: PointerState,
    /// Pointer position at the previous drain, for velocity
    last_pos: Option<Vec2>,
    clicks: Vec<Vec2>,
    trail: Vec<Vec2>,
    scroll_y: f32,
    resize: Option<(f32, f32)>,
}

impl InputState {
    pub fn new(config: PointerConfig) -> Self {
        Self {
            pointer: PointerState::new(config),
            last_pos: None,
            clicks: Vec::new(),
            trail: Vec::new(),
            scroll_y: 0.0,
            resize: None,
        }
    }

    pub fn pointer_state(&self) -> &PointerState {
        &self.pointer
    }

    pub fn apply(&mut self, event: HostEvent) {
        match event {
            HostEvent::PointerMove { x, y } => {
                let pos = Vec2::new(x, y);
                if pos.is_finite() {
                    self.pointer.move_to(pos);
                    self.trail.push(pos);
                }
            }
            HostEvent::PointerLeave => self.pointer.leave(),
            HostEvent::PointerDown => self.pointer.press(),
            HostEvent::PointerUp => self.pointer.release(),
            HostEvent::Click { x, y } => {
                let pos = Vec2::new(x, y);
                if pos.is_finite() {
                    self.clicks.push(pos);
                }
            }
            HostEvent::Resize { width, height } => self.resize = Some((width, height)),
            HostEvent::Scroll { y } => {
                if y.is_finite() {
                    self.scroll_y = y;
                }
            }
        }
    }

    /// Latest resize since the last call; intermediate sizes are dropped
    pub fn take_resize(&mut self) -> Option<(f32, f32)> {
        self.resize.take()
    }

    /// Drain queued clicks and trail points into one frame's input
    pub fn take_frame(&mut self) -> FrameInput {
        let current = self.pointer.position();
        let velocity = match (self.last_pos, current) {
            (Some(prev), Some(now)) => now - prev,
            _ => Vec2::ZERO,
        };
        self.last_pos = current;

        let frame = FrameInput {
            pointer: self.pointer.pointer(velocity),
            clicks: std::mem::take(&mut self.clicks),
            trail: std::mem::take(&mut self.trail),
            scroll_y: self.scroll_y,
        };
        self.pointer.relax();
        frame
    }

    /// Forget everything queued, keeping configuration
    pub fn reset(&mut self) {
        *self = Self::new(self.pointer.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> InputState {
        InputState::new(PointerConfig::default())
    }

    #[test]
    fn test_leave_clears_pointer() {
        let mut state = input();
        state.apply(HostEvent::PointerMove { x: 10.0, y: 20.0 });
        assert!(state.take_frame().pointer.is_some());
        state.apply(HostEvent::PointerLeave);
        assert!(state.take_frame().pointer.is_none());
    }

    #[test]
    fn test_take_frame_drains_clicks_and_trail() {
        let mut state = input();
        state.apply(HostEvent::Click { x: 1.0, y: 2.0 });
        state.apply(HostEvent::Click { x: 3.0, y: 4.0 });
        state.apply(HostEvent::PointerMove { x: 5.0, y: 6.0 });
        let frame = state.take_frame();
        assert_eq!(frame.clicks, vec![Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)]);
        assert_eq!(frame.trail, vec![Vec2::new(5.0, 6.0)]);

        let next = state.take_frame();
        assert!(next.clicks.is_empty());
        assert!(next.trail.is_empty());
    }

    #[test]
    fn test_press_amplifies_then_recovers() {
        let config = PointerConfig::default();
        let mut state = input();
        state.apply(HostEvent::PointerMove { x: 0.0, y: 0.0 });
        state.apply(HostEvent::PointerDown);
        let pressed = state.take_frame().pointer.expect("pointer");
        assert_eq!(pressed.radius, config.radius * config.press_radius_factor);
        assert_eq!(pressed.strength, config.strength * config.press_strength_factor);

        assert!(state.pointer_state().is_pressed());

        state.apply(HostEvent::PointerUp);
        assert!(!state.pointer_state().is_pressed());
        let mut last = pressed.radius;
        for _ in 0..200 {
            let p = state.take_frame().pointer.expect("pointer");
            assert!(p.radius <= last);
            last = p.radius;
        }
        assert!((last - config.radius).abs() < 0.01);
    }

    #[test]
    fn test_velocity_is_displacement_between_frames() {
        let mut state = input();
        state.apply(HostEvent::PointerMove { x: 10.0, y: 10.0 });
        assert_eq!(state.take_frame().pointer.expect("pointer").velocity, Vec2::ZERO);
        state.apply(HostEvent::PointerMove { x: 14.0, y: 7.0 });
        state.apply(HostEvent::PointerMove { x: 20.0, y: 10.0 });
        assert_eq!(
            state.take_frame().pointer.expect("pointer").velocity,
            Vec2::new(10.0, 0.0)
        );
    }

    #[test]
    fn test_non_finite_events_ignored() {
        let mut state = input();
        state.apply(HostEvent::PointerMove { x: f32::NAN, y: 0.0 });
        state.apply(HostEvent::Click { x: 0.0, y: f32::INFINITY });
        let frame = state.take_frame();
        assert!(frame.pointer.is_none());
        assert!(frame.clicks.is_empty());
    }

    #[test]
    fn test_only_latest_resize_kept() {
        let mut state = input();
        state.apply(HostEvent::Resize { width: 100.0, height: 100.0 });
        state.apply(HostEvent::Resize { width: 300.0, height: 200.0 });
        assert_eq!(state.take_resize(), Some((300.0, 200.0)));
        assert_eq!(state.take_resize(), None);
    }
}
