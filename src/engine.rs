//! Frame scheduler and engine lifecycle
//!
//! One [`Engine`] owns one world. `start` binds it to a surface, a frame
//! clock and a host event source; every frame runs exactly one tick and then
//! re-arms the clock. `stop` cancels the pending frame and disposes every
//! listener, after which nothing in the world changes.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::error::{EngineError, LifecycleError, SurfaceError};
use crate::platform::input::{HostEvent, InputState};
use crate::platform::subscription::{EventSource, Listener, Subscriptions};
use crate::platform::time::{FrameClock, FrameHandle};
use crate::renderer::{Painter, Surface};
use crate::sim::{TickStats, World};

/// Lifecycle as seen by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, never started
    Idle,
    Running,
    /// Stopped explicitly or after the surface became unavailable
    Stopped,
}

enum FrameOutcome {
    Continue,
    Halt,
}

/// Everything a frame callback touches
struct LoopState {
    world: World,
    input: InputState,
    surface: Option<Box<dyn Surface>>,
    clock: Option<Rc<dyn FrameClock>>,
    subscriptions: Subscriptions,
    running: bool,
    /// Bumped on every halt so callbacks from an earlier run are ignored
    generation: u64,
    pending: Option<FrameHandle>,
    frames: u64,
    last_stats: TickStats,
    last_timestamp: f64,
}

impl LoopState {
    fn frame(&mut self, timestamp: f64) -> FrameOutcome {
        if let Some((width, height)) = self.input.take_resize() {
            self.world.resize(width, height);
            let size = self.world.size();
            if let Some(surface) = self.surface.as_mut() {
                surface.resize(size.x, size.y);
            }
        }

        let input = self.input.take_frame();
        let world = &mut self.world;
        let drawn = match self.surface.as_mut() {
            Some(surface) => draw_frame(world, surface.as_mut(), &input),
            None => Err(SurfaceError::Unavailable("no surface bound".into())),
        };

        self.frames += 1;
        self.last_timestamp = timestamp;
        match drawn {
            Ok(stats) => {
                self.last_stats = stats;
                FrameOutcome::Continue
            }
            Err(SurfaceError::Lost) => {
                log::warn!("Surface lost, reconfiguring");
                let size = self.world.size();
                if let Some(surface) = self.surface.as_mut() {
                    surface.resize(size.x, size.y);
                }
                FrameOutcome::Continue
            }
            Err(SurfaceError::Unavailable(reason)) => {
                log::error!("Surface unavailable, stopping: {}", reason);
                self.halt();
                FrameOutcome::Halt
            }
        }
    }

    /// Cancel the pending frame, dispose every listener and release the surface
    fn halt(&mut self) {
        self.running = false;
        self.generation += 1;
        if let Some(handle) = self.pending.take() {
            if let Some(clock) = &self.clock {
                clock.cancel_frame(handle);
            }
        }
        self.subscriptions.dispose_all();
        self.surface = None;
    }
}

fn draw_frame(
    world: &mut World,
    surface: &mut dyn Surface,
    input: &crate::sim::FrameInput,
) -> Result<TickStats, SurfaceError> {
    surface.begin_frame()?;
    let stats = {
        let mut painter = Painter::new(&mut *surface);
        world.tick(input, &mut painter)
    };
    surface.end_frame()?;
    Ok(stats)
}

/// Ask the clock for the next frame of the current run
fn schedule(state: &Rc<RefCell<LoopState>>) -> Result<(), EngineError> {
    let (clock, generation) = {
        let s = state.borrow();
        match &s.clock {
            Some(clock) => (Rc::clone(clock), s.generation),
            None => return Ok(()),
        }
    };
    let weak = Rc::downgrade(state);
    let handle = clock.request_frame(Box::new(move |timestamp| {
        if let Some(state) = weak.upgrade() {
            run_frame(&state, generation, timestamp);
        }
    }))?;
    state.borrow_mut().pending = Some(handle);
    Ok(())
}

fn run_frame(state: &Rc<RefCell<LoopState>>, generation: u64, timestamp: f64) {
    let outcome = {
        let Ok(mut s) = state.try_borrow_mut() else {
            log::warn!("Frame callback re-entered; skipping");
            return;
        };
        if !s.running || s.generation != generation {
            return;
        }
        s.pending = None;
        s.frame(timestamp)
    };

    if let FrameOutcome::Continue = outcome {
        if let Err(e) = schedule(state) {
            log::error!("Could not schedule next frame: {}", e);
            state.borrow_mut().halt();
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    state: Rc<RefCell<LoopState>>,
    started: bool,
}

impl Engine {
    /// Validate `config` and build the world. Nothing runs until `start`.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let world = World::new(config.clone())?;
        let state = LoopState {
            world,
            input: InputState::new(config.pointer),
            surface: None,
            clock: None,
            subscriptions: Subscriptions::new(),
            running: false,
            generation: 0,
            pending: None,
            frames: 0,
            last_stats: TickStats::default(),
            last_timestamp: 0.0,
        };
        Ok(Self {
            config,
            state: Rc::new(RefCell::new(state)),
            started: false,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Self::new(EngineConfig::from_json(json)?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        if !self.started {
            Phase::Idle
        } else if self.is_running() {
            Phase::Running
        } else {
            Phase::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.try_borrow().map(|s| s.running).unwrap_or(true)
    }

    /// Frames run since construction
    pub fn frames(&self) -> u64 {
        self.state.borrow().frames
    }

    pub fn last_stats(&self) -> TickStats {
        self.state.borrow().last_stats
    }

    /// Timestamp passed to the most recent frame, in milliseconds
    pub fn last_timestamp(&self) -> f64 {
        self.state.borrow().last_timestamp
    }

    /// Inspect the world between frames
    pub fn with_world<R>(&self, f: impl FnOnce(&World) -> R) -> R {
        f(&self.state.borrow().world)
    }

    /// Bind to `surface` and begin ticking once per `clock` frame.
    ///
    /// Starting a stopped engine starts over with a freshly seeded world.
    pub fn start(
        &mut self,
        surface: Box<dyn Surface>,
        clock: Rc<dyn FrameClock>,
        events: &dyn EventSource,
    ) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(LifecycleError::AlreadyRunning.into());
        }

        let size = surface.size();
        let world = World::with_size(self.config.clone(), size.x, size.y)?;
        {
            let mut s = self
                .state
                .try_borrow_mut()
                .map_err(|_| EngineError::Schedule("start called from inside a frame".into()))?;
            s.world = world;
            s.input.reset();
            s.surface = Some(surface);
            s.clock = Some(clock);
            s.pending = None;
            s.running = true;
        }

        let weak = Rc::downgrade(&self.state);
        let listener: Listener = Rc::new(move |event: HostEvent| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let Ok(mut s) = state.try_borrow_mut() else {
                log::debug!("Dropped {:?} delivered during a frame", event);
                return;
            };
            if s.running {
                s.input.apply(event);
            }
        });
        let disposer = events.subscribe(listener);
        self.state.borrow_mut().subscriptions.add(disposer);

        if let Err(e) = schedule(&self.state) {
            self.state.borrow_mut().halt();
            return Err(e);
        }

        self.started = true;
        let world_size = self.state.borrow().world.size();
        log::info!(
            "Engine started at {}x{} with {} entities",
            world_size.x,
            world_size.y,
            self.state.borrow().world.entities().len()
        );
        Ok(())
    }

    /// Cancel the pending frame and remove every listener.
    ///
    /// Repeated calls after a start are no-ops; a call before any start is
    /// rejected.
    pub fn stop(&mut self) -> Result<(), EngineError> {
        if !self.started {
            return Err(LifecycleError::NotStarted.into());
        }
        let mut s = self
            .state
            .try_borrow_mut()
            .map_err(|_| EngineError::Schedule("stop called from inside a frame".into()))?;
        if s.running {
            s.halt();
            log::info!("Engine stopped after {} frames", s.frames);
        }
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Ok(mut s) = self.state.try_borrow_mut() {
            if s.running {
                s.halt();
            }
        }
    }
}
