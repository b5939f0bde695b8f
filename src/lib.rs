//! Ambient Field - interactive particle and force-field backgrounds
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity pool, forces, proximity, effects)
//! - `renderer`: Surface abstraction, CPU tessellation and the WebGPU pipeline
//! - `platform`: Host bindings (input events, frame clock, browser glue)
//! - `engine`: Frame scheduler and start/stop lifecycle
//! - `config`: Data-driven configuration, presets and validation

pub mod config;
pub mod engine;
pub mod error;
pub mod math;
pub mod palette;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use config::{EngineConfig, QualityPreset, Theme};
pub use engine::Engine;
pub use error::{ConfigError, EngineError, LifecycleError, Result, SurfaceError};

/// Engine-wide constants
pub mod consts {
    /// Smallest distance used as a divisor in force computations
    pub const MIN_DISTANCE: f32 = 1e-3;

    /// Pixels squared of surface area per entity for density-based populations
    pub const DEFAULT_AREA_PER_ENTITY: f32 = 9000.0;

    /// Attempts at rejection sampling a silhouette before falling back to its anchor point
    pub const SILHOUETTE_SAMPLE_ATTEMPTS: u32 = 64;

    /// Entity count above which the proximity pass switches to grid buckets
    pub const GRID_PROXIMITY_THRESHOLD: usize = 300;

    /// Default surface size used before the host reports one
    pub const FALLBACK_WIDTH: f32 = 800.0;
    pub const FALLBACK_HEIGHT: f32 = 600.0;
}
