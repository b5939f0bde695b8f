//! Error types for the engine

use thiserror::Error;

/// Rejected configuration. Raised at construction, never clamped silently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("entity count must be at least 1, got {0}")]
    ZeroEntityCount(usize),

    #[error("area per entity must be a positive finite number, got {0}")]
    InvalidAreaPerEntity(f32),

    #[error("{field} must be a finite number >= 0, got {value}")]
    NegativeThreshold { field: &'static str, value: f32 },

    #[error("{field} must be a finite number > 0, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must be in [0, 1), got {value}")]
    FrictionOutOfRange { field: &'static str, value: f32 },

    #[error("damping constant must be >= 1 to converge, got {0}")]
    UnstableDamping(f32),

    #[error("{field} min ({min}) exceeds max ({max})")]
    InvertedRange { field: &'static str, min: f32, max: f32 },

    #[error("anchored star entities never move under the flow-field force; use the radial force or a moving style")]
    AnchoredUnderFlowField,

    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("silhouette polygon needs at least 3 points, got {0}")]
    DegenerateSilhouette(usize),

    #[error("invalid config JSON: {0}")]
    Json(String),
}

/// Misuse of the start/stop lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("engine is already running; call stop() before starting again")]
    AlreadyRunning,

    #[error("engine was never started")]
    NotStarted,
}

/// Rendering surface failures reported by a surface at frame end
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// Surface needs reconfiguring (e.g. swapchain lost); the loop keeps running
    #[error("surface lost")]
    Lost,

    /// Surface is gone (unmounted, out of memory); the loop stops
    #[error("surface unavailable: {0}")]
    Unavailable(String),
}

/// Umbrella error for engine operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("frame scheduling failed: {0}")]
    Schedule(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
