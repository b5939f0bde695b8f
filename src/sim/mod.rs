//! Deterministic simulation module
//!
//! All particle and effect logic lives here. This module must be pure and deterministic:
//! - One call to `World::tick` is one fixed step (no `dt` scaling)
//! - Seeded RNG only
//! - Stable iteration order (pool index, effect spawn order)
//! - No rendering or platform dependencies; layers are handed to a `LayerSink`

pub mod ambient;
pub mod effects;
pub mod entity;
pub mod field;
pub mod pool;
pub mod proximity;
pub mod silhouette;
pub mod world;

pub use ambient::{AmbientLayer, NebulaOrb};
pub use effects::{Effect, EffectKind, EffectManager, EffectPhase};
pub use entity::{Entity, EntityKind};
pub use field::{FlowField, ForceField, Pointer, pointer_push};
pub use pool::{EntityPool, Spawner};
pub use proximity::{Connection, PointerLink, ProximityParams};
pub use silhouette::{Silhouette, SilhouetteMask};
pub use world::{FrameInput, Layer, LayerSink, TickStats, World};
