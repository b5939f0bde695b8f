//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (`input`, delivered through an `EventSource`)
//! - Listener teardown (`subscription`)
//! - Frame timing (`time`)
//! - Browser glue: DOM listeners, `requestAnimationFrame`, WebGPU surface (`web`)

pub mod input;
pub mod subscription;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{HostEvent, InputState, PointerState};
pub use subscription::{Disposer, EventSource, Listener, LocalEventBus, Subscriptions};
pub use time::{FrameCallback, FrameClock, FrameHandle, ManualClock};
