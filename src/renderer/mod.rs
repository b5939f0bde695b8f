//! Rendering module
//!
//! The engine draws through the [`Surface`] trait. [`ShapeBatch`] tessellates
//! draw calls on the CPU; [`RenderState`] presents a batch with WebGPU.

pub mod batch;
pub mod draw;
pub mod pipeline;
pub mod shapes;
pub mod surface;
pub mod vertex;

pub use batch::{DrawStats, ShapeBatch, TextRun};
pub use draw::Painter;
pub use pipeline::RenderState;
pub use surface::Surface;
pub use vertex::Vertex;
