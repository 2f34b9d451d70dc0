//! Rendering module for Markcard
//!
//! The measure-then-paint pipeline over an abstract drawing surface:
//! - Surface trait and the recording test double
//! - Text measurement cache
//! - Greedy line wrapping
//! - Node layout/paint engine
//! - Content-height estimation
//! - The paint-phase task queue

pub mod engine;
pub mod estimate;
pub mod measure;
pub mod queue;
pub mod surface;
pub mod wrap;

pub use engine::{render_nodes, RenderContext};
pub use estimate::estimate_height;
pub use measure::TextMeasureCache;
pub use queue::RenderQueue;
pub use surface::{DrawCommand, DrawSurface, RecordingSurface, TextMetrics};
pub use wrap::{wrap_text, TextLine};
