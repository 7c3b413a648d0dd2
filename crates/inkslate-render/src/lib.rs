//! Inkslate Render Library
//!
//! Frame building for Inkslate against a host-provided canvas surface.
//! The host implements [`Surface`]; [`SceneRenderer`] repaints whole
//! frames of engine state through it.

mod recording;
mod scene;
mod surface;

pub use recording::{CharWidthMeasurer, RecordedOp, RecordingSurface, CHAR_WIDTH_FACTOR};
pub use scene::{RenderOptions, SceneRenderer};
pub use surface::Surface;
