//! Inkslate Core Library
//!
//! Platform-agnostic interaction engine for the Inkslate infinite-canvas
//! whiteboard: viewport math, the element model, hand-drawn stroke
//! generation, hit testing, and the tool/gesture state machine. Rendering
//! and windowing live behind host-provided boundaries.

pub mod element;
pub mod engine;
pub mod eraser;
pub mod input;
pub mod selection;
pub mod sketch;
pub mod store;
pub mod text_edit;
pub mod tools;
pub mod viewport;

pub use element::{Element, ElementId, TextMeasurer};
pub use engine::Engine;
pub use eraser::EraserTracker;
pub use input::{Modifiers, PointerButton};
pub use selection::{Marquee, Selection};
pub use sketch::{Drawable, SketchOptions};
pub use store::{Store, SubscriptionId};
pub use text_edit::TextEditState;
pub use tools::{CursorHint, Gesture, Tool, UnknownTool};
pub use viewport::Viewport;
