//! Tool palette and the gesture state machine.

use std::fmt;
use std::str::FromStr;

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selection::Marquee;
use crate::text_edit::TextEditState;

/// Raised when a palette name does not match any tool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool: {0}")]
pub struct UnknownTool(pub String);

/// Cursor the host should show for the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Grab,
    Crosshair,
    Default,
    /// The eraser draws its own ring cursor.
    Hidden,
}

impl CursorHint {
    /// CSS cursor keyword, the form hosts consume directly.
    pub fn name(&self) -> &'static str {
        match self {
            CursorHint::Grab => "grab",
            CursorHint::Crosshair => "crosshair",
            CursorHint::Default => "default",
            CursorHint::Hidden => "none",
        }
    }
}

/// The tool palette. `Picture` and `Color` are reserved entries: they can
/// be selected but pointer input does nothing with them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    Hand,
    Rectangle,
    Circle,
    Diamond,
    Arrow,
    Dash,
    Draw,
    Text,
    Eraser,
    #[default]
    Select,
    Picture,
    Color,
}

impl Tool {
    /// Every palette entry, in palette order.
    pub const ALL: [Tool; 12] = [
        Tool::Hand,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Diamond,
        Tool::Arrow,
        Tool::Dash,
        Tool::Draw,
        Tool::Text,
        Tool::Eraser,
        Tool::Select,
        Tool::Picture,
        Tool::Color,
    ];

    /// The palette name, also the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Hand => "Hand",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Diamond => "Diamond",
            Tool::Arrow => "Arrow",
            Tool::Dash => "Dash",
            Tool::Draw => "Draw",
            Tool::Text => "Text",
            Tool::Eraser => "Eraser",
            Tool::Select => "Select",
            Tool::Picture => "Picture",
            Tool::Color => "Color",
        }
    }

    pub fn cursor(&self) -> CursorHint {
        match self {
            Tool::Hand => CursorHint::Grab,
            Tool::Eraser => CursorHint::Hidden,
            Tool::Select => CursorHint::Default,
            _ => CursorHint::Crosshair,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .iter()
            .find(|tool| tool.name() == s)
            .copied()
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

/// What the pointer is currently doing. Exactly one gesture is active at
/// a time; anything transient the gesture needs rides inside its variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    /// Pan anchor: `screen - offset` at press time.
    Panning { anchor: Vec2 },
    /// World points captured so far by the draw tool.
    Drawing { path: Vec<Point> },
    /// World corner where the shape drag began.
    PlacingShape { anchor: Point },
    Selecting { marquee: Marquee },
    /// Drag refs (element id, grab offset) live in the engine stores.
    Dragging,
    Typing { editor: TextEditState },
    Erasing,
}

impl Gesture {
    /// Short label for logs; variant payloads can be large.
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Panning { .. } => "panning",
            Gesture::Drawing { .. } => "drawing",
            Gesture::PlacingShape { .. } => "placing-shape",
            Gesture::Selecting { .. } => "selecting",
            Gesture::Dragging => "dragging",
            Gesture::Typing { .. } => "typing",
            Gesture::Erasing => "erasing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}
