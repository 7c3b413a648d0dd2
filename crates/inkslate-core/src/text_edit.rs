//! In-place text entry for the text tool.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::element::text::{self, Text};
use crate::element::TextMeasurer;
use crate::input::Modifiers;

/// Caret blink half-period in milliseconds.
pub const BLINK_PERIOD_MS: u64 = 500;

/// What a key press did to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKeyResult {
    /// Buffer changed or the key was consumed without effect.
    Handled,
    /// Enter: turn the buffer into a text element.
    Commit,
    /// Escape: drop the buffer.
    Discard,
}

/// A text entry session at a fixed world position. The buffer grows at
/// the end only; there is no cursor movement within the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEditState {
    pub position: Point,
    buffer: String,
}

impl TextEditState {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            buffer: String::new(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Apply one key press, using the key string as the host reports it.
    /// Every key is consumed while typing; unknown keys do nothing.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> TextKeyResult {
        match key {
            "Enter" if modifiers.shift => {
                self.buffer.push('\n');
                TextKeyResult::Handled
            }
            "Enter" => TextKeyResult::Commit,
            "Escape" => TextKeyResult::Discard,
            "Backspace" => {
                self.buffer.pop();
                TextKeyResult::Handled
            }
            _ => {
                // Printable keys arrive as their single character.
                let mut chars = key.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    self.buffer.push(c);
                }
                TextKeyResult::Handled
            }
        }
    }

    /// Lines as they will be painted, split on `\n`.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.buffer.split('\n')
    }

    pub fn line_height(&self) -> f64 {
        text::DEFAULT_FONT_SIZE * text::LINE_HEIGHT_FACTOR
    }

    /// World position of the caret: after the last line's measured width,
    /// at the top of the last line.
    pub fn caret_position(&self, measurer: &dyn TextMeasurer) -> Point {
        let last_line = self.buffer.split('\n').next_back().unwrap_or("");
        let line_index = self.buffer.split('\n').count().saturating_sub(1);
        let x = self.position.x
            + measurer.measure(last_line, text::DEFAULT_FONT_SIZE, text::FONT_FAMILY);
        let y = self.position.y + line_index as f64 * self.line_height();
        Point::new(x, y)
    }

    /// Blink phase, sampled at draw time.
    pub fn caret_visible(now_ms: u64) -> bool {
        (now_ms / BLINK_PERIOD_MS) % 2 == 1
    }

    /// Finish the session. Whitespace-only input produces no element; the
    /// committed element keeps the raw, untrimmed buffer.
    pub fn commit(self, measurer: &dyn TextMeasurer) -> Option<Text> {
        if self.buffer.trim().is_empty() {
            return None;
        }
        Some(Text::new(self.position, self.buffer, measurer))
    }
}
