//! Pointer and keyboard input types shared by the host adapters.
//!
//! The engine consumes these directly; mouse and touch adapters both feed
//! the same gesture paths in [`crate::engine::Engine`], so platform events
//! are never reconstructed downstream.

use serde::{Deserialize, Serialize};

/// Physical pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// The platform action modifier: Ctrl, or Cmd on macOS hosts.
    pub fn action(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn shift() -> Self {
        Modifiers {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Modifiers {
            ctrl: true,
            ..Self::NONE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_covers_ctrl_and_meta() {
        assert!(Modifiers::ctrl().action());
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert!(meta.action());
        assert!(!Modifiers::shift().action());
        assert!(!Modifiers::NONE.action());
    }
}
