//! Input events for pointer, keyboard and focus.

use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
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

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event already resolved to the hex under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Button pressed over a cell.
    Down {
        hex: HexCoord,
        button: MouseButton,
        modifiers: Modifiers,
    },
    /// Pointer entered a new cell.
    Enter { hex: HexCoord, modifiers: Modifiers },
    /// Button released anywhere in the window.
    Up { button: MouseButton },
}

/// Keyboard and focus events. Keys use DOM-style names (`"ArrowUp"`, `"w"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed { key: String, modifiers: Modifiers },
    Released { key: String },
    /// The window lost focus.
    Blur,
}

/// One of the four party movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveKey {
    Up,
    Down,
    Left,
    Right,
}

impl MoveKey {
    /// Arrow keys and WASD, either case.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "w" | "W" => Some(MoveKey::Up),
            "ArrowDown" | "s" | "S" => Some(MoveKey::Down),
            "ArrowLeft" | "a" | "A" => Some(MoveKey::Left),
            "ArrowRight" | "d" | "D" => Some(MoveKey::Right),
            _ => None,
        }
    }

    /// Unit vector in screen space (`y` grows downward).
    pub fn vector(self) -> (i32, i32) {
        match self {
            MoveKey::Up => (0, -1),
            MoveKey::Down => (0, 1),
            MoveKey::Left => (-1, 0),
            MoveKey::Right => (1, 0),
        }
    }
}

/// Editor-level keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
}

impl Shortcut {
    /// Ctrl/Cmd+Z undoes, Ctrl/Cmd+Shift+Z and Ctrl/Cmd+Y redo.
    pub fn from_key(key: &str, modifiers: Modifiers) -> Option<Self> {
        if !modifiers.command() {
            return None;
        }
        match key {
            "z" | "Z" if modifiers.shift => Some(Shortcut::Redo),
            "z" | "Z" => Some(Shortcut::Undo),
            "y" | "Y" => Some(Shortcut::Redo),
            _ => None,
        }
    }
}
