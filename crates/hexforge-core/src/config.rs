//! Editor configuration.

use crate::hex::{GridDims, HexCoord, MAP_HEIGHT, MAP_WIDTH};
use crate::movement::{DEFAULT_INPUT_BUFFER, DEFAULT_REPEAT_INTERVAL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session settings. Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub width: i32,
    pub height: i32,
    pub party_start: HexCoord,
    pub party_icon: String,
    pub move_buffer_ms: u64,
    pub move_repeat_ms: u64,
    /// Fixed seed for dice; random when unset.
    pub seed: Option<u64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            party_start: HexCoord::new(3, 3),
            party_icon: "shield".to_string(),
            move_buffer_ms: DEFAULT_INPUT_BUFFER.as_millis() as u64,
            move_repeat_ms: DEFAULT_REPEAT_INTERVAL.as_millis() as u64,
            seed: None,
        }
    }
}

impl EditorConfig {
    pub fn dims(&self) -> GridDims {
        GridDims::new(self.width.max(1), self.height.max(1))
    }

    pub fn move_buffer(&self) -> Duration {
        Duration::from_millis(self.move_buffer_ms)
    }

    pub fn move_repeat(&self) -> Duration {
        Duration::from_millis(self.move_repeat_ms)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
