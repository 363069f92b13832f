//! HexForge Core Library
//!
//! Map model, editing tools, history and encounter rules for the HexForge
//! hex-map editor. Rendering lives elsewhere.

pub mod activity;
pub mod config;
pub mod document;
pub mod encounter;
pub mod generation;
pub mod grid;
pub mod hex;
pub mod history;
pub mod input;
pub mod movement;
pub mod region;
pub mod selection;
pub mod session;
pub mod storage;
pub mod terrain;
pub mod tools;

pub use activity::{ActivityLog, LogEntry, Severity};
pub use config::EditorConfig;
pub use document::MapDocument;
pub use encounter::{DiceSource, EncounterOutcome, resolve};
pub use generation::{ContentGenerator, GenerationError, GenerationKind, GenerationRequest};
pub use grid::{GridStore, HexCell};
pub use hex::{GridDims, HEX_SIZE, HexCoord, MAP_HEIGHT, MAP_WIDTH};
pub use history::{HistoryManager, Snapshot};
pub use region::{
    DiceConfig, DieSize, FreqConfig, Region, RegionId, TableEntry, recalculate_ranges,
};
pub use selection::SelectionModel;
pub use session::{ConfirmPrompt, PartyState, Session};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use terrain::{Brush, RoadType, TerrainConfig, VOID_TERRAIN};
pub use tools::{ToolEffect, ToolKind, ToolManager};
