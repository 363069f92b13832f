//! Linear undo/redo history of full map snapshots.

use crate::grid::GridStore;
use crate::region::RegionMap;
use crate::terrain::TerrainPalette;

/// Immutable copy of the undoable map state.
///
/// Grid rows are shared with the live grid until either side writes to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub grid: GridStore,
    pub regions: RegionMap,
    pub terrains: TerrainPalette,
}

/// Ordered snapshots with a cursor at the visible state.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    entries: Vec<Snapshot>,
    cursor: usize,
}

impl HistoryManager {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// Drop everything and start over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.entries = vec![initial];
        self.cursor = 0;
    }

    /// Append a snapshot after the cursor, discarding any redo branch.
    pub fn commit(&mut self, grid: &GridStore, regions: &RegionMap, terrains: &TerrainPalette) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(Snapshot {
            grid: grid.clone(),
            regions: regions.clone(),
            terrains: terrains.clone(),
        });
        self.cursor = self.entries.len() - 1;
        log::debug!("History commit, {} entries", self.entries.len());
    }

    /// Step back one entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
