//! Tool system for the map editor.
//!
//! The tool manager turns pointer presses and drags into grid and selection
//! edits. Grid edits only raise a dirty flag; the session commits history
//! once when the pointer is released.

use crate::grid::GridStore;
use crate::hex::HexCoord;
use crate::input::Modifiers;
use crate::selection::SelectionModel;
use crate::terrain::{Brush, IconId};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Paint,
    Icon,
    Select,
    Party,
    /// Area selection that scopes generated content.
    Magic,
}

impl ToolKind {
    /// Tools that keep the hex selection alive.
    pub fn uses_selection(self) -> bool {
        matches!(self, ToolKind::Select | ToolKind::Magic)
    }
}

/// What a press or drag did, for the session to follow up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEffect {
    None,
    /// Grid cells changed; history is pending.
    Edited,
    SelectionChanged,
    /// The party should jump to this cell.
    MoveParty(HexCoord),
}

/// Manages the current tool and its drag state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// What the paint tool lays down.
    pub brush: Brush,
    /// Icon placed by the icon tool.
    pub active_icon: IconId,
    /// Last cell of a road being drawn.
    path_anchor: Option<HexCoord>,
    /// Whether the pointer is held down over the grid.
    pointer_down: bool,
    /// Grid changed since the last release.
    dirty: bool,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            brush: Brush::default(),
            active_icon: "village".to_string(),
            path_anchor: None,
            pointer_down: false,
            dirty: false,
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.path_anchor = None;
    }

    /// Check if a pointer interaction is in progress.
    pub fn is_active(&self) -> bool {
        self.pointer_down
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn path_anchor(&self) -> Option<HexCoord> {
        self.path_anchor
    }

    /// Pointer pressed on a cell.
    pub fn press(
        &mut self,
        hex: HexCoord,
        modifiers: Modifiers,
        grid: &mut GridStore,
        selection: &mut SelectionModel,
    ) -> ToolEffect {
        if !grid.contains(hex) {
            return ToolEffect::None;
        }
        self.pointer_down = true;

        match self.current_tool {
            ToolKind::Paint if self.brush.is_road_mode() => {
                self.path_anchor = Some(hex);
                ToolEffect::None
            }
            ToolKind::Paint | ToolKind::Icon => self.paint_cell(hex, grid),
            ToolKind::Select | ToolKind::Magic => {
                selection.begin_drag(hex);
                selection.click(hex, modifiers);
                ToolEffect::SelectionChanged
            }
            ToolKind::Party => ToolEffect::MoveParty(hex),
        }
    }

    /// Pointer moved onto another cell while held.
    pub fn drag(
        &mut self,
        hex: HexCoord,
        modifiers: Modifiers,
        grid: &mut GridStore,
        selection: &mut SelectionModel,
    ) -> ToolEffect {
        if !self.pointer_down || !grid.contains(hex) {
            return ToolEffect::None;
        }

        match self.current_tool {
            ToolKind::Paint if self.brush.is_road_mode() => self.extend_road(hex, grid),
            ToolKind::Paint | ToolKind::Icon => self.paint_cell(hex, grid),
            ToolKind::Select | ToolKind::Magic => {
                selection.drag(hex, modifiers);
                ToolEffect::SelectionChanged
            }
            ToolKind::Party => ToolEffect::None,
        }
    }

    /// Pointer released anywhere. Returns whether a history commit is due.
    pub fn release(&mut self, selection: &mut SelectionModel) -> bool {
        self.pointer_down = false;
        self.path_anchor = None;
        selection.end_drag();
        std::mem::take(&mut self.dirty)
    }

    fn paint_cell(&mut self, hex: HexCoord, grid: &mut GridStore) -> ToolEffect {
        let changed = match (self.current_tool, &self.brush) {
            (ToolKind::Icon, _) => grid.set_icon(hex, &self.active_icon),
            (_, Brush::Terrain(terrain)) => grid.set_terrain(hex, terrain),
            _ => false,
        };
        self.mark(changed)
    }

    /// Connect the anchor to `hex` and advance the anchor. Non-adjacent
    /// targets are ignored and leave the anchor in place.
    fn extend_road(&mut self, hex: HexCoord, grid: &mut GridStore) -> ToolEffect {
        let Some(anchor) = self.path_anchor else {
            return ToolEffect::None;
        };
        if anchor == hex || !anchor.is_neighbor(hex) {
            return ToolEffect::None;
        }
        let changed = match self.brush {
            Brush::Road(road) => grid.connect_road(anchor, hex, road),
            Brush::Bulldoze => grid.remove_road(anchor, hex),
            Brush::Terrain(_) => false,
        };
        self.path_anchor = Some(hex);
        self.mark(changed)
    }

    fn mark(&mut self, changed: bool) -> ToolEffect {
        if changed {
            self.dirty = true;
            ToolEffect::Edited
        } else {
            ToolEffect::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::GridDims;
    use crate::terrain::{NO_ICON, RoadType};

    fn setup() -> (ToolManager, GridStore, SelectionModel) {
        (
            ToolManager::new(),
            GridStore::new(GridDims::new(8, 8)),
            SelectionModel::new(),
        )
    }

    fn hex(q: i32, r: i32) -> HexCoord {
        HexCoord::new(q, r)
    }

    #[test]
    fn test_tool_selection() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Paint);
        tm.set_tool(ToolKind::Select);
        assert_eq!(tm.current_tool, ToolKind::Select);
        assert!(tm.current_tool.uses_selection());
        assert!(!ToolKind::Party.uses_selection());
    }

    #[test]
    fn test_paint_terrain_press_and_drag() {
        let (mut tm, mut grid, mut sel) = setup();
        tm.brush = Brush::Terrain("water".to_string());
        assert_eq!(tm.press(hex(1, 1), Modifiers::NONE, &mut grid, &mut sel), ToolEffect::Edited);
        tm.drag(hex(2, 1), Modifiers::NONE, &mut grid, &mut sel);
        assert_eq!(grid.count_terrain("water"), 2);
        assert!(tm.release(&mut sel));
        assert!(!tm.is_dirty());
    }

    #[test]
    fn test_drag_without_press_is_ignored() {
        let (mut tm, mut grid, mut sel) = setup();
        assert_eq!(tm.drag(hex(2, 1), Modifiers::NONE, &mut grid, &mut sel), ToolEffect::None);
        assert_eq!(grid.count_terrain("grass"), 0);
    }

    #[test]
    fn test_repainting_same_terrain_stays_clean() {
        let (mut tm, mut grid, mut sel) = setup();
        tm.brush = Brush::Terrain("void".to_string());
        tm.press(hex(1, 1), Modifiers::NONE, &mut grid, &mut sel);
        assert!(!tm.release(&mut sel));
    }

    #[test]
    fn test_icon_tool() {
        let (mut tm, mut grid, mut sel) = setup();
        tm.set_tool(ToolKind::Icon);
        tm.active_icon = "ruin".to_string();
        tm.press(hex(0, 0), Modifiers::NONE, &mut grid, &mut sel);
        tm.drag(hex(0, 1), Modifiers::NONE, &mut grid, &mut sel);
        assert_eq!(grid.get(hex(0, 1)).unwrap().icon, "ruin");
        assert_eq!(grid.get(hex(1, 1)).unwrap().icon, NO_ICON);
    }

    #[test]
    fn test_road_drag_draws_continuous_path() {
        let (mut tm, mut grid, mut sel) = setup();
        tm.brush = Brush::Road(RoadType::Trail);
        assert_eq!(tm.press(hex(1, 2), Modifiers::NONE, &mut grid, &mut sel), ToolEffect::None);
        assert!(!tm.is_dirty());
        tm.drag(hex(2, 2), Modifiers::NONE, &mut grid, &mut sel);
        tm.drag(hex(3, 2), Modifiers::NONE, &mut grid, &mut sel);
        assert_eq!(tm.path_anchor(), Some(hex(3, 2)));
        assert_eq!(grid.get(hex(2, 2)).unwrap().roads.len(), 2);
        assert!(grid.roads_symmetric());
    }

    #[test]
    fn test_road_jump_is_ignored() {
        let (mut tm, mut grid, mut sel) = setup();
        tm.brush = Brush::Road(RoadType::Paved);
        tm.press(hex(1, 2), Modifiers::NONE, &mut grid, &mut sel);
        assert_eq!(tm.drag(hex(5, 5), Modifiers::NONE, &mut grid, &mut sel), ToolEffect::None);
        assert_eq!(tm.path_anchor(), Some(hex(1, 2)));
        tm.drag(hex(2, 2), Modifiers::NONE, &mut grid, &mut sel);
        assert_eq!(grid.get(hex(1, 2)).unwrap().roads.get(&hex(2, 2)), Some(&RoadType::Paved));
    }

    #[test]
    fn test_bulldoze_removes_both_sides() {
        let (mut tm, mut grid, mut sel) = setup();
        grid.connect_road(hex(1, 1), hex(2, 1), RoadType::Rail);
        tm.brush = Brush::Bulldoze;
        tm.press(hex(2, 1), Modifiers::NONE, &mut grid, &mut sel);
        tm.drag(hex(1, 1), Modifiers::NONE, &mut grid, &mut sel);
        assert!(grid.cells().all(|(_, c)| c.roads.is_empty()));
        assert!(tm.release(&mut sel));
    }

    #[test]
    fn test_select_tool_updates_selection() {
        let (mut tm, mut grid, mut sel) = setup();
        tm.set_tool(ToolKind::Magic);
        tm.press(hex(0, 0), Modifiers::NONE, &mut grid, &mut sel);
        tm.drag(hex(1, 0), Modifiers::NONE, &mut grid, &mut sel);
        assert_eq!(sel.len(), 2);
        assert!(!tm.release(&mut sel));
    }

    #[test]
    fn test_party_press_requests_move() {
        let (mut tm, mut grid, mut sel) = setup();
        tm.set_tool(ToolKind::Party);
        assert_eq!(
            tm.press(hex(4, 4), Modifiers::NONE, &mut grid, &mut sel),
            ToolEffect::MoveParty(hex(4, 4))
        );
        assert_eq!(tm.drag(hex(4, 5), Modifiers::NONE, &mut grid, &mut sel), ToolEffect::None);
    }

    #[test]
    fn test_out_of_bounds_press_is_noop() {
        let (mut tm, mut grid, mut sel) = setup();
        assert_eq!(tm.press(hex(8, 0), Modifiers::NONE, &mut grid, &mut sel), ToolEffect::None);
        assert!(!tm.is_active());
    }
}
