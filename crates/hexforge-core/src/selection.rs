//! Hex selection with click, toggle, range and drag-rectangle semantics.

use crate::hex::{HexCoord, rect_between};
use crate::input::Modifiers;
use std::collections::BTreeSet;

/// Selected cells plus the state needed for range and drag selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected: BTreeSet<HexCoord>,
    /// Corner used by shift+click range selection.
    anchor: Option<HexCoord>,
    /// Cell under the pointer when the current drag started.
    drag_origin: Option<HexCoord>,
    /// Selection as it was when the current drag started.
    drag_snapshot: BTreeSet<HexCoord>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn contains(&self, coord: HexCoord) -> bool {
        self.selected.contains(&coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.selected.iter().copied()
    }

    pub fn anchor(&self) -> Option<HexCoord> {
        self.anchor
    }

    pub fn cells(&self) -> &BTreeSet<HexCoord> {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
        self.drag_origin = None;
        self.drag_snapshot.clear();
    }

    /// Remember the pre-drag selection and the drag origin. Called on pointer down.
    pub fn begin_drag(&mut self, origin: HexCoord) {
        self.drag_snapshot = self.selected.clone();
        self.drag_origin = Some(origin);
    }

    pub fn end_drag(&mut self) {
        self.drag_origin = None;
        self.drag_snapshot.clear();
    }

    /// Non-drag press on a cell.
    pub fn click(&mut self, target: HexCoord, modifiers: Modifiers) {
        if modifiers.shift {
            if let Some(anchor) = self.anchor {
                self.selected.extend(rect_between(anchor, target));
                return;
            }
        }
        if modifiers.command() {
            if !self.selected.remove(&target) {
                self.selected.insert(target);
            }
        } else {
            self.selected.clear();
            self.selected.insert(target);
        }
        self.anchor = Some(target);
    }

    /// Pointer dragged onto a new cell.
    ///
    /// Shift-drag shows the pre-drag selection plus the live rectangle from
    /// the drag origin; a plain drag paints cells into the selection.
    pub fn drag(&mut self, target: HexCoord, modifiers: Modifiers) {
        match (modifiers.shift, self.drag_origin) {
            (true, Some(origin)) => {
                let mut next = self.drag_snapshot.clone();
                next.extend(rect_between(origin, target));
                self.selected = next;
            }
            _ => {
                self.selected.insert(target);
                self.anchor = Some(target);
            }
        }
    }

    /// Replace the selection outright.
    pub fn set(&mut self, cells: impl IntoIterator<Item = HexCoord>) {
        self.selected = cells.into_iter().collect();
    }

    /// Drop cells that fail a predicate, e.g. cells outside the grid.
    pub fn retain(&mut self, keep: impl FnMut(&HexCoord) -> bool) {
        self.selected.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: Modifiers = Modifiers::NONE;
    const SHIFT: Modifiers = Modifiers { shift: true, ..Modifiers::NONE };
    const CTRL: Modifiers = Modifiers { ctrl: true, ..Modifiers::NONE };
    const META: Modifiers = Modifiers { meta: true, ..Modifiers::NONE };

    fn hex(q: i32, r: i32) -> HexCoord {
        HexCoord::new(q, r)
    }

    #[test]
    fn test_plain_click_is_singleton() {
        let mut sel = SelectionModel::new();
        sel.click(hex(1, 1), PLAIN);
        sel.click(hex(2, 2), PLAIN);
        assert_eq!(sel.len(), 1);
        assert!(sel.contains(hex(2, 2)));
        assert_eq!(sel.anchor(), Some(hex(2, 2)));
    }

    #[test]
    fn test_shift_click_unions_box() {
        let mut sel = SelectionModel::new();
        sel.click(hex(5, 5), PLAIN);
        sel.click(hex(0, 0), CTRL);
        sel.click(hex(1, 1), SHIFT);
        // anchor (0,0) to (1,1) plus the earlier (5,5)
        assert_eq!(sel.len(), 5);
        assert!(sel.contains(hex(5, 5)));
        assert!(sel.contains(hex(1, 0)));
        assert_eq!(sel.anchor(), Some(hex(0, 0)));
    }

    #[test]
    fn test_shift_click_without_anchor_is_plain() {
        let mut sel = SelectionModel::new();
        sel.click(hex(3, 3), SHIFT);
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.anchor(), Some(hex(3, 3)));
    }

    #[test]
    fn test_ctrl_and_meta_toggle() {
        let mut sel = SelectionModel::new();
        sel.click(hex(1, 1), PLAIN);
        sel.click(hex(2, 1), CTRL);
        assert_eq!(sel.len(), 2);
        sel.click(hex(1, 1), META);
        assert_eq!(sel.len(), 1);
        assert!(!sel.contains(hex(1, 1)));
        assert_eq!(sel.anchor(), Some(hex(1, 1)));
    }

    #[test]
    fn test_shift_drag_rectangle_is_live() {
        let mut sel = SelectionModel::new();
        sel.click(hex(9, 9), PLAIN);
        sel.begin_drag(hex(0, 0));
        sel.drag(hex(2, 2), SHIFT);
        assert_eq!(sel.len(), 10);
        // Shrinking the rectangle drops cells again.
        sel.drag(hex(1, 0), SHIFT);
        assert_eq!(sel.len(), 3);
        assert!(sel.contains(hex(9, 9)));
        assert!(!sel.contains(hex(2, 2)));
    }

    #[test]
    fn test_plain_drag_paints_selection() {
        let mut sel = SelectionModel::new();
        sel.click(hex(0, 0), PLAIN);
        sel.begin_drag(hex(0, 0));
        sel.drag(hex(1, 0), PLAIN);
        sel.drag(hex(2, 0), PLAIN);
        sel.drag(hex(1, 0), PLAIN);
        assert_eq!(sel.len(), 3);
        assert_eq!(sel.anchor(), Some(hex(1, 0)));
    }

    #[test]
    fn test_clear() {
        let mut sel = SelectionModel::new();
        sel.click(hex(0, 0), PLAIN);
        sel.clear();
        assert!(sel.is_empty());
        assert_eq!(sel.anchor(), None);
    }
}
