//! Selection tracker: anchor/head pair and the drag state machine.

use crate::address::{normalize, rect_contains, CellAddress};

/// Where the selection gesture is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
    /// No gesture in progress
    #[default]
    Idle,
    /// Button held, head follows the pointer
    Dragging,
    /// Gesture ended, range kept until the next one starts
    Committed,
}

/// Where a selection started and where it currently ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionRange {
    pub anchor: CellAddress,
    pub head: CellAddress,
}

impl SelectionRange {
    pub const fn point(at: CellAddress) -> Self {
        Self { anchor: at, head: at }
    }

    pub fn is_point(&self) -> bool {
        self.anchor == self.head
    }

    /// Top-left and bottom-right corners.
    pub fn normalized(&self) -> (CellAddress, CellAddress) {
        normalize(self.anchor, self.head)
    }

    pub fn contains(&self, addr: &CellAddress) -> bool {
        let (low, high) = self.normalized();
        rect_contains(&low, &high, addr)
    }
}

/// Tracks one view's selection.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectionTracker {
    range: SelectionRange,
    state: SelectionState,
}

impl SelectionTracker {
    pub fn new(at: CellAddress) -> Self {
        Self {
            range: SelectionRange::point(at),
            state: SelectionState::Idle,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn range(&self) -> SelectionRange {
        self.range
    }

    pub fn is_point(&self) -> bool {
        self.range.is_point()
    }

    /// Begin a gesture. Without `extend` the selection restarts as a point;
    /// with it the anchor is kept and only the head moves.
    pub fn start_selection(&mut self, addr: CellAddress, extend: bool) {
        if extend {
            self.range.head = addr;
        } else {
            self.range = SelectionRange::point(addr);
        }
        self.state = SelectionState::Dragging;
    }

    /// Move the head while dragging. Ignored in any other state, so pointer
    /// motion after release leaves a committed range alone.
    pub fn update_selection(&mut self, addr: CellAddress) -> bool {
        if self.state != SelectionState::Dragging {
            return false;
        }
        self.range.head = addr;
        true
    }

    /// Freeze the current range, whatever the state.
    pub fn finish_selection(&mut self) {
        self.state = SelectionState::Committed;
    }

    /// Move the head without a drag (keyboard extension).
    pub fn extend_to(&mut self, addr: CellAddress) {
        self.range.head = addr;
        self.state = SelectionState::Committed;
    }

    /// Replace the whole range.
    pub fn set_range(&mut self, anchor: CellAddress, head: CellAddress) {
        self.range = SelectionRange { anchor, head };
        self.state = SelectionState::Committed;
    }

    /// Make the range the single cell `addr`, leaving the gesture state as is.
    pub fn reposition(&mut self, addr: CellAddress) {
        self.range = SelectionRange::point(addr);
    }

    /// Drop back to "only a cursor" at `addr`.
    pub fn collapse_to(&mut self, addr: CellAddress) {
        self.range = SelectionRange::point(addr);
        self.state = SelectionState::Idle;
    }

    /// Membership in the current range; a point range holds only its own cell.
    pub fn contains(&self, addr: &CellAddress) -> bool {
        self.range.contains(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(order: u16, row: u16, channel: u16, column: u8) -> CellAddress {
        CellAddress::new(order, row, channel, column)
    }

    #[test]
    fn fresh_point_contains_only_itself() {
        let mut sel = SelectionTracker::default();
        let p = addr(0, 4, 1, 2);
        sel.start_selection(p, false);
        assert!(sel.contains(&p));
        assert!(!sel.contains(&addr(0, 4, 1, 3)));
        assert!(!sel.contains(&addr(0, 5, 1, 2)));
        assert!(!sel.contains(&addr(1, 4, 1, 2)));
    }

    #[test]
    fn drag_moves_head_until_finished() {
        let mut sel = SelectionTracker::default();
        sel.start_selection(addr(0, 0, 0, 0), false);
        assert!(sel.update_selection(addr(0, 3, 1, 0)));
        assert_eq!(sel.state(), SelectionState::Dragging);
        sel.finish_selection();
        assert_eq!(sel.state(), SelectionState::Committed);

        // Pointer motion after release is ignored.
        assert!(!sel.update_selection(addr(0, 9, 3, 0)));
        assert_eq!(sel.range().head, addr(0, 3, 1, 0));
        assert!(sel.contains(&addr(0, 2, 0, 4)));
    }

    #[test]
    fn extend_keeps_anchor() {
        let mut sel = SelectionTracker::default();
        sel.start_selection(addr(0, 2, 0, 0), false);
        sel.finish_selection();
        sel.start_selection(addr(0, 6, 2, 0), true);
        assert_eq!(sel.range().anchor, addr(0, 2, 0, 0));
        assert_eq!(sel.range().head, addr(0, 6, 2, 0));
    }

    #[test]
    fn finish_from_idle_commits() {
        let mut sel = SelectionTracker::new(addr(0, 1, 0, 0));
        sel.finish_selection();
        assert_eq!(sel.state(), SelectionState::Committed);
        assert!(sel.is_point());
    }

    #[test]
    fn reversed_drag_is_a_rectangle() {
        let mut sel = SelectionTracker::default();
        sel.start_selection(addr(0, 5, 0, 3), false);
        sel.update_selection(addr(0, 1, 2, 0));
        sel.finish_selection();
        assert!(sel.contains(&addr(0, 3, 1, 0)));
        assert!(sel.contains(&addr(0, 5, 2, 0)));
        // Inside the row band but left of the column band.
        assert!(!sel.contains(&addr(0, 3, 0, 2)));
    }

    #[test]
    fn collapse_resets_to_idle_point() {
        let mut sel = SelectionTracker::default();
        sel.set_range(addr(0, 0, 0, 0), addr(0, 4, 2, 0));
        sel.collapse_to(addr(0, 7, 1, 1));
        assert_eq!(sel.state(), SelectionState::Idle);
        assert!(sel.contains(&addr(0, 7, 1, 1)));
        assert!(!sel.contains(&addr(0, 0, 0, 0)));
    }
}
