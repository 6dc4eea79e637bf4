//! Cursor navigator: the active cell and keyboard movement with wrap and carry.
//!
//! Horizontal movement walks visible sub-columns, carrying into the next or
//! previous visible channel; vertical movement walks rows, carrying into
//! adjacent orders. Each pattern may have its own length, so carries always
//! consult the song for the length of the order being entered.

use crate::address::CellAddress;
use crate::layout::ColumnLayout;
use crate::settings::{HorizontalWrap, VerticalWrap, WrapPolicy};
use crate::source::SongSource;

/// The active cell of one view.
#[derive(Clone, Copy, Debug)]
pub struct CursorNavigator {
    cursor: CellAddress,
    /// Sign of the last horizontal move; decides where a hidden channel snaps
    last_direction: i8,
}

impl Default for CursorNavigator {
    fn default() -> Self {
        Self::new(CellAddress::default())
    }
}

fn rows_in<S: SongSource + ?Sized>(source: &S, order: u16) -> i32 {
    source.pattern_length_for(order).max(1) as i32
}

/// Move `(order, row)` by `delta` rows under a vertical policy.
fn carry_rows<S: SongSource + ?Sized>(
    source: &S,
    order: u16,
    row: u16,
    delta: i32,
    policy: &WrapPolicy,
) -> (u16, u16) {
    let mut order = order;
    let mut row = row as i32 + delta;
    let len = rows_in(source, order);
    let crosses = policy.vertical == VerticalWrap::WrapToAdjacentOrder && policy.allow_order_change;

    if policy.vertical == VerticalWrap::WrapWithinOrder {
        row = row.rem_euclid(len);
    } else if !crosses {
        row = row.clamp(0, len - 1);
    } else {
        let last = source.order_count() - 1;
        loop {
            let len = rows_in(source, order);
            if row < 0 {
                if order > 0 {
                    order -= 1;
                } else if policy.around_song {
                    order = last;
                } else {
                    row = 0;
                    break;
                }
                row += rows_in(source, order);
            } else if row >= len {
                if order < last {
                    order += 1;
                } else if policy.around_song {
                    order = 0;
                } else {
                    row = len - 1;
                    break;
                }
                row -= len;
            } else {
                break;
            }
        }
    }
    (order, row as u16)
}

impl CursorNavigator {
    pub fn new(cursor: CellAddress) -> Self {
        Self { cursor, last_direction: 1 }
    }

    pub fn cursor(&self) -> CellAddress {
        self.cursor
    }

    /// Place the cursor without any checks. Follow with `revalidate`.
    pub fn set(&mut self, cursor: CellAddress) {
        self.cursor = cursor;
    }

    /// Move to a playback position, keeping the channel and column.
    pub fn set_row_position(&mut self, order: u16, row: u16) {
        self.cursor.order = order;
        self.cursor.row = row;
    }

    /// Cursor pulled back inside the song and onto a shown sub-column of a
    /// visible channel. `None` when there is nowhere to be.
    fn anchored<S: SongSource + ?Sized>(
        &self,
        layout: &ColumnLayout,
        source: &S,
    ) -> Option<CellAddress> {
        let order_count = source.order_count();
        if order_count == 0 {
            return None;
        }
        let mut at = self.cursor;
        at.channel = self.snap_target(layout)?;
        let columns = layout.sub_column_count(at.channel).ok()?;
        at.column = at.column.min(columns - 1);
        at.order = at.order.min(order_count - 1);
        at.row = at.row.min(rows_in(source, at.order) as u16 - 1);
        Some(at)
    }

    fn snap_target(&self, layout: &ColumnLayout) -> Option<u16> {
        let channel = self.cursor.channel;
        if layout.is_visible(channel) {
            return Some(channel);
        }
        let forward = if self.last_direction >= 0 {
            layout.next_visible(channel)
        } else {
            layout.prev_visible(channel)
        };
        forward.or_else(|| layout.nearest_visible(channel))
    }

    /// Put the cursor back on a visible channel, moving in the last
    /// horizontal direction, else to the nearest one. Returns true if the
    /// cursor moved.
    pub fn snap_to_visible(&mut self, layout: &ColumnLayout) -> bool {
        if layout.is_visible(self.cursor.channel) {
            return false;
        }
        let Some(channel) = self.snap_target(layout) else {
            return false;
        };
        self.cursor.channel = channel;
        if let Ok(columns) = layout.sub_column_count(channel) {
            self.cursor.column = self.cursor.column.min(columns - 1);
        }
        true
    }

    /// Clamp the cursor after the song or layout changed under it.
    pub fn revalidate<S: SongSource + ?Sized>(&mut self, layout: &ColumnLayout, source: &S) -> bool {
        match self.anchored(layout, source) {
            Some(at) if at != self.cursor => {
                self.cursor = at;
                true
            }
            _ => false,
        }
    }

    /// Where a move of `delta_columns` sub-columns then `delta_rows` rows
    /// would land. `None` if there is no visible channel or no order.
    pub fn resolve_move<S: SongSource + ?Sized>(
        &self,
        delta_columns: i32,
        delta_rows: i32,
        policy: &WrapPolicy,
        layout: &ColumnLayout,
        source: &S,
    ) -> Option<CellAddress> {
        let mut at = self.anchored(layout, source)?;
        let first = layout.first_visible()?;
        let last = layout.last_visible()?;
        let columns = |channel: u16| layout.sub_column_count(channel).unwrap_or(1);

        let forward = delta_columns > 0;
        for _ in 0..delta_columns.unsigned_abs() {
            if forward {
                if at.column + 1 < columns(at.channel) {
                    at.column += 1;
                    continue;
                }
                if let Some(next) = layout.next_visible(at.channel) {
                    at.channel = next;
                    at.column = 0;
                    continue;
                }
            } else {
                if at.column > 0 {
                    at.column -= 1;
                    continue;
                }
                if let Some(prev) = layout.prev_visible(at.channel) {
                    at.channel = prev;
                    at.column = columns(prev) - 1;
                    continue;
                }
            }

            // At the edge of the last/first visible channel.
            match policy.horizontal {
                HorizontalWrap::NoWrap => break,
                HorizontalWrap::WrapWithinRow => {}
                HorizontalWrap::WrapAndStepRow => {
                    let step = if forward { 1 } else { -1 };
                    let (order, row) = carry_rows(source, at.order, at.row, step, policy);
                    if (order, row) == (at.order, at.row) {
                        break;
                    }
                    at.order = order;
                    at.row = row;
                }
            }
            if forward {
                at.channel = first;
                at.column = 0;
            } else {
                at.channel = last;
                at.column = columns(last) - 1;
            }
        }

        if delta_rows != 0 {
            let (order, row) = carry_rows(source, at.order, at.row, delta_rows, policy);
            at.order = order;
            at.row = row;
        }
        Some(at)
    }

    /// Move the cursor. Returns true if it changed.
    pub fn move_cursor<S: SongSource + ?Sized>(
        &mut self,
        delta_columns: i32,
        delta_rows: i32,
        policy: &WrapPolicy,
        layout: &ColumnLayout,
        source: &S,
    ) -> bool {
        match self.resolve_move(delta_columns, delta_rows, policy, layout, source) {
            Some(at) => self.apply(at, delta_columns),
            None => false,
        }
    }

    /// Commit a target from `resolve_move`, remembering the direction taken.
    pub fn apply(&mut self, at: CellAddress, delta_columns: i32) -> bool {
        if delta_columns != 0 {
            self.last_direction = delta_columns.signum() as i8;
        }
        let moved = at != self.cursor;
        self.cursor = at;
        moved
    }

    /// Jump to the next visible channel, keeping the sub-column where it exists.
    pub fn next_channel<S: SongSource + ?Sized>(
        &mut self,
        wrap: bool,
        layout: &ColumnLayout,
        source: &S,
    ) -> bool {
        self.last_direction = 1;
        let Some(at) = self.anchored(layout, source) else {
            return false;
        };
        let target = layout
            .next_visible(at.channel)
            .or_else(|| wrap.then(|| layout.first_visible()).flatten());
        self.jump_channel(at, target, layout)
    }

    /// Jump to the previous visible channel, keeping the sub-column where it exists.
    pub fn prev_channel<S: SongSource + ?Sized>(
        &mut self,
        wrap: bool,
        layout: &ColumnLayout,
        source: &S,
    ) -> bool {
        self.last_direction = -1;
        let Some(at) = self.anchored(layout, source) else {
            return false;
        };
        let target = layout
            .prev_visible(at.channel)
            .or_else(|| wrap.then(|| layout.last_visible()).flatten());
        self.jump_channel(at, target, layout)
    }

    fn jump_channel(&mut self, mut at: CellAddress, target: Option<u16>, layout: &ColumnLayout) -> bool {
        let Some(channel) = target else {
            return false;
        };
        let columns = layout.sub_column_count(channel).unwrap_or(1);
        at.channel = channel;
        at.column = at.column.min(columns - 1);
        let moved = at != self.cursor;
        self.cursor = at;
        moved
    }

    /// Home: row 0, or the first channel's note column if already there.
    pub fn top<S: SongSource + ?Sized>(&mut self, layout: &ColumnLayout, source: &S) -> bool {
        let Some(mut at) = self.anchored(layout, source) else {
            return false;
        };
        if at.row != 0 {
            at.row = 0;
        } else if let Some(first) = layout.first_visible() {
            at.channel = first;
            at.column = 0;
        }
        let moved = at != self.cursor;
        self.cursor = at;
        moved
    }

    /// End: last row, or the last channel's last sub-column if already there.
    pub fn bottom<S: SongSource + ?Sized>(&mut self, layout: &ColumnLayout, source: &S) -> bool {
        let Some(mut at) = self.anchored(layout, source) else {
            return false;
        };
        let last_row = rows_in(source, at.order) as u16 - 1;
        if at.row != last_row {
            at.row = last_row;
        } else if let Some(last) = layout.last_visible() {
            at.channel = last;
            at.column = layout.sub_column_count(last).unwrap_or(1) - 1;
        }
        let moved = at != self.cursor;
        self.cursor = at;
        moved
    }

    /// Step down `rows` without leaving the pattern.
    pub fn advance<S: SongSource + ?Sized>(&mut self, rows: u16, layout: &ColumnLayout, source: &S) -> bool {
        let Some(mut at) = self.anchored(layout, source) else {
            return false;
        };
        let last_row = rows_in(source, at.order) as u16 - 1;
        at.row = at.row.saturating_add(rows).min(last_row);
        let moved = at != self.cursor;
        self.cursor = at;
        moved
    }
}
