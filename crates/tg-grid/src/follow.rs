//! Playback scroll synchronizer.
//!
//! The vertical scroll position is continuous across orders: the top of the
//! viewport is an order plus a pixel offset into it, and scrolling past a
//! pattern edge carries into the neighbouring order the same way the cursor
//! carries rows. Rows of the previous and next order therefore show above
//! and below the current one.

use log::trace;

use crate::navigator::CursorNavigator;
use crate::selection::{SelectionState, SelectionTracker};
use crate::settings::{DeadZone, ScrollChangesOrder};
use crate::source::{FrameInput, SongSource};

fn order_height<S: SongSource + ?Sized>(source: &S, order: u16, line_height: f32) -> f32 {
    source.pattern_length_for(order).max(1) as f32 * line_height
}

/// How a scroll position may cross pattern edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Carry {
    /// Stay inside the current order
    Clamp,
    /// Cross into adjacent orders, stop at the song ends
    Adjacent,
    /// Cross, cycling from the last order to the first and back
    AroundSong,
}

impl From<ScrollChangesOrder> for Carry {
    fn from(mode: ScrollChangesOrder) -> Self {
        match mode {
            ScrollChangesOrder::No => Carry::Clamp,
            ScrollChangesOrder::Yes => Carry::Adjacent,
            ScrollChangesOrder::WrapAroundSong => Carry::AroundSong,
        }
    }
}

/// Top of the viewport: an order and a pixel offset into its pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollPosition {
    pub order: u16,
    pub offset: f32,
}

impl ScrollPosition {
    pub const fn new(order: u16, offset: f32) -> Self {
        Self { order, offset }
    }

    /// Carry the offset into range.
    ///
    /// `lead` is how far above row 0 of the first order the view may start,
    /// so the first rows can sit inside the dead zone; the empty space above
    /// is drawn as preview rows.
    pub fn carried<S: SongSource + ?Sized>(
        mut self,
        source: &S,
        line_height: f32,
        lead: f32,
        carry: Carry,
    ) -> Self {
        let count = source.order_count();
        if count == 0 {
            return Self::default();
        }
        let last = count - 1;
        self.order = self.order.min(last);

        if carry == Carry::Clamp {
            let height = order_height(source, self.order, line_height);
            self.offset = self.offset.clamp(0.0, height - line_height);
            return self;
        }
        let around = carry == Carry::AroundSong;
        loop {
            let height = order_height(source, self.order, line_height);
            if self.offset < 0.0 {
                if self.order > 0 {
                    self.order -= 1;
                } else if around {
                    self.order = last;
                } else {
                    self.offset = self.offset.max(-lead);
                    break;
                }
                self.offset += order_height(source, self.order, line_height);
            } else if self.offset >= height {
                if self.order < last {
                    self.order += 1;
                } else if around {
                    self.order = 0;
                } else {
                    self.offset = height - line_height;
                    break;
                }
                self.offset -= height;
            } else {
                break;
            }
        }
        self
    }

    /// Y of the top of `(order, row)` relative to the viewport top.
    pub fn y_of<S: SongSource + ?Sized>(&self, source: &S, line_height: f32, order: u16, row: u16) -> f32 {
        let mut y = row as f32 * line_height - self.offset;
        if order >= self.order {
            for o in self.order..order {
                y += order_height(source, o, line_height);
            }
        } else {
            for o in order..self.order {
                y -= order_height(source, o, line_height);
            }
        }
        y
    }

    /// `(order, row)` drawn at `y` below the viewport top, if it exists.
    pub fn row_at<S: SongSource + ?Sized>(&self, source: &S, line_height: f32, y: f32) -> Option<(u16, u16)> {
        let count = source.order_count() as i32;
        let mut order = self.order as i32;
        if order >= count {
            return None;
        }
        let mut pos = self.offset + y;
        loop {
            if pos < 0.0 {
                order -= 1;
                if order < 0 {
                    return None;
                }
                pos += order_height(source, order as u16, line_height);
                continue;
            }
            let height = order_height(source, order as u16, line_height);
            if pos < height {
                break;
            }
            pos -= height;
            order += 1;
            if order >= count {
                return None;
            }
        }
        let row = libm::floorf(pos / line_height) as u16;
        Some((order as u16, row))
    }

    /// Signed order whose rows are drawn at `y`, including preview orders
    /// outside the song (`-1` above the first, `order_count` below the last).
    pub fn order_at<S: SongSource + ?Sized>(&self, source: &S, line_height: f32, y: f32) -> i32 {
        match self.row_at(source, line_height, y) {
            Some((order, _)) => order as i32,
            None if self.offset + y < 0.0 => -1,
            None => source.order_count() as i32,
        }
    }
}

/// Whether this frame's playback position should drive the cursor.
pub fn should_follow(enabled: bool, frame: &FrameInput) -> bool {
    enabled && frame.playing && (!frame.single_stepping || frame.step_completed)
}

/// Scroll needed to bring a row at `y` (height `line_height`) back inside
/// the dead zone of a viewport `height` tall; 0 when it already is.
pub fn dead_zone_delta(y: f32, line_height: f32, height: f32, zone: &DeadZone) -> f32 {
    let top = zone.top * height;
    let bottom = zone.bottom * height;
    if y < top {
        y - top
    } else if y + line_height > bottom {
        // A zone thinner than one row pins the row to the top edge.
        (y + line_height - bottom).min(y - top)
    } else {
        0.0
    }
}

/// What one synchronizer tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FollowOutcome {
    /// Cursor was moved to the playback position
    pub followed: bool,
    /// Viewport was scrolled
    pub scrolled: bool,
    /// Playhead Y relative to the viewport top while playing, if the
    /// position is in the song
    pub playhead_y: Option<f32>,
}

/// Vertical scroll state plus the per-frame follow procedure.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollSync {
    pub position: ScrollPosition,
}

impl ScrollSync {
    /// Run once per rendered frame with the frame's single transport sample.
    #[allow(clippy::too_many_arguments)]
    pub fn tick<S: SongSource + ?Sized>(
        &mut self,
        frame: &FrameInput,
        follow_enabled: bool,
        zone: &DeadZone,
        viewport_height: f32,
        line_height: f32,
        navigator: &mut CursorNavigator,
        selection: &mut SelectionTracker,
        source: &S,
    ) -> FollowOutcome {
        let mut outcome = FollowOutcome::default();
        let snap = frame.snapshot;
        let in_song = snap.order < source.order_count()
            && snap.row < source.pattern_length_for(snap.order);
        if !in_song {
            trace!("playback position {}:{} outside song, ignored", snap.order, snap.row);
            return outcome;
        }

        if should_follow(follow_enabled, frame) {
            navigator.set_row_position(snap.order, snap.row);
            if selection.state() == SelectionState::Dragging {
                trace!("follow leaves the selection to the drag in progress");
            } else if selection.is_point() {
                selection.reposition(navigator.cursor());
            } else {
                trace!("follow keeps multi-cell selection");
            }
            outcome.followed = true;

            let y = self.position.y_of(source, line_height, snap.order, snap.row);
            let delta = dead_zone_delta(y, line_height, viewport_height, zone);
            if delta != 0.0 {
                let lead = zone.top * viewport_height;
                let mut next = self.position;
                next.offset += delta;
                self.position = next.carried(source, line_height, lead, Carry::Adjacent);
                outcome.scrolled = true;
            }
        }

        if frame.playing {
            outcome.playhead_y = Some(self.position.y_of(source, line_height, snap.order, snap.row));
        }
        outcome
    }

    /// Scroll by whole rows (wheel). Returns true if the position changed.
    pub fn scroll_rows<S: SongSource + ?Sized>(
        &mut self,
        rows: i32,
        carry: Carry,
        line_height: f32,
        lead: f32,
        source: &S,
    ) -> bool {
        let mut next = self.position;
        next.offset += rows as f32 * line_height;
        let next = next.carried(source, line_height, lead, carry);
        let moved = next != self.position;
        self.position = next;
        moved
    }

    /// Scroll by a pixel amount, carrying across orders.
    pub fn scroll_pixels<S: SongSource + ?Sized>(&mut self, dy: f32, line_height: f32, lead: f32, source: &S) {
        let mut next = self.position;
        next.offset += dy;
        self.position = next.carried(source, line_height, lead, Carry::Adjacent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::CellAddress;
    use tg_ir::Song;

    const LH: f32 = 16.0;

    fn song(orders: u16, rows: u16) -> Song {
        let mut song = Song::with_channels("follow", 2, rows);
        for o in 1..orders {
            song.add_order(o);
        }
        song
    }

    #[test]
    fn carry_crosses_orders() {
        let song = song(3, 4);
        let p = ScrollPosition::new(0, 5.0 * LH).carried(&song, LH, 0.0, Carry::Adjacent);
        assert_eq!(p, ScrollPosition::new(1, LH));
        let p = ScrollPosition::new(2, -LH).carried(&song, LH, 0.0, Carry::Adjacent);
        assert_eq!(p, ScrollPosition::new(1, 3.0 * LH));
    }

    #[test]
    fn carry_stops_or_wraps_at_song_ends() {
        let song = song(2, 4);
        let p = ScrollPosition::new(1, 10.0 * LH).carried(&song, LH, 0.0, Carry::Adjacent);
        assert_eq!(p, ScrollPosition::new(1, 3.0 * LH));
        let p = ScrollPosition::new(0, -10.0 * LH).carried(&song, LH, 2.0 * LH, Carry::Adjacent);
        assert_eq!(p, ScrollPosition::new(0, -2.0 * LH));
        let p = ScrollPosition::new(1, 5.0 * LH).carried(&song, LH, 0.0, Carry::AroundSong);
        assert_eq!(p, ScrollPosition::new(0, LH));
        let p = ScrollPosition::new(0, 9.0 * LH).carried(&song, LH, 0.0, Carry::Clamp);
        assert_eq!(p, ScrollPosition::new(0, 3.0 * LH));
    }

    #[test]
    fn y_and_row_lookup_agree_across_orders() {
        let mut song = song(3, 4);
        song.set_order_length(1, Some(2));
        let p = ScrollPosition::new(1, LH);
        assert_eq!(p.y_of(&song, LH, 1, 1), 0.0);
        assert_eq!(p.y_of(&song, LH, 2, 0), LH);
        assert_eq!(p.y_of(&song, LH, 0, 3), -2.0 * LH);

        assert_eq!(p.row_at(&song, LH, 0.5), Some((1, 1)));
        assert_eq!(p.row_at(&song, LH, LH + 0.5), Some((2, 0)));
        assert_eq!(p.row_at(&song, LH, -LH - 0.5), Some((0, 3)));
        assert_eq!(p.row_at(&song, LH, 100.0 * LH), None);
        assert_eq!(p.order_at(&song, LH, 100.0 * LH), 3);
        assert_eq!(p.order_at(&song, LH, -100.0 * LH), -1);
    }

    #[test]
    fn follow_gate() {
        let mut f = FrameInput::playing_at(0, 0);
        assert!(should_follow(true, &f));
        assert!(!should_follow(false, &f));
        f.single_stepping = true;
        assert!(!should_follow(true, &f));
        f.step_completed = true;
        assert!(should_follow(true, &f));
        assert!(!should_follow(true, &FrameInput::stopped()));
    }

    #[test]
    fn dead_zone_keeps_row_inside_band() {
        let zone = DeadZone::default();
        assert_eq!(dead_zone_delta(100.0, LH, 320.0, &zone), 0.0);
        assert_eq!(dead_zone_delta(300.0, LH, 320.0, &zone), 300.0 + LH - 240.0);
        assert_eq!(dead_zone_delta(10.0, LH, 320.0, &zone), 10.0 - 80.0);
    }

    #[test]
    fn tick_follows_and_scrolls_into_next_order() {
        let song = song(2, 16);
        let mut sync = ScrollSync::default();
        let mut nav = CursorNavigator::new(CellAddress::new(0, 0, 1, 2));
        let mut sel = SelectionTracker::new(nav.cursor());
        let zone = DeadZone::default();

        let out = sync.tick(&FrameInput::playing_at(1, 10), true, &zone, 160.0, LH, &mut nav, &mut sel, &song);
        assert!(out.followed && out.scrolled);
        assert_eq!(nav.cursor(), CellAddress::new(1, 10, 1, 2));
        assert!(sel.is_point());
        assert_eq!(sel.range().head, nav.cursor());
        let y = out.playhead_y.unwrap();
        assert!(y >= zone.top * 160.0 && y + LH <= zone.bottom * 160.0);
        assert_eq!(sync.position.order, 1);
    }

    #[test]
    fn tick_keeps_multi_cell_selection() {
        let song = song(1, 16);
        let mut sync = ScrollSync::default();
        let mut nav = CursorNavigator::default();
        let mut sel = SelectionTracker::default();
        sel.set_range(CellAddress::new(0, 0, 0, 0), CellAddress::new(0, 1, 0, 0));
        let before = sel.range();

        let out = sync.tick(&FrameInput::playing_at(0, 5), true, &DeadZone::default(), 320.0, LH, &mut nav, &mut sel, &song);
        assert!(out.followed);
        assert_eq!(nav.cursor().row, 5);
        assert_eq!(sel.range(), before);
    }

    #[test]
    fn tick_moves_point_without_ending_its_gesture() {
        let song = song(1, 16);
        let mut sync = ScrollSync::default();
        let mut nav = CursorNavigator::default();
        let mut sel = SelectionTracker::default();
        sel.set_range(CellAddress::new(0, 2, 0, 0), CellAddress::new(0, 2, 0, 0));
        assert_eq!(sel.state(), SelectionState::Committed);

        sync.tick(&FrameInput::playing_at(0, 7), true, &DeadZone::default(), 320.0, LH, &mut nav, &mut sel, &song);
        assert_eq!(sel.range().head, CellAddress::new(0, 7, 0, 0));
        assert_eq!(sel.state(), SelectionState::Committed);

        sel.start_selection(CellAddress::new(0, 9, 1, 0), false);
        sync.tick(&FrameInput::playing_at(0, 8), true, &DeadZone::default(), 320.0, LH, &mut nav, &mut sel, &song);
        assert_eq!(sel.state(), SelectionState::Dragging);
        assert_eq!(sel.range().anchor, CellAddress::new(0, 9, 1, 0));
        assert!(sel.update_selection(CellAddress::new(0, 11, 1, 0)));
    }

    #[test]
    fn playhead_is_drawn_without_follow() {
        let song = song(1, 16);
        let mut sync = ScrollSync::default();
        let mut nav = CursorNavigator::default();
        let mut sel = SelectionTracker::default();
        let out = sync.tick(&FrameInput::playing_at(0, 4), false, &DeadZone::default(), 320.0, LH, &mut nav, &mut sel, &song);
        assert!(!out.followed);
        assert_eq!(out.playhead_y, Some(4.0 * LH));
        assert_eq!(nav.cursor().row, 0);

        let out = sync.tick(&FrameInput::playing_at(3, 0), true, &DeadZone::default(), 320.0, LH, &mut nav, &mut sel, &song);
        assert_eq!(out, FollowOutcome::default());
    }
}
