//! `PatternViewState`: everything one pattern view owns.
//!
//! A host creates one per visible pattern panel, feeds it input events and
//! calls `tick` once per rendered frame. Two views never share cursor,
//! selection or scroll state.
//!
//! Within one input event the selection is updated before the cursor, so
//! `is_selected` queries later in the frame see both in agreement.

use log::debug;
use tg_ir::CollapseLevel;

use crate::address::CellAddress;
use crate::error::GridError;
use crate::follow::{Carry, FollowOutcome, ScrollPosition, ScrollSync};
use crate::layout::ColumnLayout;
use crate::navigator::CursorNavigator;
use crate::selection::{SelectionRange, SelectionTracker};
use crate::settings::{GridSettings, HorizontalWrap, ScrollChangesOrder, VerticalWrap, WrapPolicy};
use crate::source::{FrameInput, SongSource};

/// Axis-aligned rectangle in view pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> [f32; 2] {
        [self.x + self.w * 0.5, self.y + self.h * 0.5]
    }

    pub fn contains(&self, p: [f32; 2]) -> bool {
        p[0] >= self.x && p[0] < self.x + self.w && p[1] >= self.y && p[1] < self.y + self.h
    }
}

/// Keyboard direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Result of one `tick`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub layout_rebuilt: bool,
    pub followed: bool,
    pub scrolled: bool,
    /// Playhead Y in view pixels
    pub playhead_y: Option<f32>,
}

/// Cursor, selection, layout cache and scroll state of one pattern view.
#[derive(Clone, Debug)]
pub struct PatternViewState {
    settings: GridSettings,
    layout: ColumnLayout,
    selection: SelectionTracker,
    navigator: CursorNavigator,
    scroll: ScrollSync,
    scroll_x: f32,
    viewport: [f32; 2],
    playhead_y: Option<f32>,
    following: bool,
    playing: bool,
}

impl Default for PatternViewState {
    fn default() -> Self {
        Self::new(GridSettings::default())
    }
}

impl PatternViewState {
    pub fn new(settings: GridSettings) -> Self {
        let settings = settings.sanitized();
        Self {
            layout: ColumnLayout::new(settings.metrics),
            settings,
            selection: SelectionTracker::default(),
            navigator: CursorNavigator::default(),
            scroll: ScrollSync::default(),
            scroll_x: 0.0,
            viewport: [640.0, 480.0],
            playhead_y: None,
            following: false,
            playing: false,
        }
    }

    // --- Accessors ---

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Replace the settings; metrics changes rebuild the layout next sync.
    pub fn set_settings(&mut self, settings: GridSettings) {
        let settings = settings.sanitized();
        if settings.metrics != self.settings.metrics {
            self.layout.set_metrics(settings.metrics);
        }
        self.settings = settings;
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn selection(&self) -> SelectionRange {
        self.selection.range()
    }

    pub fn scroll_position(&self) -> ScrollPosition {
        self.scroll.position
    }

    pub fn scroll_x(&self) -> f32 {
        self.scroll_x
    }

    pub fn viewport(&self) -> [f32; 2] {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = [width.max(0.0), height.max(0.0)];
    }

    /// Playhead Y in view pixels, as of the last tick.
    pub fn playhead_y(&self) -> Option<f32> {
        self.playhead_y
    }

    /// True if the last tick moved the cursor to the playback position.
    pub fn is_following(&self) -> bool {
        self.following
    }

    fn line_height(&self) -> f32 {
        self.settings.metrics.line_height
    }

    fn body_height(&self) -> f32 {
        (self.viewport[1] - self.settings.metrics.header_height).max(0.0)
    }

    fn lead(&self) -> f32 {
        self.settings.dead_zone.top * self.body_height()
    }

    fn max_scroll_x(&self) -> f32 {
        (self.layout.content_width() - self.viewport[0]).max(0.0)
    }

    /// Bring layout and cursor in line with the song. Returns true if the
    /// layout was rebuilt.
    pub fn sync<S: SongSource + ?Sized>(&mut self, source: &S) -> bool {
        let rebuilt = self.layout.sync(source);
        self.navigator.revalidate(&self.layout, source);
        if rebuilt {
            debug!("view resynced to layout version {}", source.layout_version());
            self.scroll.position =
                self.scroll
                    .position
                    .carried(source, self.line_height(), self.lead(), Carry::Adjacent);
            self.scroll_x = self.scroll_x.clamp(0.0, self.max_scroll_x());
        }
        rebuilt
    }

    // --- Geometry ---

    /// Screen rectangle of a cell, relative to the current scroll.
    /// `None` for hidden or nonexistent positions.
    pub fn cell_pixel_rect<S: SongSource + ?Sized>(&self, source: &S, addr: &CellAddress) -> Option<Rect> {
        self.locate(source, addr).ok()
    }

    fn locate<S: SongSource + ?Sized>(&self, source: &S, addr: &CellAddress) -> Result<Rect, GridError> {
        if !self.layout.is_current(source) {
            return Err(GridError::StaleLayout);
        }
        if addr.order >= source.order_count() || addr.row >= source.pattern_length_for(addr.order) {
            return Err(GridError::OutOfRange { order: addr.order, row: addr.row });
        }
        let (x, w) = self.layout.sub_column_span(addr.channel, addr.column)?;
        let lh = self.line_height();
        let y = self.scroll.position.y_of(source, lh, addr.order, addr.row);
        Ok(Rect::new(
            x - self.scroll_x,
            y + self.settings.metrics.header_height,
            w,
            lh,
        ))
    }

    /// Cell under a view-space point. The header band, the row gutter,
    /// empty space and preview rows outside the song all return `None`, as
    /// does everything until `sync` has seen the song's latest layout.
    pub fn hit_test<S: SongSource + ?Sized>(&self, source: &S, point: [f32; 2]) -> Option<CellAddress> {
        if !self.layout.is_current(source) {
            return None;
        }
        let m = &self.settings.metrics;
        let [x, y] = point;
        if x < m.row_gutter_width || y < m.header_height || x >= self.viewport[0] || y >= self.viewport[1] {
            return None;
        }
        let grid_x = x + self.scroll_x;
        let channel = self.layout.channel_at(grid_x)?;
        let origin = self.layout.channel_pixel_origin(channel).ok()?;
        let column = self.layout.sub_column_at(channel, grid_x - origin).ok()?;
        let (order, row) = self
            .scroll
            .position
            .row_at(source, m.line_height, y - m.header_height)?;
        Some(CellAddress::new(order, row, channel, column))
    }

    pub fn is_selected(&self, addr: &CellAddress) -> bool {
        self.selection.contains(addr)
    }

    pub fn cursor_address(&self) -> CellAddress {
        self.navigator.cursor()
    }

    /// Place the cursor (clamped into the song) and drop the selection to it.
    pub fn set_cursor_address<S: SongSource + ?Sized>(&mut self, source: &S, addr: CellAddress) {
        self.layout.sync(source);
        let mut probe = self.navigator;
        probe.set(addr);
        probe.revalidate(&self.layout, source);
        self.selection.collapse_to(probe.cursor());
        self.navigator = probe;
    }

    // --- Pointer ---

    /// Button press. With `extend` (shift-click) the anchor is kept.
    pub fn on_click<S: SongSource + ?Sized>(&mut self, source: &S, point: [f32; 2], extend: bool) -> bool {
        self.sync(source);
        let Some(hit) = self.hit_test(source, point) else {
            return false;
        };
        self.selection.start_selection(hit, extend);
        self.navigator.set(hit);
        true
    }

    /// Pointer motion with the button held.
    pub fn on_drag_update<S: SongSource + ?Sized>(&mut self, source: &S, point: [f32; 2]) -> bool {
        let Some(hit) = self.hit_test(source, point) else {
            return false;
        };
        if !self.selection.update_selection(hit) {
            return false;
        }
        self.navigator.set(hit);
        true
    }

    /// Button release, or anything else that must freeze the selection.
    /// A block whose edge channel is collapsed grows to cover that channel's
    /// hidden sub-columns too.
    pub fn on_drag_end(&mut self) {
        self.selection.finish_selection();
        self.widen_collapsed_edges();
    }

    fn widen_collapsed_edges(&mut self) {
        let range = self.selection.range();
        if range.is_point() {
            return;
        }
        let collapsed = |channel: u16| {
            self.layout
                .channel_layout(channel)
                .ok()
                .filter(|l| l.collapse != CollapseLevel::Expanded)
        };
        let (mut lo, mut hi) = range.normalized();
        if collapsed(lo.channel).is_some() {
            lo.column = 0;
        }
        if let Some(layout) = collapsed(hi.channel) {
            hi.column = layout.addressable_columns() - 1;
        }
        if (lo, hi) != range.normalized() {
            self.selection.set_range(lo, hi);
        }
    }

    // --- Keyboard ---

    /// Run a navigator operation on a copy, update the selection to the
    /// result, then commit the cursor.
    fn navigate<S, F>(&mut self, source: &S, extend: bool, op: F) -> bool
    where
        S: SongSource + ?Sized,
        F: FnOnce(&mut CursorNavigator, &ColumnLayout) -> bool,
    {
        self.sync(source);
        let cursor = self.navigator.cursor();
        if extend && self.selection.range().head != cursor {
            self.selection.collapse_to(cursor);
        }
        let mut probe = self.navigator;
        let moved = op(&mut probe, &self.layout);
        let target = probe.cursor();
        if extend {
            self.selection.extend_to(target);
        } else {
            self.selection.collapse_to(target);
        }
        self.navigator = probe;
        if moved {
            self.ensure_cursor_visible(source);
        }
        moved
    }

    fn key_policy(&self, extend: bool) -> WrapPolicy {
        self.settings.wrap_policy(extend, !self.following)
    }

    /// Arrow keys. `coarse` moves by the coarse row step vertically and by
    /// whole channels horizontally. Extending a selection never wraps, and
    /// while playback is followed the order is not changed.
    pub fn on_key_navigate<S: SongSource + ?Sized>(
        &mut self,
        source: &S,
        direction: NavDirection,
        extend: bool,
        coarse: bool,
    ) -> bool {
        let policy = self.key_policy(extend);
        let wrap_channels = !extend && policy.horizontal != HorizontalWrap::NoWrap;
        let rows = if coarse {
            self.settings.coarse_step
        } else {
            self.settings.fine_rows()
        } as i32;
        self.navigate(source, extend, |nav, layout| match (direction, coarse) {
            (NavDirection::Left, true) => nav.prev_channel(wrap_channels, layout, source),
            (NavDirection::Right, true) => nav.next_channel(wrap_channels, layout, source),
            (NavDirection::Left, false) => nav.move_cursor(-1, 0, &policy, layout, source),
            (NavDirection::Right, false) => nav.move_cursor(1, 0, &policy, layout, source),
            (NavDirection::Up, _) => nav.move_cursor(0, -rows, &policy, layout, source),
            (NavDirection::Down, _) => nav.move_cursor(0, rows, &policy, layout, source),
        })
    }

    /// Tab.
    pub fn next_channel<S: SongSource + ?Sized>(&mut self, source: &S) -> bool {
        let wrap = self.settings.wrap_horizontal != HorizontalWrap::NoWrap;
        self.navigate(source, false, |nav, layout| nav.next_channel(wrap, layout, source))
    }

    /// Shift+Tab.
    pub fn prev_channel<S: SongSource + ?Sized>(&mut self, source: &S) -> bool {
        let wrap = self.settings.wrap_horizontal != HorizontalWrap::NoWrap;
        self.navigate(source, false, |nav, layout| nav.prev_channel(wrap, layout, source))
    }

    /// Home. A second press on row 0 goes to the first channel.
    pub fn cursor_top<S: SongSource + ?Sized>(&mut self, source: &S, extend: bool) -> bool {
        self.navigate(source, extend, |nav, layout| nav.top(layout, source))
    }

    /// End. A second press on the last row goes to the last channel.
    pub fn cursor_bottom<S: SongSource + ?Sized>(&mut self, source: &S, extend: bool) -> bool {
        self.navigate(source, extend, |nav, layout| nav.bottom(layout, source))
    }

    /// Step down by the edit step after data entry.
    pub fn edit_advance<S: SongSource + ?Sized>(&mut self, source: &S) -> bool {
        let step = self.settings.edit_step;
        self.navigate(source, false, |nav, layout| nav.advance(step, layout, source))
    }

    /// Grow the selection one stage: a partial block becomes full rows or
    /// full channels (whichever way it is longer), then both, then every
    /// visible channel. Returns false once everything is selected.
    pub fn select_all<S: SongSource + ?Sized>(&mut self, source: &S) -> bool {
        self.sync(source);
        let (Some(first), Some(last)) = (self.layout.first_visible(), self.layout.last_visible()) else {
            return false;
        };
        let order = self.navigator.cursor().order;
        let rows = source.pattern_length_for(order);
        if rows == 0 {
            return false;
        }
        let last_row = rows - 1;
        let columns = |channel: u16| self.layout.sub_column_count(channel).unwrap_or(1);

        let (mut lo, mut hi) = self.selection.range().normalized();
        let single_order = lo.order == order && hi.order == order;
        let full_rows = single_order && lo.row == 0 && hi.row == last_row;
        let full_columns = lo.column == 0 && hi.column + 1 >= columns(hi.channel);
        let every_channel = lo.channel == first && hi.channel == last;

        let grow_rows = |lo: &mut CellAddress, hi: &mut CellAddress| {
            lo.order = order;
            lo.row = 0;
            hi.order = order;
            hi.row = last_row;
        };
        let grow_columns = |lo: &mut CellAddress, hi: &mut CellAddress| {
            lo.column = 0;
            hi.column = columns(hi.channel) - 1;
        };

        match (full_rows, full_columns) {
            (true, true) if every_channel => return false,
            (true, true) => {
                lo.channel = first;
                hi.channel = last;
                grow_columns(&mut lo, &mut hi);
            }
            (true, false) => grow_columns(&mut lo, &mut hi),
            (false, true) => grow_rows(&mut lo, &mut hi),
            (false, false) => {
                let row_span = if single_order { (hi.row - lo.row) as u32 + 1 } else { u32::MAX };
                let column_span = match (
                    self.layout.column_key(lo.channel, lo.column),
                    self.layout.column_key(hi.channel, hi.column),
                ) {
                    (Ok(a), Ok(b)) => b.saturating_sub(a) + 1,
                    _ => 1,
                };
                if row_span >= column_span {
                    grow_rows(&mut lo, &mut hi);
                } else {
                    grow_columns(&mut lo, &mut hi);
                }
            }
        }
        self.selection.set_range(lo, hi);
        true
    }

    /// Wheel. Scrolls the view by `wheel_rows` per notch, crossing orders per
    /// `scroll_changes_order` while the transport is stopped; with `cursor_follows_wheel` the cursor moves
    /// instead (unless playback is being followed).
    pub fn on_wheel<S: SongSource + ?Sized>(&mut self, source: &S, delta_columns: i32, delta_rows: i32) -> bool {
        self.sync(source);
        let rows = delta_rows.saturating_mul(self.settings.wheel_rows as i32);
        // The transport owns the order while it plays.
        let mode = if self.playing {
            ScrollChangesOrder::No
        } else {
            self.settings.scroll_changes_order
        };

        if self.settings.cursor_follows_wheel && !self.following {
            let policy = WrapPolicy {
                horizontal: HorizontalWrap::NoWrap,
                vertical: match mode {
                    ScrollChangesOrder::No => VerticalWrap::NoWrap,
                    _ => VerticalWrap::WrapToAdjacentOrder,
                },
                around_song: mode == ScrollChangesOrder::WrapAroundSong,
                allow_order_change: true,
            };
            return self.navigate(source, false, |nav, layout| {
                nav.move_cursor(delta_columns, rows, &policy, layout, source)
            });
        }

        let mut moved = false;
        if rows != 0 {
            let (lh, lead) = (self.line_height(), self.lead());
            moved |= self.scroll.scroll_rows(rows, Carry::from(mode), lh, lead, source);
        }
        if delta_columns != 0 {
            let step = 2.0 * self.settings.metrics.char_width;
            let next = (self.scroll_x + delta_columns as f32 * step).clamp(0.0, self.max_scroll_x());
            moved |= next != self.scroll_x;
            self.scroll_x = next;
        }
        moved
    }

    /// Scroll so the cursor's sub-column is on screen with the configured
    /// margins.
    pub fn ensure_cursor_visible<S: SongSource + ?Sized>(&mut self, source: &S) {
        let cursor = self.navigator.cursor();
        let lh = self.line_height();
        let body = self.body_height();

        let margin_y = (self.settings.scroll_margin_rows as f32 * lh).min((body - lh).max(0.0) * 0.5);
        let y = self.scroll.position.y_of(source, lh, cursor.order, cursor.row);
        let dy = if y < margin_y {
            y - margin_y
        } else if y + lh > body - margin_y {
            y + lh - (body - margin_y)
        } else {
            0.0
        };
        if dy != 0.0 {
            let lead = self.lead();
            self.scroll.scroll_pixels(dy, lh, lead, source);
        }

        let Ok((x, w)) = self.layout.sub_column_span(cursor.channel, cursor.column) else {
            return;
        };
        let left = self.settings.metrics.row_gutter_width;
        let margin_x = self
            .settings
            .scroll_margin_x
            .min(((self.viewport[0] - left - w).max(0.0)) * 0.5);
        let screen_x = x - self.scroll_x;
        if screen_x + w > self.viewport[0] - margin_x {
            self.scroll_x += screen_x + w - (self.viewport[0] - margin_x);
        }
        let screen_x = x - self.scroll_x;
        if screen_x < left + margin_x {
            self.scroll_x -= left + margin_x - screen_x;
        }
        self.scroll_x = self.scroll_x.clamp(0.0, self.max_scroll_x());
    }

    // --- Frame ---

    /// Once per rendered frame, with the frame's single transport sample.
    pub fn tick<S: SongSource + ?Sized>(&mut self, source: &S, frame: &FrameInput) -> FrameReport {
        let layout_rebuilt = self.sync(source);
        let body = self.body_height();
        let lh = self.line_height();
        let FollowOutcome { followed, scrolled, playhead_y } = self.scroll.tick(
            frame,
            self.settings.follow_playback,
            &self.settings.dead_zone,
            body,
            lh,
            &mut self.navigator,
            &mut self.selection,
            source,
        );
        self.following = followed;
        self.playing = frame.playing;
        self.playhead_y = playhead_y.map(|y| y + self.settings.metrics.header_height);
        FrameReport {
            layout_rebuilt,
            followed,
            scrolled,
            playhead_y: self.playhead_y,
        }
    }
}
