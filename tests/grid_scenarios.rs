//! End-to-end scenarios for the pattern grid: selection, wrap, layout,
//! follow and a live controller driving a view.

use std::time::{Duration, Instant};

use tg_grid::{
    normalize, CellAddress, ColumnLayout, FrameInput, GridMetrics, GridSettings, NavDirection,
    PatternViewState, SelectionTracker, Transport,
};
use tg_ir::{CollapseLevel, Song};
use tg_master::Controller;

fn addr(order: u16, row: u16, channel: u16, column: u8) -> CellAddress {
    CellAddress::new(order, row, channel, column)
}

fn view_for(song: &Song, settings: GridSettings, rows: f32) -> PatternViewState {
    let mut view = PatternViewState::new(settings);
    view.set_viewport(1200.0, 20.0 + rows * 16.0);
    view.tick(song, &FrameInput::stopped());
    view
}

#[test]
fn normalize_is_idempotent_and_commutative() {
    let pairs = [
        (addr(0, 0, 0, 0), addr(0, 0, 0, 0)),
        (addr(1, 5, 0, 4), addr(0, 9, 3, 1)),
        (addr(2, 0, 2, 0), addr(2, 0, 1, 6)),
        (addr(0, 63, 7, 2), addr(3, 1, 7, 2)),
    ];
    for (a, b) in pairs {
        let (lo, hi) = normalize(a, b);
        assert_eq!(normalize(b, a), (lo, hi));
        assert_eq!(normalize(lo, hi), (lo, hi));
        assert!(lo <= hi);
        assert!(lo.row_position() <= hi.row_position());
        assert!(lo.column_position() <= hi.column_position());
    }
}

#[test]
fn started_selection_contains_its_corners() {
    let mut sel = SelectionTracker::new(CellAddress::default());
    for (a, b) in [(addr(0, 3, 2, 1), addr(1, 0, 0, 4)), (addr(2, 2, 2, 2), addr(2, 2, 2, 2))] {
        sel.start_selection(a, false);
        assert!(sel.contains(&a));
        sel.update_selection(b);
        assert!(sel.contains(&a));
        assert!(sel.contains(&b));
        sel.finish_selection();
    }

    let p = addr(1, 2, 3, 1);
    sel.start_selection(p, false);
    assert!(sel.contains(&p));
    for q in [addr(1, 2, 3, 0), addr(1, 3, 3, 1), addr(0, 2, 3, 1), addr(1, 2, 2, 1)] {
        assert!(!sel.contains(&q));
    }
}

#[test]
fn selection_rows_carry_across_orders() {
    let mut sel = SelectionTracker::new(CellAddress::default());
    sel.start_selection(addr(0, 3, 0, 0), false);
    sel.update_selection(addr(1, 1, 0, 0));
    sel.finish_selection();
    assert!(sel.contains(&addr(0, 3, 0, 0)));
    assert!(sel.contains(&addr(1, 0, 0, 0)));
    assert!(!sel.contains(&addr(0, 2, 0, 0)));
    assert!(!sel.contains(&addr(1, 2, 0, 0)));
}

#[test]
fn wrapping_left_through_the_whole_song_returns_to_start() {
    let mut song = Song::with_channels("wrap", 4, 4);
    song.add_order(1);
    song.add_order(2);
    song.set_order_length(1, Some(6));
    song.set_visible(1, false);
    song.set_effect_columns(2, 2);
    song.set_collapse(3, CollapseLevel::NoVolume);

    let settings = GridSettings {
        wrap_around_song: true,
        ..GridSettings::default()
    };
    let mut view = view_for(&song, settings, 24.0);
    let rows: u32 = (0..song.order_count()).map(|o| song.pattern_length_for(o) as u32).sum();
    let steps = view.layout().total_visible_sub_columns() * rows;
    assert_eq!(steps, (5 + 7 + 2) * (4 + 6 + 4));

    for direction in [NavDirection::Left, NavDirection::Right] {
        for i in 0..steps {
            assert!(
                view.on_key_navigate(&song, direction, false, false),
                "{:?} step {} did not move",
                direction,
                i
            );
            assert!(view.layout().is_visible(view.cursor_address().channel));
        }
        assert_eq!(view.cursor_address(), CellAddress::default());
    }
}

#[test]
fn layout_is_monotonic_left_to_right() {
    let mut song = Song::with_channels("layout", 6, 16);
    song.set_visible(2, false);
    song.set_effect_columns(1, 4);
    song.set_collapse(4, CollapseLevel::NoteOnly);

    let mut layout = ColumnLayout::new(GridMetrics::default());
    assert!(layout.sync(&song));

    let mut last_right = layout.metrics().row_gutter_width;
    let mut last_key = None;
    for &channel in layout.visible_channels() {
        let origin = layout.channel_pixel_origin(channel).unwrap();
        assert!(origin >= last_right);
        let columns = layout.sub_column_count(channel).unwrap();
        for column in 0..columns {
            let (x, w) = layout.sub_column_span(channel, column).unwrap();
            assert!(x >= last_right && w > 0.0);
            last_right = x + w;
            let key = layout.column_key(channel, column).unwrap();
            assert!(last_key.map_or(true, |k| key > k));
            last_key = Some(key);
        }
        assert!(last_right <= origin + layout.pixel_width(channel).unwrap() + 0.001);
    }
    assert!(layout.content_width() >= last_right);

    for pair in layout.visible_channels().windows(2) {
        let (k, next) = (pair[0], pair[1]);
        let gap = layout.channel_pixel_origin(next).unwrap() - layout.channel_pixel_origin(k).unwrap();
        assert!((gap - layout.pixel_width(k).unwrap()).abs() < 0.001);
    }
}

#[test]
fn collapsing_a_channel_shrinks_it() {
    let mut song = Song::with_channels("collapse", 2, 16);
    song.set_effect_columns(0, 3);
    let mut layout = ColumnLayout::new(GridMetrics::default());
    layout.sync(&song);

    let mut previous = layout.pixel_width(0).unwrap();
    let neighbour = layout.channel_pixel_origin(1).unwrap();
    for level in 1..4 {
        song.set_collapse(0, CollapseLevel::from_level(level));
        assert!(layout.sync(&song));
        let width = layout.pixel_width(0).unwrap();
        assert!(width < previous, "level {} did not shrink", level);
        assert!(layout.channel_pixel_origin(1).unwrap() < neighbour);
        previous = width;
    }
}

#[test]
fn drag_selection_spans_an_order_boundary() {
    let mut song = Song::with_channels("orders", 3, 4);
    song.add_order(1);
    let mut view = view_for(&song, GridSettings::default(), 20.0);

    let from = view.cell_pixel_rect(&song, &addr(0, 2, 0, 0)).unwrap().center();
    let to = view.cell_pixel_rect(&song, &addr(1, 1, 1, 0)).unwrap().center();
    assert!(view.on_click(&song, from, false));
    assert!(view.on_drag_update(&song, to));
    view.on_drag_end();

    assert_eq!(view.selection().normalized(), (addr(0, 2, 0, 0), addr(1, 1, 1, 0)));
    assert!(view.is_selected(&addr(0, 3, 0, 3)));
    assert!(view.is_selected(&addr(1, 0, 1, 0)));
    assert!(!view.is_selected(&addr(1, 2, 0, 0)));
    assert!(!view.is_selected(&addr(0, 1, 1, 0)));
    assert!(!view.is_selected(&addr(1, 0, 1, 1)));
    assert_eq!(view.cursor_address(), addr(1, 1, 1, 0));
}

#[test]
fn following_keeps_a_block_and_moves_a_point() {
    let mut song = Song::with_channels("follow", 4, 16);
    song.add_order(1);
    let mut view = view_for(&song, GridSettings::default(), 20.0);

    view.on_key_navigate(&song, NavDirection::Right, true, false);
    view.on_key_navigate(&song, NavDirection::Down, true, false);
    let block = view.selection();
    assert!(!block.is_point());

    let report = view.tick(&song, &FrameInput::playing_at(1, 5));
    assert!(report.followed);
    assert_eq!(view.cursor_address().row_position(), (1, 5));
    assert_eq!(view.selection(), block);

    view.set_cursor_address(&song, addr(1, 5, 2, 0));
    view.tick(&song, &FrameInput::playing_at(1, 6));
    assert!(view.selection().is_point());
    assert_eq!(view.selection().head, addr(1, 6, 2, 0));
}

#[test]
fn hidden_channel_is_skipped() {
    let mut song = Song::with_channels("hidden", 4, 16);
    song.set_visible(2, false);
    let mut view = view_for(&song, GridSettings::default(), 20.0);

    view.set_cursor_address(&song, addr(0, 0, 1, 4));
    assert!(view.on_key_navigate(&song, NavDirection::Right, false, false));
    assert_eq!(view.cursor_address(), addr(0, 0, 3, 0));
    assert!(view.on_key_navigate(&song, NavDirection::Left, false, false));
    assert_eq!(view.cursor_address(), addr(0, 0, 1, 4));

    assert!(view.next_channel(&song));
    assert_eq!(view.cursor_address().channel, 3);
    assert!(view.prev_channel(&song));
    assert_eq!(view.cursor_address().channel, 1);

    let rect = view.cell_pixel_rect(&song, &addr(0, 0, 3, 0)).unwrap();
    assert_eq!(view.hit_test(&song, rect.center()), Some(addr(0, 0, 3, 0)));
    assert!(view.cell_pixel_rect(&song, &addr(0, 0, 2, 0)).is_none());
}

#[test]
fn view_follows_a_single_stepping_controller() {
    fn wait_until(mut f: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if f() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        false
    }

    let mut song = Song::with_channels("live", 2, 3);
    song.add_order(1);
    let mut ctrl = Controller::with_song(song);
    let mut view = view_for(ctrl.song(), GridSettings::default(), 12.0);

    ctrl.set_single_step(true);
    ctrl.play().unwrap();
    // Single stepping only follows once a step has completed.
    let report = view.tick(ctrl.song(), &FrameInput::sample(&ctrl));
    assert!(!report.followed);
    assert!(report.playhead_y.is_some());

    for expected in [(0, 1), (0, 2), (1, 0), (1, 1)] {
        ctrl.step_row().unwrap();
        let mut frame = FrameInput::default();
        assert!(wait_until(|| {
            frame = FrameInput::sample(&ctrl);
            frame.step_completed
        }));
        view.tick(ctrl.song(), &frame);
        assert_eq!(view.cursor_address().row_position(), expected);
        assert!(view.playhead_y().is_some());
    }

    // Keys may not leave the followed order.
    view.on_key_navigate(ctrl.song(), NavDirection::Down, false, false);
    view.on_key_navigate(ctrl.song(), NavDirection::Down, false, false);
    assert_eq!(view.cursor_address().order, 1);

    ctrl.stop();
    let report = view.tick(ctrl.song(), &FrameInput::sample(&ctrl));
    assert!(!report.followed);
    assert!(view.playhead_y().is_none());
    assert!(!ctrl.is_playing());
}
