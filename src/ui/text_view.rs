//! Plain-text rendering of a pattern view's visible window.
//!
//! One line per visible row. Each sub-column is followed by a marker:
//! `<` on the cursor, `#` inside the selection, blank otherwise. Lines of
//! orders outside the song are drawn from the empty pattern with `~~~~`
//! in place of the position.

use std::fmt::Write;

use tg_grid::{PatternCache, PatternViewState, SongSource, SubColumn};

use super::cell_format::format_sub_column;

fn channel_text_width(view: &PatternViewState, channel: u16) -> usize {
    let shown = view.layout().sub_column_count(channel).unwrap_or(0);
    (0..shown)
        .map(|i| SubColumn::from_index(i).char_cells() as usize + 1)
        .sum()
}

/// Render the rows currently inside the view's viewport.
pub fn render_text<S: SongSource + ?Sized>(view: &PatternViewState, source: &S) -> String {
    let m = view.settings().metrics;
    let lh = m.line_height;
    let body = (view.viewport()[1] - m.header_height).max(0.0);
    let lines = (body / lh) as usize;
    let scroll = view.scroll_position();
    let cursor = view.cursor_address();
    let visible = view.layout().visible_channels();

    let mut out = String::new();
    out.push_str("     ");
    for &channel in visible {
        let label = format!("Ch{}", channel + 1);
        let _ = write!(out, "|{:<width$}", label, width = channel_text_width(view, channel));
    }
    out.push('\n');

    let mut cache = PatternCache::new();
    for line in 0..lines {
        let y = (line as f32 + 0.5) * lh;
        let order = scroll.order_at(source, lh, y);
        if line == 0 || cache.order() != order {
            cache.refresh(source, order);
        }
        let position = scroll.row_at(source, lh, y);
        let playhead = view
            .playhead_y()
            .map(|py| py - m.header_height)
            .is_some_and(|py| py <= y && y < py + lh);

        out.push(if playhead { '>' } else { ' ' });
        match position {
            Some((order, row)) => {
                let _ = write!(out, "{:02X}{:02X}", order, row);
            }
            None => out.push_str("~~~~"),
        }

        for &channel in visible {
            out.push('|');
            let row = position.map_or(0, |(_, row)| row);
            let cell = cache.cell(channel, row);
            let shown = view.layout().sub_column_count(channel).unwrap_or(0);
            for i in 0..shown {
                out.push_str(&format_sub_column(cell, SubColumn::from_index(i)));
                let marker = match position {
                    Some((order, row)) => {
                        let addr = tg_grid::CellAddress::new(order, row, channel, i);
                        if addr == cursor {
                            '<'
                        } else if view.is_selected(&addr) {
                            '#'
                        } else {
                            ' '
                        }
                    }
                    None => ' ',
                };
                out.push(marker);
            }
        }
        out.push('\n');
    }
    out
}
