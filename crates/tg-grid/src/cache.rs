//! Per-frame pattern lookup table.

use heapless::Vec as FixedVec;
use tg_ir::{Cell, Pattern, EMPTY_PATTERN};

use crate::layout::MAX_CHANNELS;
use crate::source::SongSource;

/// Pattern for (channel, order), or the shared empty pattern when nothing
/// is assigned or `order` lies outside the song.
///
/// `order` is signed so that preview rows above order 0 can be looked up
/// the same way as real ones.
pub fn get_pattern<S: SongSource + ?Sized>(source: &S, channel: u16, order: i32) -> &Pattern {
    match u16::try_from(order) {
        Ok(order) if order < source.order_count() => {
            source.pattern(channel, order).unwrap_or(&EMPTY_PATTERN)
        }
        _ => &EMPTY_PATTERN,
    }
}

/// Patterns of one order, one slot per channel.
///
/// Refreshed once per drawn order before rendering; holds borrows into the
/// song for that frame only.
#[derive(Clone, Debug)]
pub struct PatternCache<'s> {
    order: i32,
    rows: u16,
    patterns: FixedVec<&'s Pattern, MAX_CHANNELS>,
}

impl<'s> PatternCache<'s> {
    pub fn new() -> Self {
        Self {
            order: -1,
            rows: 0,
            patterns: FixedVec::new(),
        }
    }

    /// Look up every channel's pattern for `order`.
    pub fn refresh<S: SongSource + ?Sized>(&mut self, source: &'s S, order: i32) {
        self.order = order;
        self.rows = u16::try_from(order)
            .map(|o| source.pattern_length_for(o))
            .unwrap_or(0);
        self.patterns.clear();
        let channels = (source.channel_count() as usize).min(MAX_CHANNELS) as u16;
        for channel in 0..channels {
            let _ = self.patterns.push(get_pattern(source, channel, order));
        }
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    /// Pattern length of the cached order; 0 if it does not exist.
    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn get(&self, channel: u16) -> &'s Pattern {
        self.patterns
            .get(channel as usize)
            .copied()
            .unwrap_or(&EMPTY_PATTERN)
    }

    pub fn cell(&self, channel: u16, row: u16) -> &'s Cell {
        self.get(channel).cell(row)
    }
}

impl Default for PatternCache<'_> {
    fn default() -> Self {
        Self::new()
    }
}
