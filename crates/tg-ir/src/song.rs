//! Song structure: channels, subsongs, order lists and pattern pools.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::channel::{ChannelLayout, ChannelSettings, CollapseLevel, MAX_EFFECT_COLUMNS};
use crate::pattern::Pattern;

/// A complete song.
///
/// Channel layout lives on the song (it is shared by every subsong). Any
/// change to it bumps `layout_version`, which is the invalidation signal
/// views use to rebuild their cached column geometry.
#[derive(Clone, Debug)]
pub struct Song {
    /// Song title
    pub title: ArrayString<32>,
    channels: Vec<ChannelSettings>,
    subsongs: Vec<SubSong>,
    current_subsong: usize,
    layout_version: u64,
}

/// One entry in a subsong's order list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderRow {
    /// Pattern index per channel
    pub patterns: Vec<u16>,
    /// Overrides the subsong pattern length for this order
    pub length: Option<u16>,
}

/// An independent arrangement sharing the song's channels.
#[derive(Clone, Debug)]
pub struct SubSong {
    /// Subsong name
    pub name: ArrayString<32>,
    /// Rows per pattern (1-256 typical)
    pub pattern_length: u16,
    /// Playback order
    pub orders: Vec<OrderRow>,
    /// Pattern pool per channel, keyed by pattern index
    pools: Vec<BTreeMap<u16, Pattern>>,
}

impl SubSong {
    fn new(name: &str, pattern_length: u16, channels: usize) -> Self {
        Self {
            name: short_name(name),
            pattern_length: pattern_length.max(1),
            orders: alloc::vec![OrderRow {
                patterns: alloc::vec![0; channels],
                length: None,
            }],
            pools: alloc::vec![BTreeMap::new(); channels],
        }
    }

    /// Rows in the pattern played at `order`, 0 when the order does not exist.
    pub fn pattern_length_for(&self, order: u16) -> u16 {
        match self.orders.get(order as usize) {
            Some(row) => row.length.unwrap_or(self.pattern_length).max(1),
            None => 0,
        }
    }

    /// Pattern index assigned to (channel, order).
    pub fn pattern_index(&self, channel: u16, order: u16) -> Option<u16> {
        self.orders
            .get(order as usize)
            .and_then(|row| row.patterns.get(channel as usize))
            .copied()
    }

    fn add_channel(&mut self) {
        self.pools.push(BTreeMap::new());
        for row in &mut self.orders {
            row.patterns.push(0);
        }
    }
}

impl Song {
    /// Create a song with no channels and one empty subsong.
    pub fn new(title: &str) -> Self {
        Self {
            title: short_name(title),
            channels: Vec::new(),
            subsongs: alloc::vec![SubSong::new("", 64, 0)],
            current_subsong: 0,
            layout_version: 0,
        }
    }

    /// Create a song with `num_channels` channels and one order of `pattern_length` rows.
    pub fn with_channels(title: &str, num_channels: u16, pattern_length: u16) -> Self {
        let mut song = Self::new(title);
        song.subsongs[0].pattern_length = pattern_length.max(1);
        for i in 0..num_channels {
            song.add_channel(&format_channel_name(i));
        }
        song
    }

    // --- Channels ---

    /// Append a channel to the song and every subsong.
    pub fn add_channel(&mut self, name: &str) -> u16 {
        self.channels.push(ChannelSettings::new(name));
        for sub in &mut self.subsongs {
            sub.add_channel();
        }
        self.bump_layout();
        (self.channels.len() - 1) as u16
    }

    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    pub fn channels(&self) -> &[ChannelSettings] {
        &self.channels
    }

    pub fn channel_layout(&self, channel: u16) -> Option<ChannelLayout> {
        self.channels.get(channel as usize).map(|c| c.layout)
    }

    /// Set a channel's collapse level. Returns false for an unknown channel.
    pub fn set_collapse(&mut self, channel: u16, collapse: CollapseLevel) -> bool {
        self.update_layout(channel, |layout| layout.collapse = collapse)
    }

    /// Set a channel's effect column count, clamped to 1..=MAX_EFFECT_COLUMNS.
    pub fn set_effect_columns(&mut self, channel: u16, count: u8) -> bool {
        let count = count.clamp(1, MAX_EFFECT_COLUMNS);
        self.update_layout(channel, |layout| layout.effect_columns = count)
    }

    /// Show or hide a channel in the grid.
    pub fn set_visible(&mut self, channel: u16, visible: bool) -> bool {
        self.update_layout(channel, |layout| layout.visible = visible)
    }

    /// Incremented on every change to channel count or channel layout.
    pub fn layout_version(&self) -> u64 {
        self.layout_version
    }

    fn update_layout(&mut self, channel: u16, f: impl FnOnce(&mut ChannelLayout)) -> bool {
        let Some(settings) = self.channels.get_mut(channel as usize) else {
            return false;
        };
        let before = settings.layout;
        f(&mut settings.layout);
        if settings.layout != before {
            self.bump_layout();
        }
        true
    }

    fn bump_layout(&mut self) {
        self.layout_version = self.layout_version.wrapping_add(1);
    }

    // --- Subsongs ---

    pub fn subsong(&self) -> &SubSong {
        &self.subsongs[self.current_subsong]
    }

    pub fn subsong_mut(&mut self) -> &mut SubSong {
        &mut self.subsongs[self.current_subsong]
    }

    pub fn subsong_count(&self) -> usize {
        self.subsongs.len()
    }

    pub fn current_subsong(&self) -> usize {
        self.current_subsong
    }

    /// Add a subsong with one order; returns its index.
    pub fn add_subsong(&mut self, name: &str, pattern_length: u16) -> usize {
        self.subsongs
            .push(SubSong::new(name, pattern_length, self.channels.len()));
        self.subsongs.len() - 1
    }

    /// Switch the current subsong. Order count and lengths change with it,
    /// so views are told to resync.
    pub fn select_subsong(&mut self, index: usize) -> bool {
        if index >= self.subsongs.len() {
            return false;
        }
        if index != self.current_subsong {
            self.current_subsong = index;
            self.bump_layout();
        }
        true
    }

    // --- Orders ---

    pub fn order_count(&self) -> u16 {
        self.subsong().orders.len() as u16
    }

    pub fn pattern_length_for(&self, order: u16) -> u16 {
        self.subsong().pattern_length_for(order)
    }

    /// Append an order using the same pattern index on every channel.
    pub fn add_order(&mut self, pattern: u16) -> u16 {
        let channels = self.channels.len();
        let sub = self.subsong_mut();
        sub.orders.push(OrderRow {
            patterns: alloc::vec![pattern; channels],
            length: None,
        });
        (sub.orders.len() - 1) as u16
    }

    /// Override the pattern length of a single order (`None` restores the default).
    pub fn set_order_length(&mut self, order: u16, length: Option<u16>) -> bool {
        match self.subsong_mut().orders.get_mut(order as usize) {
            Some(row) => {
                row.length = length.map(|l| l.max(1));
                true
            }
            None => false,
        }
    }

    /// Point (channel, order) at a different pattern index.
    pub fn set_order_pattern(&mut self, channel: u16, order: u16, pattern: u16) -> bool {
        let slot = self
            .subsong_mut()
            .orders
            .get_mut(order as usize)
            .and_then(|row| row.patterns.get_mut(channel as usize));
        match slot {
            Some(slot) => {
                *slot = pattern;
                true
            }
            None => false,
        }
    }

    // --- Patterns ---

    /// Pattern assigned to (channel, order), if one has been created.
    pub fn pattern(&self, channel: u16, order: u16) -> Option<&Pattern> {
        let sub = self.subsong();
        let index = sub.pattern_index(channel, order)?;
        sub.pools.get(channel as usize)?.get(&index)
    }

    /// Pattern assigned to (channel, order), created empty on first use.
    /// Returns `None` only when the channel or order does not exist.
    pub fn pattern_or_create(&mut self, channel: u16, order: u16) -> Option<&mut Pattern> {
        let sub = self.subsong_mut();
        let index = sub.pattern_index(channel, order)?;
        let length = sub.pattern_length_for(order);
        let pool = sub.pools.get_mut(channel as usize)?;
        Some(pool.entry(index).or_insert_with(|| Pattern::new(length)))
    }
}

fn short_name(name: &str) -> ArrayString<32> {
    let mut s = ArrayString::new();
    for c in name.chars() {
        if s.try_push(c).is_err() {
            break;
        }
    }
    s
}

/// Format a channel name like "Channel 1", "Channel 2", etc.
fn format_channel_name(index: u16) -> ArrayString<32> {
    let mut name = ArrayString::new();
    let _ = core::fmt::Write::write_fmt(&mut name, format_args!("Channel {}", index + 1));
    name
}
