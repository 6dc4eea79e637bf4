//! Column layout engine: sub-column counts, pixel widths and origins.
//!
//! Geometry is cached per channel and rebuilt only when the song's layout
//! version moves. The cache is fixed-capacity so a steady-state frame does
//! not touch the heap.

use heapless::Vec as FixedVec;
use log::{debug, warn};
use tg_ir::{ChannelLayout, CollapseLevel, MAX_EFFECT_COLUMNS};

use crate::address::SubColumn;
use crate::error::GridError;
use crate::settings::GridMetrics;
use crate::source::SongSource;

/// Most channels a view lays out; extra channels are ignored.
pub const MAX_CHANNELS: usize = 128;

/// Sub-columns shown for a channel layout.
pub fn sub_column_count_for(layout: &ChannelLayout) -> u8 {
    let mut count = 1;
    if layout.collapse < CollapseLevel::NoteOnly {
        count += 1;
    }
    if layout.collapse < CollapseLevel::NoVolume {
        count += 1;
    }
    if layout.collapse < CollapseLevel::NoEffects {
        count += 2 * layout.effect_columns.min(MAX_EFFECT_COLUMNS);
    }
    count
}

/// Pixel width of one sub-column kind, spacing included.
pub fn sub_column_width(metrics: &GridMetrics, kind: SubColumn) -> f32 {
    let spacing = match kind {
        SubColumn::Note => metrics.spacing.note,
        SubColumn::Instrument => metrics.spacing.instrument,
        SubColumn::Volume => metrics.spacing.volume,
        SubColumn::EffectType(_) => metrics.spacing.effect_type,
        SubColumn::EffectValue(_) => metrics.spacing.effect_value,
    };
    kind.char_cells() as f32 * metrics.char_width + spacing
}

/// Pixel width of a whole channel band.
pub fn channel_width_for(metrics: &GridMetrics, layout: &ChannelLayout) -> f32 {
    (0..sub_column_count_for(layout))
        .map(|i| sub_column_width(metrics, SubColumn::from_index(i)))
        .sum()
}

#[derive(Clone, Copy, Debug)]
struct ChannelGeometry {
    layout: ChannelLayout,
    sub_columns: u8,
    origin: f32,
    width: f32,
    /// First linear column key of this channel
    key_offset: u32,
}

/// Cached per-channel geometry for one view.
#[derive(Clone, Debug)]
pub struct ColumnLayout {
    metrics: GridMetrics,
    channels: FixedVec<ChannelGeometry, MAX_CHANNELS>,
    visible: FixedVec<u16, MAX_CHANNELS>,
    synced_version: Option<u64>,
    content_width: f32,
}

impl ColumnLayout {
    pub fn new(metrics: GridMetrics) -> Self {
        Self {
            metrics,
            channels: FixedVec::new(),
            visible: FixedVec::new(),
            synced_version: None,
            content_width: metrics.row_gutter_width,
        }
    }

    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    /// Replace the metrics; geometry is rebuilt on the next sync.
    pub fn set_metrics(&mut self, metrics: GridMetrics) {
        self.metrics = metrics;
        self.synced_version = None;
    }

    /// Rebuild if the song's layout changed since the last sync.
    /// Returns true when a rebuild happened.
    pub fn sync<S: SongSource + ?Sized>(&mut self, source: &S) -> bool {
        let version = source.layout_version();
        if self.synced_version == Some(version) {
            return false;
        }
        self.rebuild(source);
        self.synced_version = Some(version);
        true
    }

    /// True if the cached geometry matches the song's current layout version.
    pub fn is_current<S: SongSource + ?Sized>(&self, source: &S) -> bool {
        self.synced_version == Some(source.layout_version())
    }

    fn rebuild<S: SongSource + ?Sized>(&mut self, source: &S) {
        let total = source.channel_count();
        if total as usize > MAX_CHANNELS {
            warn!("song has {} channels, laying out the first {}", total, MAX_CHANNELS);
        }
        let count = (total as usize).min(MAX_CHANNELS) as u16;

        self.channels.clear();
        self.visible.clear();
        let mut x = self.metrics.row_gutter_width;
        let mut key = 0u32;
        for ch in 0..count {
            let mut layout = source
                .channel_layout(ch)
                .unwrap_or(ChannelLayout { visible: false, ..ChannelLayout::default() });
            layout.effect_columns = layout.effect_columns.clamp(1, MAX_EFFECT_COLUMNS);
            let sub_columns = sub_column_count_for(&layout);
            let width = if layout.visible {
                channel_width_for(&self.metrics, &layout)
            } else {
                0.0
            };
            // Both pushes are bounded by MAX_CHANNELS above.
            let _ = self.channels.push(ChannelGeometry {
                layout,
                sub_columns,
                origin: x,
                width,
                key_offset: key,
            });
            if layout.visible {
                let _ = self.visible.push(ch);
            }
            x += width;
            key += layout.addressable_columns() as u32;
        }
        self.content_width = x;
        debug!(
            "column layout rebuilt: {} channels, {} visible, {:.0}px",
            count,
            self.visible.len(),
            x
        );
    }

    // --- Channel sets ---

    /// Channels known to the layout (visible or not).
    pub fn channel_count(&self) -> u16 {
        self.channels.len() as u16
    }

    /// Visible channels in display order.
    pub fn visible_channels(&self) -> &[u16] {
        &self.visible
    }

    pub fn is_visible(&self, channel: u16) -> bool {
        self.channels
            .get(channel as usize)
            .is_some_and(|g| g.layout.visible)
    }

    pub fn first_visible(&self) -> Option<u16> {
        self.visible.first().copied()
    }

    pub fn last_visible(&self) -> Option<u16> {
        self.visible.last().copied()
    }

    /// First visible channel strictly right of `channel`.
    pub fn next_visible(&self, channel: u16) -> Option<u16> {
        let idx = self.visible.partition_point(|&c| c <= channel);
        self.visible.get(idx).copied()
    }

    /// First visible channel strictly left of `channel`.
    pub fn prev_visible(&self, channel: u16) -> Option<u16> {
        let idx = self.visible.partition_point(|&c| c < channel);
        idx.checked_sub(1).map(|i| self.visible[i])
    }

    /// Closest visible channel by index distance; ties go left.
    pub fn nearest_visible(&self, channel: u16) -> Option<u16> {
        match (self.prev_visible(channel), self.next_visible(channel)) {
            _ if self.is_visible(channel) => Some(channel),
            (Some(l), Some(r)) => Some(if channel - l <= r - channel { l } else { r }),
            (l, r) => l.or(r),
        }
    }

    /// Sum of shown sub-columns over all visible channels.
    pub fn total_visible_sub_columns(&self) -> u32 {
        self.visible
            .iter()
            .map(|&c| self.channels[c as usize].sub_columns as u32)
            .sum()
    }

    // --- Per-channel geometry ---

    fn geometry(&self, channel: u16) -> Result<&ChannelGeometry, GridError> {
        let geometry = self
            .channels
            .get(channel as usize)
            .ok_or(GridError::InvalidChannel(channel))?;
        if !geometry.layout.visible {
            return Err(GridError::HiddenChannel(channel));
        }
        Ok(geometry)
    }

    pub fn channel_layout(&self, channel: u16) -> Result<ChannelLayout, GridError> {
        self.channels
            .get(channel as usize)
            .map(|g| g.layout)
            .ok_or(GridError::InvalidChannel(channel))
    }

    /// Sub-columns shown for a visible channel.
    pub fn sub_column_count(&self, channel: u16) -> Result<u8, GridError> {
        self.geometry(channel).map(|g| g.sub_columns)
    }

    /// Pixel width of a visible channel.
    pub fn pixel_width(&self, channel: u16) -> Result<f32, GridError> {
        self.geometry(channel).map(|g| g.width)
    }

    /// X of a visible channel's left edge, row gutter included.
    pub fn channel_pixel_origin(&self, channel: u16) -> Result<f32, GridError> {
        self.geometry(channel).map(|g| g.origin)
    }

    /// Grid-space X and width of one sub-column.
    pub fn sub_column_span(&self, channel: u16, column: u8) -> Result<(f32, f32), GridError> {
        let geometry = self.geometry(channel)?;
        if column >= geometry.sub_columns {
            return Err(GridError::InvalidColumn { channel, column });
        }
        let offset: f32 = (0..column)
            .map(|i| sub_column_width(&self.metrics, SubColumn::from_index(i)))
            .sum();
        let width = sub_column_width(&self.metrics, SubColumn::from_index(column));
        Ok((geometry.origin + offset, width))
    }

    /// Sub-column under an X offset measured from the channel's left edge.
    /// Offsets past the band clamp to the last sub-column.
    pub fn sub_column_at(&self, channel: u16, x: f32) -> Result<u8, GridError> {
        let geometry = self.geometry(channel)?;
        let mut edge = 0.0;
        for i in 0..geometry.sub_columns {
            edge += sub_column_width(&self.metrics, SubColumn::from_index(i));
            if x < edge {
                return Ok(i);
            }
        }
        Ok(geometry.sub_columns.saturating_sub(1))
    }

    /// Visible channel under a grid-space X, if any.
    pub fn channel_at(&self, x: f32) -> Option<u16> {
        let idx = self
            .visible
            .partition_point(|&c| self.channels[c as usize].origin <= x);
        let channel = *self.visible.get(idx.checked_sub(1)?)?;
        let g = &self.channels[channel as usize];
        (x < g.origin + g.width).then_some(channel)
    }

    /// Linear key of (channel, column) from the cumulative offset table.
    ///
    /// Keys are dense over every addressable sub-column of every channel,
    /// hidden ones included, so `key(b) - key(a)` counts the sub-columns
    /// between two positions.
    pub fn column_key(&self, channel: u16, column: u8) -> Result<u32, GridError> {
        let g = self
            .channels
            .get(channel as usize)
            .ok_or(GridError::InvalidChannel(channel))?;
        if column >= g.layout.addressable_columns() {
            return Err(GridError::InvalidColumn { channel, column });
        }
        Ok(g.key_offset + column as u32)
    }

    /// Width of the whole grid: gutter plus every visible channel.
    pub fn content_width(&self) -> f32 {
        self.content_width
    }
}
