//! Collaborator interfaces: where song data and playback position come from.

use tg_ir::{ChannelLayout, Pattern, PlaybackSnapshot, Song};

/// Read-only song data for the current subsong.
pub trait SongSource {
    fn channel_count(&self) -> u16;
    fn order_count(&self) -> u16;
    /// Rows in the pattern at `order`; 0 when the order does not exist.
    fn pattern_length_for(&self, order: u16) -> u16;
    fn channel_layout(&self, channel: u16) -> Option<ChannelLayout>;
    /// Pattern assigned to (channel, order), `None` if none was created.
    fn pattern(&self, channel: u16, order: u16) -> Option<&Pattern>;
    /// Changes whenever channel count or any channel layout changes.
    fn layout_version(&self) -> u64;
}

/// The transport as seen from the UI thread.
///
/// `playback_snapshot` must return an internally consistent (order, row)
/// pair from a single read. A transport that loads order and row with two
/// separate non-atomic reads can hand out torn positions; the grid cannot
/// detect that.
pub trait Transport {
    fn playback_snapshot(&self) -> PlaybackSnapshot;
    fn is_playing(&self) -> bool;
    fn is_single_stepping(&self) -> bool;
    /// True once after each completed single step.
    fn take_step_completed(&self) -> bool;
}

impl SongSource for Song {
    fn channel_count(&self) -> u16 {
        Song::channel_count(self)
    }

    fn order_count(&self) -> u16 {
        Song::order_count(self)
    }

    fn pattern_length_for(&self, order: u16) -> u16 {
        Song::pattern_length_for(self, order)
    }

    fn channel_layout(&self, channel: u16) -> Option<ChannelLayout> {
        Song::channel_layout(self, channel)
    }

    fn pattern(&self, channel: u16, order: u16) -> Option<&Pattern> {
        Song::pattern(self, channel, order)
    }

    fn layout_version(&self) -> u64 {
        Song::layout_version(self)
    }
}

/// One frame's worth of transport state, read once by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub snapshot: PlaybackSnapshot,
    pub playing: bool,
    pub single_stepping: bool,
    pub step_completed: bool,
}

impl FrameInput {
    /// Sample a transport. Call exactly once per rendered frame.
    /// The step flag is taken before the snapshot is read, so a completed
    /// step is never paired with the position from before it.
    pub fn sample<T: Transport + ?Sized>(transport: &T) -> Self {
        let step_completed = transport.take_step_completed();
        Self {
            snapshot: transport.playback_snapshot(),
            playing: transport.is_playing(),
            single_stepping: transport.is_single_stepping(),
            step_completed,
        }
    }

    /// Stopped transport parked at the song start.
    pub fn stopped() -> Self {
        Self::default()
    }

    pub fn playing_at(order: u16, row: u16) -> Self {
        Self {
            snapshot: PlaybackSnapshot::new(order, row),
            playing: true,
            ..Self::default()
        }
    }
}
