//! Playback position as published by the transport.

/// The (order, row) pair the transport is currently playing.
///
/// The pair must be read as one value. `to_bits`/`from_bits` pack it into
/// a single word so a transport can publish it through one atomic store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlaybackSnapshot {
    pub order: u16,
    pub row: u16,
}

impl PlaybackSnapshot {
    pub const fn new(order: u16, row: u16) -> Self {
        Self { order, row }
    }

    /// Pack into one word: order in the high half, row in the low half.
    pub const fn to_bits(self) -> u32 {
        ((self.order as u32) << 16) | self.row as u32
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self {
            order: (bits >> 16) as u16,
            row: bits as u16,
        }
    }
}
