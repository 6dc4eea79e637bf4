//! Grid error taxonomy.
//!
//! None of these escape the `PatternViewState` API: the view turns them into
//! `None`, a clamp, or a no-op. They surface only from the lower-level
//! layout queries.

/// Error raised by layout and addressing queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("channel {0} does not exist")]
    InvalidChannel(u16),

    #[error("channel {0} is hidden")]
    HiddenChannel(u16),

    #[error("sub-column {column} is not shown on channel {channel}")]
    InvalidColumn { channel: u16, column: u8 },

    #[error("order {order} row {row} is outside the song")]
    OutOfRange { order: u16, row: u16 },

    #[error("column layout is older than the song's channel layout")]
    StaleLayout,
}
