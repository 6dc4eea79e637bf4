//! Pattern grid engine for the tracker.
//!
//! Maps between cell addresses, pixels and the song: per-channel column
//! layout, hit-testing, the selection rectangle, cursor navigation with
//! wrap and carry, and following the playback position once per frame.
//!
//! Everything here runs on the UI thread. The only cross-thread input is
//! the transport's playback snapshot, read once per frame through
//! [`Transport`].
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod address;
mod cache;
mod error;
pub mod follow;
pub mod layout;
mod navigator;
mod registry;
mod selection;
pub mod settings;
mod source;
mod view;

pub use address::{compare, normalize, rect_contains, CellAddress, SubColumn};
pub use cache::{get_pattern, PatternCache};
pub use error::GridError;
pub use follow::{Carry, FollowOutcome, ScrollPosition, ScrollSync};
pub use layout::{ColumnLayout, MAX_CHANNELS};
pub use navigator::CursorNavigator;
pub use registry::{ViewId, ViewRegistry};
pub use selection::{SelectionRange, SelectionState, SelectionTracker};
pub use settings::{
    DeadZone, GridMetrics, GridSettings, HorizontalWrap, ScrollChangesOrder, ScrollStep,
    SubColumnSpacing, VerticalWrap, WrapPolicy,
};
pub use source::{FrameInput, SongSource, Transport};
pub use view::{FrameReport, NavDirection, PatternViewState, Rect};
