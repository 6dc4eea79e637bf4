//! Song data model for the tracker grid.
//!
//! This crate defines what the pattern grid reads: per-channel patterns of
//! cells, the order list that assigns a pattern to every (order, channel)
//! slot, per-channel display layout, and the playback position snapshot
//! published by the transport.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod channel;
mod pattern;
mod playback;
pub mod song;

pub use channel::{ChannelLayout, ChannelSettings, CollapseLevel, MAX_EFFECT_COLUMNS};
pub use pattern::{Cell, EffectSlot, Note, Pattern, EMPTY_PATTERN};
pub use playback::PlaybackSnapshot;
pub use song::{OrderRow, Song, SubSong};
