//! Per-channel display settings.

use arrayvec::ArrayString;

/// Upper bound on effect columns per channel.
pub const MAX_EFFECT_COLUMNS: u8 = 8;

/// How many sub-columns a channel hides to save horizontal space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum CollapseLevel {
    /// Note, instrument, volume and all effect columns
    #[default]
    Expanded = 0,
    /// Effects hidden
    NoEffects = 1,
    /// Effects and volume hidden
    NoVolume = 2,
    /// Note only
    NoteOnly = 3,
}

impl CollapseLevel {
    /// Convert from the numeric level (0-3); larger values saturate at `NoteOnly`.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => CollapseLevel::Expanded,
            1 => CollapseLevel::NoEffects,
            2 => CollapseLevel::NoVolume,
            _ => CollapseLevel::NoteOnly,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    /// Next level in the collapse cycle (NoteOnly wraps back to Expanded).
    pub fn cycle(self) -> Self {
        Self::from_level((self.level() + 1) % 4)
    }
}

/// Channel layout as the pattern grid consumes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelLayout {
    pub collapse: CollapseLevel,
    /// Effect columns, 1..=MAX_EFFECT_COLUMNS; only shown when expanded
    pub effect_columns: u8,
    /// Hidden channels keep their index but are skipped by the grid
    pub visible: bool,
}

impl Default for ChannelLayout {
    fn default() -> Self {
        Self {
            collapse: CollapseLevel::Expanded,
            effect_columns: 1,
            visible: true,
        }
    }
}

impl ChannelLayout {
    /// Addressable sub-columns regardless of collapse: note, instrument,
    /// volume, then a type/value pair per effect column.
    pub fn addressable_columns(&self) -> u8 {
        3 + 2 * self.effect_columns.min(MAX_EFFECT_COLUMNS)
    }
}

/// Per-channel settings.
#[derive(Clone, Copy, Debug)]
pub struct ChannelSettings {
    /// Channel name shown in the header
    pub name: ArrayString<32>,
    /// Display layout
    pub layout: ChannelLayout,
    /// Is the channel muted?
    pub muted: bool,
}

impl ChannelSettings {
    pub fn new(name: &str) -> Self {
        let mut channel_name = ArrayString::new();
        for c in name.chars() {
            if channel_name.try_push(c).is_err() {
                break;
            }
        }
        Self {
            name: channel_name,
            layout: ChannelLayout::default(),
            muted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_from_level_saturates() {
        assert_eq!(CollapseLevel::from_level(0), CollapseLevel::Expanded);
        assert_eq!(CollapseLevel::from_level(2), CollapseLevel::NoVolume);
        assert_eq!(CollapseLevel::from_level(9), CollapseLevel::NoteOnly);
    }

    #[test]
    fn collapse_cycle_wraps() {
        assert_eq!(CollapseLevel::NoVolume.cycle(), CollapseLevel::NoteOnly);
        assert_eq!(CollapseLevel::NoteOnly.cycle(), CollapseLevel::Expanded);
    }

    #[test]
    fn addressable_columns_counts_effect_pairs() {
        let mut layout = ChannelLayout::default();
        assert_eq!(layout.addressable_columns(), 5);
        layout.effect_columns = MAX_EFFECT_COLUMNS;
        assert_eq!(layout.addressable_columns(), 19);
        layout.effect_columns = 200;
        assert_eq!(layout.addressable_columns(), 19);
    }

    #[test]
    fn long_names_are_truncated_to_capacity() {
        let ch = ChannelSettings::new("a channel name that is far too long to fit");
        assert_eq!(ch.name.as_str(), "a channel name that is far too l");
    }
}
