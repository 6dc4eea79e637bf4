//! Pattern and cell types for tracker sequences.

use alloc::vec::Vec;
use crate::channel::MAX_EFFECT_COLUMNS;

/// A note value in a pattern cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Note {
    /// No note
    #[default]
    None,
    /// Note on with note number (0-119, where 48 = C-4)
    On(u8),
    /// Note off / key release
    Off,
    /// Macro release (envelopes enter their release phase, note keeps sounding)
    Release,
}

impl Note {
    /// Create a note from octave (0-9) and semitone (0-11).
    pub const fn from_octave_semitone(octave: u8, semitone: u8) -> Self {
        Note::On(octave * 12 + semitone)
    }

    /// Get the octave (0-9) if this is a note on.
    pub const fn octave(self) -> Option<u8> {
        match self {
            Note::On(n) => Some(n / 12),
            _ => None,
        }
    }

    /// Get the semitone (0-11) if this is a note on.
    pub const fn semitone(self) -> Option<u8> {
        match self {
            Note::On(n) => Some(n % 12),
            _ => None,
        }
    }
}

/// One effect column: a command byte and its parameter, each optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectSlot {
    pub kind: Option<u8>,
    pub value: Option<u8>,
}

impl EffectSlot {
    pub const EMPTY: EffectSlot = EffectSlot { kind: None, value: None };

    pub const fn new(kind: u8, value: u8) -> Self {
        Self { kind: Some(kind), value: Some(value) }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.value.is_none()
    }
}

/// A single cell in a channel's pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// Note value
    pub note: Note,
    /// Instrument index, `None` when unset
    pub instrument: Option<u8>,
    /// Volume column, `None` when unset
    pub volume: Option<u8>,
    /// Effect columns; only the first `effect_columns` of the channel are shown
    pub effects: [EffectSlot; MAX_EFFECT_COLUMNS as usize],
}

impl Cell {
    /// An empty cell.
    pub const EMPTY: Cell = Cell {
        note: Note::None,
        instrument: None,
        volume: None,
        effects: [EffectSlot::EMPTY; MAX_EFFECT_COLUMNS as usize],
    };

    /// Returns true if the cell is completely empty.
    pub fn is_empty(&self) -> bool {
        self.note == Note::None
            && self.instrument.is_none()
            && self.volume.is_none()
            && self.effects.iter().all(EffectSlot::is_empty)
    }
}

/// One channel's pattern: a run of rows.
///
/// Rows past the stored data read as empty, so a short (or the sentinel
/// empty) pattern can be drawn against any pattern length without checks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    data: Vec<Cell>,
}

/// Shared sentinel returned wherever no pattern is assigned.
pub static EMPTY_PATTERN: Pattern = Pattern::empty();

impl Pattern {
    /// A pattern with no stored rows.
    pub const fn empty() -> Self {
        Self { data: Vec::new() }
    }

    /// Create a pattern with `rows` empty cells.
    pub fn new(rows: u16) -> Self {
        Self {
            data: alloc::vec![Cell::EMPTY; rows as usize],
        }
    }

    /// Number of stored rows.
    pub fn rows(&self) -> u16 {
        self.data.len() as u16
    }

    /// Get a cell; rows beyond the stored data read as empty.
    pub fn cell(&self, row: u16) -> &Cell {
        self.data.get(row as usize).unwrap_or(&Cell::EMPTY)
    }

    /// Get a mutable cell, growing the pattern if `row` is past the end.
    pub fn cell_mut(&mut self, row: u16) -> &mut Cell {
        let idx = row as usize;
        if idx >= self.data.len() {
            self.data.resize(idx + 1, Cell::EMPTY);
        }
        &mut self.data[idx]
    }

    /// True if every stored cell is empty.
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(Cell::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_octave_semitone() {
        let c4 = Note::from_octave_semitone(4, 0);
        assert_eq!(c4, Note::On(48));
        assert_eq!(c4.octave(), Some(4));
        assert_eq!(c4.semitone(), Some(0));

        let a4 = Note::from_octave_semitone(4, 9);
        assert_eq!(a4, Note::On(57));
        assert_eq!(Note::Off.octave(), None);
    }

    #[test]
    fn pattern_cell_access() {
        let mut pattern = Pattern::new(64);
        pattern.cell_mut(10).note = Note::On(60);

        assert_eq!(pattern.cell(10).note, Note::On(60));
        assert_eq!(pattern.cell(11).note, Note::None);
    }

    #[test]
    fn rows_past_end_read_empty() {
        let pattern = Pattern::new(4);
        assert!(pattern.cell(200).is_empty());
        assert!(EMPTY_PATTERN.cell(0).is_empty());
        assert_eq!(EMPTY_PATTERN.rows(), 0);
    }

    #[test]
    fn cell_mut_grows() {
        let mut pattern = Pattern::empty();
        pattern.cell_mut(7).instrument = Some(3);
        assert_eq!(pattern.rows(), 8);
        assert_eq!(pattern.cell(7).instrument, Some(3));
        assert!(!pattern.is_empty());
    }

    #[test]
    fn effect_slot_counts_as_data() {
        let mut cell = Cell::EMPTY;
        assert!(cell.is_empty());
        cell.effects[2] = EffectSlot::new(0x0A, 0x0F);
        assert!(!cell.is_empty());
    }
}
