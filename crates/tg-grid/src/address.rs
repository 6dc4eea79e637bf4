//! Cell addresses and rectangle normalization.

use core::cmp::Ordering;

/// Which sub-column of a cell an address points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubColumn {
    Note,
    Instrument,
    Volume,
    /// Effect command of effect column `k`
    EffectType(u8),
    /// Effect parameter of effect column `k`
    EffectValue(u8),
}

impl SubColumn {
    /// Decode a fine column index: 0 note, 1 instrument, 2 volume,
    /// then `3+2k` / `4+2k` for effect column `k`.
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => SubColumn::Note,
            1 => SubColumn::Instrument,
            2 => SubColumn::Volume,
            n if (n - 3) % 2 == 0 => SubColumn::EffectType((n - 3) / 2),
            n => SubColumn::EffectValue((n - 4) / 2),
        }
    }

    pub const fn index(self) -> u8 {
        match self {
            SubColumn::Note => 0,
            SubColumn::Instrument => 1,
            SubColumn::Volume => 2,
            SubColumn::EffectType(k) => 3 + 2 * k,
            SubColumn::EffectValue(k) => 4 + 2 * k,
        }
    }

    /// Width of the sub-column in character cells.
    pub const fn char_cells(self) -> u8 {
        match self {
            SubColumn::Note => 3,
            _ => 2,
        }
    }
}

/// One addressable unit of the grid.
///
/// Only meaningful relative to a song; it holds indices, never references.
/// Field order matters: the derived ordering is `(order, row)` first, then
/// `(channel, column)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellAddress {
    pub order: u16,
    pub row: u16,
    pub channel: u16,
    pub column: u8,
}

impl CellAddress {
    pub const fn new(order: u16, row: u16, channel: u16, column: u8) -> Self {
        Self { order, row, channel, column }
    }

    pub const fn sub_column(&self) -> SubColumn {
        SubColumn::from_index(self.column)
    }

    /// The vertical coordinate.
    pub const fn row_position(&self) -> (u16, u16) {
        (self.order, self.row)
    }

    /// The horizontal coordinate.
    pub const fn column_position(&self) -> (u16, u8) {
        (self.channel, self.column)
    }

    fn with_positions(rows: (u16, u16), cols: (u16, u8)) -> Self {
        Self::new(rows.0, rows.1, cols.0, cols.1)
    }
}

/// Total order on addresses: `(order, row)`, then `(channel, column)`.
pub fn compare(a: &CellAddress, b: &CellAddress) -> Ordering {
    a.cmp(b)
}

/// Normalize two corners into `(low, high)`.
///
/// The vertical and horizontal dimensions are ordered independently, so
/// the result describes a rectangle: a drag from a later row in an earlier
/// column still yields the top-left and bottom-right corners.
pub fn normalize(a: CellAddress, b: CellAddress) -> (CellAddress, CellAddress) {
    let (row_lo, row_hi) = min_max(a.row_position(), b.row_position());
    let (col_lo, col_hi) = min_max(a.column_position(), b.column_position());
    (
        CellAddress::with_positions(row_lo, col_lo),
        CellAddress::with_positions(row_hi, col_hi),
    )
}

/// True if `addr` lies in the rectangle spanned by normalized corners.
pub fn rect_contains(low: &CellAddress, high: &CellAddress, addr: &CellAddress) -> bool {
    let rows = addr.row_position();
    let cols = addr.column_position();
    rows >= low.row_position()
        && rows <= high.row_position()
        && cols >= low.column_position()
        && cols <= high.column_position()
}

fn min_max<T: Ord>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
