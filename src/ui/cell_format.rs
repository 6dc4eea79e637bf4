//! Cell formatting for the text grid.

use tg_grid::SubColumn;
use tg_ir::{Cell, ChannelLayout, Note};

/// Text of one sub-column, `SubColumn::char_cells` characters wide.
pub fn format_sub_column(cell: &Cell, sub: SubColumn) -> String {
    match sub {
        SubColumn::Note => format_note(cell.note).to_string(),
        SubColumn::Instrument => format_byte(cell.instrument),
        SubColumn::Volume => format_byte(cell.volume),
        SubColumn::EffectType(k) => format_byte(cell.effects.get(k as usize).and_then(|e| e.kind)),
        SubColumn::EffectValue(k) => format_byte(cell.effects.get(k as usize).and_then(|e| e.value)),
    }
}

/// Every shown sub-column of a cell, space separated.
pub fn format_cell(cell: &Cell, layout: &ChannelLayout) -> String {
    let shown = tg_grid::layout::sub_column_count_for(layout);
    (0..shown)
        .map(|i| format_sub_column(cell, SubColumn::from_index(i)))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_note(note: Note) -> &'static str {
    match note {
        Note::None => "---",
        Note::Off => "===",
        Note::Release => "^^^",
        Note::On(n) => note_name(n),
    }
}

fn note_name(n: u8) -> &'static str {
    const NAMES: [&str; 120] = [
        "C-0","C#0","D-0","D#0","E-0","F-0","F#0","G-0","G#0","A-0","A#0","B-0",
        "C-1","C#1","D-1","D#1","E-1","F-1","F#1","G-1","G#1","A-1","A#1","B-1",
        "C-2","C#2","D-2","D#2","E-2","F-2","F#2","G-2","G#2","A-2","A#2","B-2",
        "C-3","C#3","D-3","D#3","E-3","F-3","F#3","G-3","G#3","A-3","A#3","B-3",
        "C-4","C#4","D-4","D#4","E-4","F-4","F#4","G-4","G#4","A-4","A#4","B-4",
        "C-5","C#5","D-5","D#5","E-5","F-5","F#5","G-5","G#5","A-5","A#5","B-5",
        "C-6","C#6","D-6","D#6","E-6","F-6","F#6","G-6","G#6","A-6","A#6","B-6",
        "C-7","C#7","D-7","D#7","E-7","F-7","F#7","G-7","G#7","A-7","A#7","B-7",
        "C-8","C#8","D-8","D#8","E-8","F-8","F#8","G-8","G#8","A-8","A#8","B-8",
        "C-9","C#9","D-9","D#9","E-9","F-9","F#9","G-9","G#9","A-9","A#9","B-9",
    ];
    NAMES.get(n as usize).unwrap_or(&"???")
}

pub fn format_byte(value: Option<u8>) -> String {
    match value {
        Some(v) => format!("{:02X}", v),
        None => "..".to_string(),
    }
}
