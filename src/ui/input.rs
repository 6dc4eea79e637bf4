//! Keyboard input mapping for the pattern grid.
//!
//! Pure functions that turn key names such as `"Shift+Down"` or `"Tab"`
//! into grid actions, so scripted key sequences and tests share one table.

use tg_grid::NavDirection;

/// An action produced by keyboard input in the pattern grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridAction {
    Navigate { direction: NavDirection, extend: bool, coarse: bool },
    NextChannel,
    PrevChannel,
    Top { extend: bool },
    Bottom { extend: bool },
    SelectAll,
    Wheel { columns: i32, rows: i32 },
    EnterNote(u8),
    NoteOff,
    DeleteCell,
    TogglePlayStop,
    ToggleSingleStep,
    StepRow,
    ToggleFollow,
    CycleCollapse,
    ToggleChannelVisible,
    AdjustOctave(i8),
}

/// Modifier state of one key press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

/// Split `"Ctrl+Shift+Up"` into modifiers and the key name.
pub fn split_modifiers(chord: &str) -> (Modifiers, &str) {
    let mut mods = Modifiers::default();
    let mut rest = chord.trim();
    loop {
        if let Some(r) = rest.strip_prefix("Shift+") {
            mods.shift = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("Ctrl+") {
            mods.ctrl = true;
            rest = r;
        } else {
            return (mods, rest);
        }
    }
}

/// Map one key chord to an action. `base_octave` picks the note row octave.
pub fn parse_key(chord: &str, base_octave: u8) -> Option<GridAction> {
    let (mods, key) = split_modifiers(chord);
    let shift = mods.shift;

    let nav = |direction, coarse| GridAction::Navigate { direction, extend: shift, coarse };
    let action = match key {
        "Up" if mods.ctrl => GridAction::AdjustOctave(1),
        "Down" if mods.ctrl => GridAction::AdjustOctave(-1),
        "Up" => nav(NavDirection::Up, false),
        "Down" => nav(NavDirection::Down, false),
        "Left" => nav(NavDirection::Left, mods.ctrl),
        "Right" => nav(NavDirection::Right, mods.ctrl),
        "PageUp" => nav(NavDirection::Up, true),
        "PageDown" => nav(NavDirection::Down, true),
        "Tab" if shift => GridAction::PrevChannel,
        "Tab" => GridAction::NextChannel,
        "Home" => GridAction::Top { extend: shift },
        "End" => GridAction::Bottom { extend: shift },
        "A" if mods.ctrl => GridAction::SelectAll,
        "WheelUp" => GridAction::Wheel { columns: 0, rows: -1 },
        "WheelDown" => GridAction::Wheel { columns: 0, rows: 1 },
        "WheelLeft" => GridAction::Wheel { columns: -1, rows: 0 },
        "WheelRight" => GridAction::Wheel { columns: 1, rows: 0 },
        "Space" => GridAction::TogglePlayStop,
        "Enter" if mods.ctrl => GridAction::ToggleSingleStep,
        "Enter" => GridAction::StepRow,
        "ScrollLock" => GridAction::ToggleFollow,
        "F5" => GridAction::CycleCollapse,
        "F6" => GridAction::ToggleChannelVisible,
        "Delete" | "Backspace" => GridAction::DeleteCell,
        "1" => GridAction::NoteOff,
        k => return note_key(k, base_octave).map(GridAction::EnterNote),
    };
    Some(action)
}

/// Piano-style note keys.
///
/// Lower row (z..m): base_octave
/// Upper row (q..u): base_octave + 1
fn note_key(key: &str, base_octave: u8) -> Option<u8> {
    const LOWER: [&str; 12] = ["z", "s", "x", "d", "c", "v", "g", "b", "h", "n", "j", "m"];
    const UPPER: [&str; 12] = ["q", "2", "w", "3", "e", "r", "5", "t", "6", "y", "7", "u"];
    let base = base_octave.min(9) * 12;
    let note = if let Some(i) = LOWER.iter().position(|k| *k == key) {
        base + i as u8
    } else if let Some(i) = UPPER.iter().position(|k| *k == key) {
        base + 12 + i as u8
    } else {
        return None;
    };
    (note < 120).then_some(note)
}

/// Parse a comma separated key sequence. Unknown keys are returned as errors.
pub fn parse_key_sequence(seq: &str, base_octave: u8) -> Result<Vec<GridAction>, String> {
    seq.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| parse_key(k, base_octave).ok_or_else(|| k.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_modifiers() {
        assert_eq!(
            parse_key("Shift+Down", 4),
            Some(GridAction::Navigate { direction: NavDirection::Down, extend: true, coarse: false })
        );
        assert_eq!(
            parse_key("Ctrl+Right", 4),
            Some(GridAction::Navigate { direction: NavDirection::Right, extend: false, coarse: true })
        );
        assert_eq!(parse_key("Ctrl+Up", 4), Some(GridAction::AdjustOctave(1)));
        assert_eq!(parse_key("Shift+Tab", 4), Some(GridAction::PrevChannel));
        assert_eq!(parse_key("Ctrl+A", 4), Some(GridAction::SelectAll));
    }

    #[test]
    fn note_keys_follow_octave() {
        assert_eq!(parse_key("z", 4), Some(GridAction::EnterNote(48)));
        assert_eq!(parse_key("q", 4), Some(GridAction::EnterNote(60)));
        assert_eq!(parse_key("u", 9), None);
        assert_eq!(parse_key("1", 4), Some(GridAction::NoteOff));
    }

    #[test]
    fn sequences_report_unknown_keys() {
        let seq = parse_key_sequence("Down, Down ,Shift+Right,", 4).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(parse_key_sequence("Down,Hyper+X", 4), Err("Hyper+X".to_string()));
    }
}
