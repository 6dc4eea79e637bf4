//! Pattern view settings.

use serde::{Deserialize, Serialize};

/// What happens when the cursor runs off the first or last channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalWrap {
    /// Clamp at the first/last channel
    NoWrap,
    /// Cycle to the other end, same row
    WrapWithinRow,
    /// Cycle and step one row forward/back
    #[default]
    WrapAndStepRow,
}

/// What happens when the cursor runs off the top or bottom of a pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalWrap {
    /// Clamp at the pattern start/end
    NoWrap,
    /// Cycle the row inside the same order
    WrapWithinOrder,
    /// Continue into the next/previous order
    #[default]
    WrapToAdjacentOrder,
}

/// Effective wrap behaviour for one movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WrapPolicy {
    pub horizontal: HorizontalWrap,
    pub vertical: VerticalWrap,
    /// With `WrapToAdjacentOrder`, cycle from the last order to the first
    pub around_song: bool,
    /// Cleared while the transport owns the order (follow mode)
    pub allow_order_change: bool,
}

impl WrapPolicy {
    /// Clamp in every direction.
    pub const CLAMP: WrapPolicy = WrapPolicy {
        horizontal: HorizontalWrap::NoWrap,
        vertical: VerticalWrap::NoWrap,
        around_song: false,
        allow_order_change: true,
    };
}

/// Row step for a plain up/down key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollStep {
    #[default]
    One,
    EditStep,
}

/// Whether wheel scrolling past a pattern edge moves to the adjacent order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollChangesOrder {
    No,
    #[default]
    Yes,
    WrapAroundSong,
}

/// Band of the viewport, as fractions of its height, that a followed row
/// is kept inside.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadZone {
    pub top: f32,
    pub bottom: f32,
}

impl Default for DeadZone {
    fn default() -> Self {
        Self { top: 0.25, bottom: 0.75 }
    }
}

/// Spacing added once after each sub-column kind, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubColumnSpacing {
    pub note: f32,
    pub instrument: f32,
    pub volume: f32,
    pub effect_type: f32,
    pub effect_value: f32,
}

impl Default for SubColumnSpacing {
    fn default() -> Self {
        Self {
            note: 4.0,
            instrument: 2.0,
            volume: 2.0,
            effect_type: 0.0,
            effect_value: 4.0,
        }
    }
}

/// Pixel metrics of the grid font and chrome.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridMetrics {
    pub char_width: f32,
    pub line_height: f32,
    /// Channel header band above row 0
    pub header_height: f32,
    /// Row-number gutter left of the first channel
    pub row_gutter_width: f32,
    pub spacing: SubColumnSpacing,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 16.0,
            header_height: 20.0,
            row_gutter_width: 32.0,
            spacing: SubColumnSpacing::default(),
        }
    }
}

/// Every user-tunable knob of a pattern view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub wrap_horizontal: HorizontalWrap,
    pub wrap_vertical: VerticalWrap,
    pub wrap_around_song: bool,
    pub scroll_step: ScrollStep,
    pub edit_step: u16,
    pub coarse_step: u16,
    pub follow_playback: bool,
    pub dead_zone: DeadZone,
    pub scroll_changes_order: ScrollChangesOrder,
    pub cursor_follows_wheel: bool,
    pub wheel_rows: u16,
    pub scroll_margin_rows: u16,
    pub scroll_margin_x: f32,
    pub metrics: GridMetrics,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            wrap_horizontal: HorizontalWrap::default(),
            wrap_vertical: VerticalWrap::default(),
            wrap_around_song: false,
            scroll_step: ScrollStep::default(),
            edit_step: 1,
            coarse_step: 16,
            follow_playback: true,
            dead_zone: DeadZone::default(),
            scroll_changes_order: ScrollChangesOrder::default(),
            cursor_follows_wheel: false,
            wheel_rows: 4,
            scroll_margin_rows: 2,
            scroll_margin_x: 80.0,
            metrics: GridMetrics::default(),
        }
    }
}

impl GridSettings {
    /// Clamp values that would break layout or navigation.
    pub fn sanitized(mut self) -> Self {
        let defaults = GridMetrics::default();
        let m = &mut self.metrics;
        if !(m.char_width > 0.0) {
            m.char_width = defaults.char_width;
        }
        if !(m.line_height > 0.0) {
            m.line_height = defaults.line_height;
        }
        m.header_height = non_negative(m.header_height);
        m.row_gutter_width = non_negative(m.row_gutter_width);
        let s = &mut m.spacing;
        s.note = non_negative(s.note);
        s.instrument = non_negative(s.instrument);
        s.volume = non_negative(s.volume);
        s.effect_type = non_negative(s.effect_type);
        s.effect_value = non_negative(s.effect_value);

        let dz = &mut self.dead_zone;
        dz.top = dz.top.clamp(0.0, 1.0);
        dz.bottom = dz.bottom.clamp(0.0, 1.0);
        if dz.top >= dz.bottom {
            *dz = DeadZone::default();
        }

        self.edit_step = self.edit_step.max(1);
        self.coarse_step = self.coarse_step.max(1);
        self.wheel_rows = self.wheel_rows.max(1);
        self.scroll_margin_x = non_negative(self.scroll_margin_x);
        self
    }

    /// Rows a plain up/down moves.
    pub fn fine_rows(&self) -> u16 {
        match self.scroll_step {
            ScrollStep::One => 1,
            ScrollStep::EditStep => self.edit_step.max(1),
        }
    }

    /// Wrap behaviour for a keyboard move. Extending a selection never wraps.
    pub fn wrap_policy(&self, extending: bool, allow_order_change: bool) -> WrapPolicy {
        if extending {
            return WrapPolicy { allow_order_change, ..WrapPolicy::CLAMP };
        }
        WrapPolicy {
            horizontal: self.wrap_horizontal,
            vertical: self.wrap_vertical,
            around_song: self.wrap_around_song,
            allow_order_change,
        }
    }
}

fn non_negative(v: f32) -> f32 {
    if v > 0.0 {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_repairs_bad_values() {
        let mut s = GridSettings::default();
        s.metrics.char_width = -3.0;
        s.metrics.line_height = f32::NAN;
        s.metrics.spacing.volume = -1.0;
        s.dead_zone = DeadZone { top: 0.9, bottom: 0.1 };
        s.edit_step = 0;
        let s = s.sanitized();
        assert_eq!(s.metrics.char_width, 8.0);
        assert_eq!(s.metrics.line_height, 16.0);
        assert_eq!(s.metrics.spacing.volume, 0.0);
        assert_eq!(s.dead_zone, DeadZone::default());
        assert_eq!(s.edit_step, 1);
    }

    #[test]
    fn fine_rows_uses_edit_step_when_asked() {
        let mut s = GridSettings::default();
        s.edit_step = 4;
        assert_eq!(s.fine_rows(), 1);
        s.scroll_step = ScrollStep::EditStep;
        assert_eq!(s.fine_rows(), 4);
    }

    #[test]
    fn extending_never_wraps() {
        let s = GridSettings::default();
        let p = s.wrap_policy(true, true);
        assert_eq!(p.horizontal, HorizontalWrap::NoWrap);
        assert_eq!(p.vertical, VerticalWrap::NoWrap);
        let p = s.wrap_policy(false, false);
        assert_eq!(p.vertical, VerticalWrap::WrapToAdjacentOrder);
        assert!(!p.allow_order_change);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: GridSettings =
            serde_json::from_str(r#"{"wrap_horizontal":"NoWrap","metrics":{"char_width":10.0}}"#)
                .unwrap();
        assert_eq!(s.wrap_horizontal, HorizontalWrap::NoWrap);
        assert_eq!(s.metrics.char_width, 10.0);
        assert_eq!(s.metrics.line_height, 16.0);
        assert_eq!(s.coarse_step, 16);
    }
}
