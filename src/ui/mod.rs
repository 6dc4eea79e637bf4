//! Text front-end: a controller plus one pattern view, driven by actions.

pub mod cell_format;
pub mod input;
pub mod text_view;

use input::GridAction;
use tg_grid::{FrameInput, FrameReport, GridSettings, PatternViewState, Transport};
use tg_ir::{Cell, Note};
use tg_master::Controller;

/// Everything the front-end needs between frames.
pub struct GridSession {
    pub controller: Controller,
    pub view: PatternViewState,
    pub base_octave: u8,
    pub status: String,
}

impl GridSession {
    pub fn new(controller: Controller, settings: GridSettings) -> Self {
        Self {
            controller,
            view: PatternViewState::new(settings),
            base_octave: 4,
            status: String::new(),
        }
    }

    /// Sample the transport once and advance the view one frame.
    pub fn frame(&mut self) -> FrameReport {
        let input = FrameInput::sample(&self.controller);
        self.view.tick(self.controller.song(), &input)
    }

    pub fn render(&self) -> String {
        text_view::render_text(&self.view, self.controller.song())
    }

    /// Every shown sub-column of the cell under the cursor.
    pub fn cursor_cell_text(&self) -> String {
        let cursor = self.view.cursor_address();
        let song = self.controller.song();
        let Some(layout) = song.channel_layout(cursor.channel) else {
            return String::new();
        };
        let cell = song
            .pattern(cursor.channel, cursor.order)
            .map_or(&Cell::EMPTY, |p| p.cell(cursor.row));
        cell_format::format_cell(cell, &layout)
    }

    pub fn process_actions(&mut self, actions: &[GridAction]) {
        for action in actions {
            self.process_action(*action);
        }
    }

    fn process_action(&mut self, action: GridAction) {
        let song = self.controller.song();
        match action {
            GridAction::Navigate { direction, extend, coarse } => {
                self.view.on_key_navigate(song, direction, extend, coarse);
            }
            GridAction::NextChannel => {
                self.view.next_channel(song);
            }
            GridAction::PrevChannel => {
                self.view.prev_channel(song);
            }
            GridAction::Top { extend } => {
                self.view.cursor_top(song, extend);
            }
            GridAction::Bottom { extend } => {
                self.view.cursor_bottom(song, extend);
            }
            GridAction::SelectAll => {
                if !self.view.select_all(song) {
                    self.status = "Everything selected".to_string();
                }
            }
            GridAction::Wheel { columns, rows } => {
                self.view.on_wheel(song, columns, rows);
            }
            GridAction::EnterNote(note) => self.write_note(Note::On(note)),
            GridAction::NoteOff => self.write_note(Note::Off),
            GridAction::DeleteCell => self.write_note(Note::None),
            GridAction::TogglePlayStop => {
                if self.controller.is_playing() {
                    self.controller.stop();
                    self.status = "Stopped".to_string();
                } else {
                    self.status = match self.controller.play() {
                        Ok(()) => "Playing...".to_string(),
                        Err(e) => format!("Play failed: {}", e),
                    };
                }
            }
            GridAction::ToggleSingleStep => {
                let enabled = !self.controller.is_single_stepping();
                self.controller.set_single_step(enabled);
                self.status = format!("Single step {}", if enabled { "ON" } else { "OFF" });
            }
            GridAction::StepRow => {
                if let Err(e) = self.controller.step_row() {
                    self.status = e.to_string();
                }
            }
            GridAction::ToggleFollow => {
                let mut settings = *self.view.settings();
                settings.follow_playback = !settings.follow_playback;
                self.view.set_settings(settings);
            }
            GridAction::CycleCollapse => {
                let channel = self.view.cursor_address().channel;
                self.controller.cycle_collapse(channel);
            }
            GridAction::ToggleChannelVisible => {
                let channel = self.view.cursor_address().channel;
                let visible = self.controller.song().channel_layout(channel).is_some_and(|l| l.visible);
                self.controller.set_visible(channel, !visible);
            }
            GridAction::AdjustOctave(d) => {
                self.base_octave = (self.base_octave as i8 + d).clamp(0, 9) as u8;
            }
        }
    }

    /// Write a note at the cursor and advance by the edit step. Only the
    /// note sub-column takes notes.
    fn write_note(&mut self, note: Note) {
        let cursor = self.view.cursor_address();
        if cursor.column != 0 && note != Note::None {
            return;
        }
        let Some(pattern) = self.controller.song_mut().pattern_or_create(cursor.channel, cursor.order) else {
            return;
        };
        let cell = pattern.cell_mut(cursor.row);
        match cursor.sub_column() {
            tg_grid::SubColumn::Note => cell.note = note,
            tg_grid::SubColumn::Instrument => cell.instrument = None,
            tg_grid::SubColumn::Volume => cell.volume = None,
            tg_grid::SubColumn::EffectType(k) => cell.effects[k as usize].kind = None,
            tg_grid::SubColumn::EffectValue(k) => cell.effects[k as usize].value = None,
        }
        self.view.edit_advance(self.controller.song());
    }
}
