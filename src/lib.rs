//! tracker-grid: text front-end for the pattern grid engine.
//!
//! Wires a [`tg_master::Controller`] to a [`tg_grid::PatternViewState`]
//! and renders the visible window as plain text.

pub mod ui;

pub use ui::GridSession;
