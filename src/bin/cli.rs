//! tracker-grid CLI: drive a pattern view from scripted keys and playback.
//!
//! Usage:
//!   tg-cli [--settings grid.json] [--keys "Down,Shift+Right,Ctrl+A"]
//!          [--play FRAMES] [--hide CHANNEL] [--rows N] [--orders N]

use std::time::Duration;
use std::{env, fs};

use anyhow::{bail, Context, Result};
use tg_grid::GridSettings;
use tg_ir::{EffectSlot, Note, Song};
use tg_master::Controller;
use tracker_grid::ui::input::parse_key_sequence;
use tracker_grid::GridSession;

struct Args {
    settings: Option<String>,
    keys: Option<String>,
    play_frames: u32,
    hide: Vec<u16>,
    rows: u16,
    orders: u16,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        settings: None,
        keys: None,
        play_frames: 0,
        hide: Vec::new(),
        rows: 32,
        orders: 3,
    };
    let mut it = env::args().skip(1);
    while let Some(flag) = it.next() {
        let mut value = || it.next().with_context(|| format!("{} needs a value", flag));
        match flag.as_str() {
            "--settings" => args.settings = Some(value()?),
            "--keys" => args.keys = Some(value()?),
            "--play" => args.play_frames = value()?.parse().context("--play expects a frame count")?,
            "--hide" => args.hide.push(value()?.parse().context("--hide expects a channel index")?),
            "--rows" => args.rows = value()?.parse().context("--rows expects a number")?,
            "--orders" => args.orders = value()?.parse().context("--orders expects a number")?,
            other => bail!("unknown argument {}", other),
        }
    }
    Ok(args)
}

/// Four channels with a simple bass line and a few effects.
fn demo_song(rows: u16, orders: u16) -> Song {
    let mut song = Song::with_channels("Demo", 4, rows.max(1));
    for o in 1..orders.max(1) {
        song.add_order(o);
    }
    song.set_effect_columns(2, 2);
    for order in 0..song.order_count() {
        let Some(pattern) = song.pattern_or_create(0, order) else {
            continue;
        };
        for row in (0..rows).step_by(4) {
            let cell = pattern.cell_mut(row);
            cell.note = Note::from_octave_semitone(3, (row / 4 % 12) as u8);
            cell.instrument = Some(1);
        }
        if let Some(pattern) = song.pattern_or_create(2, order) {
            pattern.cell_mut(0).effects[1] = EffectSlot::new(0x0F, 0x06);
        }
    }
    song
}

fn load_settings(path: Option<&str>) -> Result<GridSettings> {
    let Some(path) = path else {
        return Ok(GridSettings::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;
    let settings: GridSettings =
        serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path))?;
    Ok(settings)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;
    let settings = load_settings(args.settings.as_deref())?;

    let mut controller = Controller::with_song(demo_song(args.rows, args.orders));
    for &channel in &args.hide {
        if !controller.set_visible(channel, false) {
            tracing::warn!("no channel {} to hide", channel);
        }
    }

    let mut session = GridSession::new(controller, settings);
    session.view.set_viewport(640.0, 20.0 + 24.0 * 16.0);
    session.frame();

    if let Some(keys) = &args.keys {
        let actions = parse_key_sequence(keys, session.base_octave)
            .map_err(|key| anyhow::anyhow!("unknown key {:?}", key))?;
        tracing::info!("applying {} key actions", actions.len());
        session.process_actions(&actions);
        session.frame();
    }

    if args.play_frames > 0 {
        session.controller.set_row_interval(Duration::from_millis(60));
        session.controller.play()?;
        for _ in 0..args.play_frames {
            std::thread::sleep(Duration::from_millis(16));
            let report = session.frame();
            if report.scrolled {
                tracing::debug!("view scrolled to {:?}", session.view.scroll_position());
            }
        }
        session.controller.stop();
    }

    let cursor = session.view.cursor_address();
    println!("{}", session.controller.song().title);
    print!("{}", session.render());
    println!(
        "cursor {:02X}:{:02X} ch {} col {}  [{}]",
        cursor.order,
        cursor.row,
        cursor.channel,
        cursor.column,
        session.cursor_cell_text()
    );
    if !session.status.is_empty() {
        println!("{}", session.status);
    }
    Ok(())
}
