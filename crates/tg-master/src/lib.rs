//! Headless controller for the tracker grid.
//!
//! Owns the song and runs a transport thread that walks the order list
//! row by row. The playback position is published as one atomic word so
//! the UI thread always reads an untorn (order, row) pair.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, info};

pub use tg_grid::Transport;
pub use tg_ir::{CollapseLevel, PlaybackSnapshot, Song};

/// Transport failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("order {order} is past the end of the song ({count} orders)")]
    OrderOutOfRange { order: u16, count: u16 },

    #[error("transport is not playing")]
    NotPlaying,

    #[error("single-step mode is off")]
    NotSingleStepping,

    #[error("failed to start transport thread")]
    Spawn(#[from] std::io::Error),
}

/// Playback position packed into one atomic word.
#[derive(Debug, Default)]
pub struct SnapshotCell(AtomicU32);

impl SnapshotCell {
    pub fn new(snapshot: PlaybackSnapshot) -> Self {
        Self(AtomicU32::new(snapshot.to_bits()))
    }

    pub fn load(&self) -> PlaybackSnapshot {
        PlaybackSnapshot::from_bits(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, snapshot: PlaybackSnapshot) {
        self.0.store(snapshot.to_bits(), Ordering::Release);
    }
}

/// State shared between the controller and the transport thread.
#[derive(Debug, Default)]
struct Shared {
    snapshot: SnapshotCell,
    running: AtomicBool,
    single_step: AtomicBool,
    step_request: AtomicBool,
    step_completed: AtomicBool,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

/// Headless tracker controller: owns a song and drives playback.
pub struct Controller {
    song: Song,
    shared: Arc<Shared>,
    row_interval: Duration,
    playback: Option<PlaybackHandle>,
}

impl Controller {
    pub fn new() -> Self {
        Self::with_song(Song::with_channels("Untitled", 4, 64))
    }

    pub fn with_song(song: Song) -> Self {
        Self {
            song,
            shared: Arc::new(Shared::default()),
            row_interval: Duration::from_millis(125),
            playback: None,
        }
    }

    // --- Song management ---

    pub fn song(&self) -> &Song {
        &self.song
    }

    /// Mutable song access. Order list changes take effect on the next play.
    pub fn song_mut(&mut self) -> &mut Song {
        &mut self.song
    }

    pub fn set_collapse(&mut self, channel: u16, collapse: CollapseLevel) -> bool {
        self.song.set_collapse(channel, collapse)
    }

    /// Step a channel to its next collapse level.
    pub fn cycle_collapse(&mut self, channel: u16) -> bool {
        match self.song.channel_layout(channel) {
            Some(layout) => self.song.set_collapse(channel, layout.collapse.cycle()),
            None => false,
        }
    }

    pub fn set_effect_columns(&mut self, channel: u16, count: u8) -> bool {
        self.song.set_effect_columns(channel, count)
    }

    pub fn set_visible(&mut self, channel: u16, visible: bool) -> bool {
        self.song.set_visible(channel, visible)
    }

    // --- Transport ---

    /// Time between rows while playing freely.
    pub fn set_row_interval(&mut self, interval: Duration) {
        self.row_interval = interval;
    }

    pub fn play(&mut self) -> Result<(), TransportError> {
        self.play_from(0)
    }

    pub fn play_from(&mut self, order: u16) -> Result<(), TransportError> {
        let count = self.song.order_count();
        if order >= count {
            return Err(TransportError::OrderOutOfRange { order, count });
        }
        self.stop();

        let lengths: Vec<u16> = (0..count).map(|o| self.song.pattern_length_for(o)).collect();
        let stop_signal = Arc::new(AtomicBool::new(false));
        self.shared.snapshot.store(PlaybackSnapshot::new(order, 0));
        self.shared.step_request.store(false, Ordering::Relaxed);
        self.shared.step_completed.store(false, Ordering::Relaxed);
        self.shared.running.store(true, Ordering::Release);

        let shared = self.shared.clone();
        let stop = stop_signal.clone();
        let interval = self.row_interval;
        let spawned = std::thread::Builder::new()
            .name("transport".into())
            .spawn(move || transport_thread(lengths, order, shared, stop, interval));
        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                return Err(e.into());
            }
        };

        info!("playing from order {}", order);
        self.playback = Some(PlaybackHandle {
            stop_signal,
            thread: Some(thread),
        });
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = pb.thread.take() {
                handle.thread().unpark();
                let _ = handle.join();
            }
            info!("stopped at {:?}", self.shared.snapshot.load());
        }
        self.shared.running.store(false, Ordering::Release);
    }

    /// In single-step mode the transport only moves on `step_row`.
    /// Any row requested before the switch is dropped.
    pub fn set_single_step(&mut self, enabled: bool) {
        self.shared.step_request.store(false, Ordering::Release);
        self.shared.single_step.store(enabled, Ordering::Release);
        if let Some(handle) = self.playback.as_ref().and_then(|p| p.thread.as_ref()) {
            handle.thread().unpark();
        }
    }

    /// Ask the transport to play one row (single-step mode).
    pub fn step_row(&self) -> Result<(), TransportError> {
        let handle = self
            .playback
            .as_ref()
            .and_then(|p| p.thread.as_ref())
            .ok_or(TransportError::NotPlaying)?;
        if !self.shared.single_step.load(Ordering::Acquire) {
            return Err(TransportError::NotSingleStepping);
        }
        self.shared.step_request.store(true, Ordering::Release);
        handle.thread().unpark();
        Ok(())
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Transport for Controller {
    fn playback_snapshot(&self) -> PlaybackSnapshot {
        self.shared.snapshot.load()
    }

    fn is_playing(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    fn is_single_stepping(&self) -> bool {
        self.shared.single_step.load(Ordering::Acquire)
    }

    fn take_step_completed(&self) -> bool {
        self.shared.step_completed.swap(false, Ordering::AcqRel)
    }
}

fn advance(lengths: &[u16], pos: PlaybackSnapshot) -> PlaybackSnapshot {
    let rows = lengths.get(pos.order as usize).copied().unwrap_or(1).max(1);
    if pos.row + 1 < rows {
        PlaybackSnapshot::new(pos.order, pos.row + 1)
    } else {
        let next = (pos.order as usize + 1) % lengths.len().max(1);
        PlaybackSnapshot::new(next as u16, 0)
    }
}

fn transport_thread(
    lengths: Vec<u16>,
    start: u16,
    shared: Arc<Shared>,
    stop_signal: Arc<AtomicBool>,
    interval: Duration,
) {
    let mut pos = PlaybackSnapshot::new(start, 0);
    while !stop_signal.load(Ordering::Relaxed) {
        if shared.single_step.load(Ordering::Acquire) {
            if !shared.step_request.swap(false, Ordering::AcqRel) {
                std::thread::park_timeout(Duration::from_millis(5));
                continue;
            }
            pos = advance(&lengths, pos);
            shared.snapshot.store(pos);
            shared.step_completed.store(true, Ordering::Release);
            debug!("stepped to {}:{}", pos.order, pos.row);
        } else {
            std::thread::park_timeout(interval);
            if stop_signal.load(Ordering::Relaxed) || shared.single_step.load(Ordering::Acquire) {
                continue;
            }
            pos = advance(&lengths, pos);
            shared.snapshot.store(pos);
        }
    }
}
