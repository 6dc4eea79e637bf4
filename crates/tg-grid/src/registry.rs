//! Several pattern views side by side, ticked from one transport sample.

use slotmap::SlotMap;

use crate::source::{FrameInput, SongSource, Transport};
use crate::view::{FrameReport, PatternViewState};

slotmap::new_key_type! {
    /// Handle to a view in a `ViewRegistry`.
    pub struct ViewId;
}

#[derive(Clone, Debug, Default)]
pub struct ViewRegistry {
    views: SlotMap<ViewId, PatternViewState>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self { views: SlotMap::with_key() }
    }

    pub fn insert(&mut self, view: PatternViewState) -> ViewId {
        self.views.insert(view)
    }

    pub fn remove(&mut self, id: ViewId) -> Option<PatternViewState> {
        self.views.remove(id)
    }

    pub fn get(&self, id: ViewId) -> Option<&PatternViewState> {
        self.views.get(id)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut PatternViewState> {
        self.views.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ViewId, &PatternViewState)> {
        self.views.iter()
    }

    /// Sample the transport once and tick every view with that sample.
    /// `on_report` sees each view's result.
    pub fn tick_all<S, T, F>(&mut self, source: &S, transport: &T, mut on_report: F) -> FrameInput
    where
        S: SongSource + ?Sized,
        T: Transport + ?Sized,
        F: FnMut(ViewId, FrameReport),
    {
        let frame = FrameInput::sample(transport);
        for (id, view) in self.views.iter_mut() {
            on_report(id, view.tick(source, &frame));
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use crate::address::CellAddress;
    use tg_ir::{PlaybackSnapshot, Song};

    /// Transport that counts how often it is read.
    struct CountingTransport {
        reads: Cell<u32>,
        snapshot: PlaybackSnapshot,
    }

    impl Transport for CountingTransport {
        fn playback_snapshot(&self) -> PlaybackSnapshot {
            self.reads.set(self.reads.get() + 1);
            self.snapshot
        }
        fn is_playing(&self) -> bool {
            true
        }
        fn is_single_stepping(&self) -> bool {
            false
        }
        fn take_step_completed(&self) -> bool {
            false
        }
    }

    #[test]
    fn one_snapshot_read_per_frame() {
        let song = Song::with_channels("reg", 2, 16);
        let transport = CountingTransport {
            reads: Cell::new(0),
            snapshot: PlaybackSnapshot::new(0, 6),
        };
        let mut reg = ViewRegistry::new();
        let a = reg.insert(PatternViewState::default());
        let b = reg.insert(PatternViewState::default());

        let mut reports = 0;
        reg.tick_all(&song, &transport, |_, r| {
            assert!(r.followed);
            reports += 1;
        });
        assert_eq!(reports, 2);
        assert_eq!(transport.reads.get(), 1);
        assert_eq!(reg.get(a).unwrap().cursor_address().row, 6);
        assert_eq!(reg.get(b).unwrap().cursor_address().row, 6);
    }

    #[test]
    fn views_keep_their_own_cursor() {
        let song = Song::with_channels("reg", 2, 16);
        let mut reg = ViewRegistry::new();
        let a = reg.insert(PatternViewState::default());
        let b = reg.insert(PatternViewState::default());
        reg.get_mut(a).unwrap().set_cursor_address(&song, CellAddress::new(0, 3, 1, 0));
        assert_eq!(reg.get(b).unwrap().cursor_address(), CellAddress::default());

        assert!(reg.remove(a).is_some());
        assert!(reg.get(a).is_none());
        assert_eq!(reg.len(), 1);
    }
}
