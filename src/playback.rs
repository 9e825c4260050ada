//! The single "currently playing" reference. It owns no persisted state and
//! never touches the store; [`crate::MusicBox`] checks ids against the
//! library before handing them over.

/// What a call to [`PlaybackPointer::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackChange {
    Started { id: i64, replaced: Option<i64> },
    Stopped { id: i64 },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlaybackPointer {
    current: Option<i64>,
}

impl PlaybackPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<i64> {
        self.current
    }

    /// Identity check used wherever a song needs to know whether it is the
    /// active one.
    pub fn is_active(&self, id: i64) -> bool {
        self.current == Some(id)
    }

    /// Point at `id`, clearing whatever was active first. Returns the previous
    /// id if it was a different song.
    pub fn set(&mut self, id: i64) -> Option<i64> {
        let previous = self.current.take();
        self.current = Some(id);
        previous.filter(|prev| *prev != id)
    }

    /// Selecting the active song stops it; selecting any other song switches
    /// to it.
    pub fn toggle(&mut self, id: i64) -> PlaybackChange {
        if self.is_active(id) {
            self.current = None;
            PlaybackChange::Stopped { id }
        } else {
            let replaced = self.set(id);
            PlaybackChange::Started { id, replaced }
        }
    }

    pub fn stop(&mut self) -> Option<i64> {
        self.current.take()
    }

    /// Playback of `id` reached its end. A stale signal for a song that is no
    /// longer active is ignored.
    pub fn finished(&mut self, id: i64) -> bool {
        self.release(id)
    }

    /// Drop the pointer if it references `id`, for example because the song
    /// is being deleted.
    pub fn release(&mut self, id: i64) -> bool {
        if self.is_active(id) {
            self.current = None;
            true
        } else {
            false
        }
    }
}
