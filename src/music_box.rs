//! Application context that owns the library and the playback pointer, so the
//! rules tying them together live in one place instead of in every screen.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::backup::{self, ImportSummary};
use crate::db::Library;
use crate::error::{LibraryError, Result};
use crate::models::{Blob, Song, SongUpdate};
use crate::playback::{PlaybackChange, PlaybackPointer};

pub struct MusicBox {
    library: Library,
    playback: PlaybackPointer,
}

impl MusicBox {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            playback: PlaybackPointer::new(),
        }
    }

    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(Library::open(db_path)?))
    }

    /// Stop playback and close the library.
    pub fn close(mut self) -> Result<()> {
        self.playback.stop();
        self.library.close()
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn playback(&self) -> &PlaybackPointer {
        &self.playback
    }

    pub fn songs(&self) -> Result<Vec<Song>> {
        self.library.list()
    }

    pub fn add_song(&self, name: &str, audio: &Blob) -> Result<i64> {
        self.library.add(name, audio, None)
    }

    pub fn set_icon(&self, id: i64, image: Blob) -> Result<Song> {
        self.library.update(id, &SongUpdate::icon(image))
    }

    /// Play `id`, or stop it if it is already playing. The id must exist at
    /// the moment the pointer is set.
    pub fn play(&mut self, id: i64) -> Result<PlaybackChange> {
        if !self.playback.is_active(id) && !self.library.contains(id)? {
            return Err(LibraryError::NotFound(id));
        }
        let change = self.playback.toggle(id);
        info!(?change, "playback changed");
        Ok(change)
    }

    pub fn stop(&mut self) -> Option<i64> {
        self.playback.stop()
    }

    /// Signal from the audio output that `id` finished playing.
    pub fn playback_ended(&mut self, id: i64) -> bool {
        self.playback.finished(id)
    }

    /// The song currently selected for playback, if it still exists.
    pub fn now_playing(&self) -> Result<Option<Song>> {
        match self.playback.current() {
            Some(id) => match self.library.get(id) {
                Ok(song) => Ok(Some(song)),
                Err(LibraryError::NotFound(_)) => Ok(None),
                Err(err) => Err(err),
            },
            None => Ok(None),
        }
    }

    /// Delete a song, releasing the playback pointer first if it referenced
    /// it. Returns whether a row was removed.
    pub fn delete_song(&mut self, id: i64) -> Result<bool> {
        if self.playback.release(id) {
            info!(id, "stopped playback of deleted song");
        }
        self.library.remove(id)
    }

    pub fn export_backup(&self, dir: &Path) -> Result<PathBuf> {
        backup::write_backup(&self.library, dir)
    }

    pub fn import_backup(&self, path: &Path) -> Result<ImportSummary> {
        backup::read_backup(&self.library, path)
    }
}
