//! Persistence layer. Query helpers live in submodules and take a plain
//! `&Connection`; [`Library`] owns the connection and enforces the song
//! invariants on top of them.

mod connection;
mod songs;

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use tracing::info;

pub use connection::{ensure_schema, open_database, open_in_memory, SCHEMA_VERSION};
pub use songs::{
    count_songs, delete_song, fetch_all_songs, fetch_song, insert_song, update_song,
};

use crate::error::{LibraryError, Result};
use crate::models::{Blob, Song, SongUpdate};

/// Current time in the `2024-05-01T08:00:00.000Z` shape used for every stored
/// and exported timestamp.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Durable keyed storage of songs.
pub struct Library {
    conn: Connection,
}

impl Library {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: open_in_memory()?,
        })
    }

    /// Close the underlying connection, surfacing any error SQLite reports
    /// while flushing.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| LibraryError::from(err))?;
        info!("closed song library");
        Ok(())
    }

    /// Add a new song with no icon unless one is supplied. Returns the fresh id.
    pub fn add(&self, name: &str, audio: &Blob, image: Option<&Blob>) -> Result<i64> {
        self.insert(name, audio, image, &timestamp_now())
    }

    /// Re-insert a song carrying its original added date, as a backup import
    /// does. A new id is still assigned.
    pub fn restore(
        &self,
        name: &str,
        audio: &Blob,
        image: Option<&Blob>,
        added_date: &str,
    ) -> Result<i64> {
        self.insert(name, audio, image, added_date)
    }

    fn insert(&self, name: &str, audio: &Blob, image: Option<&Blob>, added_date: &str) -> Result<i64> {
        if name.trim().is_empty() {
            return Err(LibraryError::InvalidSong("name is empty"));
        }
        if audio.is_empty() {
            return Err(LibraryError::InvalidSong("audio payload is empty"));
        }

        let id = insert_song(&self.conn, name, audio, image, added_date)?;
        info!(id, name, audio_bytes = audio.len(), has_icon = image.is_some(), "added song");
        Ok(id)
    }

    pub fn list(&self) -> Result<Vec<Song>> {
        fetch_all_songs(&self.conn)
    }

    pub fn get(&self, id: i64) -> Result<Song> {
        fetch_song(&self.conn, id)?.ok_or(LibraryError::NotFound(id))
    }

    pub fn contains(&self, id: i64) -> Result<bool> {
        Ok(fetch_song(&self.conn, id)?.is_some())
    }

    pub fn count(&self) -> Result<usize> {
        count_songs(&self.conn)
    }

    /// Merge the supplied fields into an existing song and return the result.
    pub fn update(&self, id: i64, update: &SongUpdate) -> Result<Song> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(LibraryError::InvalidSong("name is empty"));
            }
        }

        let song = update_song(&self.conn, id, update)?;
        info!(
            id,
            renamed = update.name.is_some(),
            icon_changed = update.image.is_some(),
            "updated song"
        );
        Ok(song)
    }

    /// Remove a song. Returns `false` when the id was not present.
    pub fn remove(&self, id: i64) -> Result<bool> {
        let removed = delete_song(&self.conn, id)?;
        info!(id, removed, "removed song");
        Ok(removed)
    }
}
