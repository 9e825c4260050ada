use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{LibraryError, Result};
use crate::models::{Blob, Song, SongUpdate};

const SONG_COLUMNS: &str =
    "id, name, audio_type, audio_data, image_type, image_data, added_date";

/// Hydrate a `Song` from a row selected with [`SONG_COLUMNS`]. An icon whose
/// type or data column is missing is treated as absent.
fn map_song(row: &Row<'_>) -> rusqlite::Result<Song> {
    let image_type: Option<String> = row.get(4)?;
    let image_data: Option<Vec<u8>> = row.get(5)?;

    Ok(Song {
        id: row.get(0)?,
        name: row.get(1)?,
        audio: Blob {
            media_type: row.get(2)?,
            bytes: row.get(3)?,
        },
        image: match (image_type, image_data) {
            (Some(media_type), Some(bytes)) => Some(Blob { media_type, bytes }),
            _ => None,
        },
        added_date: row.get(6)?,
    })
}

/// Insert a new row and return the id SQLite assigned to it.
pub fn insert_song(
    conn: &Connection,
    name: &str,
    audio: &Blob,
    image: Option<&Blob>,
    added_date: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO songs (name, audio_type, audio_data, image_type, image_data, added_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            name,
            audio.media_type,
            audio.bytes,
            image.map(|blob| blob.media_type.as_str()),
            image.map(|blob| blob.bytes.as_slice()),
            added_date,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Fetch every song in id order. One statement, so the result reflects a
/// single point in time.
pub fn fetch_all_songs(conn: &Connection) -> Result<Vec<Song>> {
    let mut stmt = conn.prepare(&format!("SELECT {SONG_COLUMNS} FROM songs ORDER BY id"))?;

    let songs = stmt
        .query_map([], map_song)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(count = songs.len(), "listed songs");
    Ok(songs)
}

pub fn fetch_song(conn: &Connection, id: i64) -> Result<Option<Song>> {
    let song = conn
        .query_row(
            &format!("SELECT {SONG_COLUMNS} FROM songs WHERE id = ?1"),
            params![id],
            map_song,
        )
        .optional()?;
    Ok(song)
}

pub fn count_songs(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Merge `update` into the stored song. The read and the write share one
/// transaction so no other writer can slip in between them.
pub fn update_song(conn: &Connection, id: i64, update: &SongUpdate) -> Result<Song> {
    let tx = conn.unchecked_transaction()?;

    let mut song = fetch_song(&tx, id)?.ok_or(LibraryError::NotFound(id))?;
    if let Some(name) = &update.name {
        song.name = name.clone();
    }
    if let Some(image) = &update.image {
        song.image = image.clone();
    }

    tx.execute(
        "UPDATE songs SET name = ?1, image_type = ?2, image_data = ?3 WHERE id = ?4",
        params![
            song.name,
            song.image.as_ref().map(|blob| blob.media_type.as_str()),
            song.image.as_ref().map(|blob| blob.bytes.as_slice()),
            id,
        ],
    )?;
    tx.commit()?;

    Ok(song)
}

/// Delete a song. Returns whether a row was actually removed; a missing id is
/// not an error.
pub fn delete_song(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM songs WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}
