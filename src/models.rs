//! Domain models that mirror the SQLite schema and get passed between the
//! store, the backup serializer and the admin screen. They stay plain data
//! holders so persistence and presentation logic live elsewhere.

use std::fmt;

/// Opaque binary payload tagged with the media type it was declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Declared media type, for example `audio/mpeg` or `image/png`. Stored
    /// verbatim; nothing in the library interprets it.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Blob {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One persisted library entry.
pub struct Song {
    /// Primary key assigned by the store. Never reused after deletion.
    pub id: i64,
    /// Label shown on the song tile.
    pub name: String,
    /// Required audio payload, immutable after creation.
    pub audio: Blob,
    /// Optional icon shown instead of the placeholder letter.
    pub image: Option<Blob>,
    /// ISO-8601 timestamp set once when the record was created.
    pub added_date: String,
}

impl Song {
    /// First letter of the name, upper-cased. Used as the placeholder when no
    /// icon has been set.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|ch| ch.to_uppercase().collect())
            .unwrap_or_default()
    }

    pub fn has_icon(&self) -> bool {
        self.image.is_some()
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Partial update applied by [`crate::db::Library::update`]. Fields left as
/// `None` keep their stored value. The audio payload and the added date are
/// not part of the update surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongUpdate {
    pub name: Option<String>,
    /// `Some(None)` clears the icon, `Some(Some(blob))` sets or replaces it.
    pub image: Option<Option<Blob>>,
}

impl SongUpdate {
    /// Update that only sets or replaces the icon.
    pub fn icon(image: Blob) -> Self {
        Self {
            name: None,
            image: Some(Some(image)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image.is_none()
    }
}
