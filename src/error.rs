//! Error taxonomy for the media library core. UI glue wraps these in
//! `anyhow::Error`; the core itself keeps them typed so callers can match on
//! `NotFound` or `EmptyLibrary` without string inspection.

use thiserror::Error;

use crate::codec::CodecError;

pub type Result<T, E = LibraryError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LibraryError {
    /// The durable medium failed: unavailable, full, or holding a corrupt row.
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("storage failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported database schema version {found} (expected {expected})")]
    SchemaVersion { found: i64, expected: i64 },

    #[error("song {0} not found")]
    NotFound(i64),

    #[error("invalid song: {0}")]
    InvalidSong(&'static str),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("invalid backup document: {0}")]
    Format(String),

    /// Informational: export was requested but there is nothing to export.
    #[error("library is empty, nothing to export")]
    EmptyLibrary,
}

impl LibraryError {
    /// True for faults of the durable medium itself.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            LibraryError::Storage(_) | LibraryError::Io(_) | LibraryError::SchemaVersion { .. }
        )
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        LibraryError::Format(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_class_covers_medium_faults_only() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(LibraryError::from(io).is_storage());
        assert!(LibraryError::from(rusqlite::Error::InvalidQuery).is_storage());
        assert!(LibraryError::SchemaVersion {
            found: 2,
            expected: 1
        }
        .is_storage());

        assert!(!LibraryError::NotFound(1).is_storage());
        assert!(!LibraryError::EmptyLibrary.is_storage());
        assert!(!LibraryError::format("bad").is_storage());
    }
}
