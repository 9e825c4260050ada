//! Offline media library for a toddler-friendly music kiosk.
//!
//! Songs (audio plus an optional icon) live in an embedded SQLite store,
//! a single playback pointer tracks what is playing, and the whole library
//! can be exported to and restored from a portable JSON backup. The terminal
//! admin screen in [`ui`] is one consumer of this surface.
pub mod backup;
pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod models;
pub mod music_box;
pub mod playback;
pub mod ui;

pub use backup::{export_all, import_all, import_json, BackupDocument, BackupSong, ImportSummary};
pub use config::Config;
pub use db::Library;
pub use error::{LibraryError, Result};
pub use models::{Blob, Song, SongUpdate};
pub use music_box::MusicBox;
pub use playback::{PlaybackChange, PlaybackPointer};

/// The interactive admin entry point and its state container.
pub use ui::{run_app, App};
