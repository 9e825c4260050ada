//! Turning files picked by the parent into blobs the library accepts.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::Blob;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Media type declared for a file, guessed from its extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("wav") => "audio/wav",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("flac") => "audio/flac",
        Some("webm") => "audio/webm",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        _ => FALLBACK_MEDIA_TYPE,
    }
}

/// Song label derived from a file name: everything before the last dot.
pub fn song_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Blob {
    /// Read a whole file and tag it with the media type its extension implies.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Blob::new(media_type_for_path(path), bytes))
    }
}
