//! Whole-library export and import.
//!
//! Export reads the full listing and encodes every payload with
//! [`crate::codec`]. Import is additive: each entry is decoded and inserted
//! under a fresh id, and a bad entry is counted rather than aborting the
//! batch. There is no rollback, so songs inserted before a storage fault stay
//! in the library.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::codec;
use crate::db::{timestamp_now, Library};
use crate::error::{LibraryError, Result};

/// Format tag written into every export and the only one accepted on import.
pub const BACKUP_VERSION: u64 = 1;

const FILE_PREFIX: &str = "toddler-music-backup-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: u64,
    pub export_date: String,
    pub songs: Vec<BackupSong>,
}

/// One song inside a backup. Ids are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSong {
    pub name: String,
    pub audio: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub added_date: Option<String>,
}

/// Outcome of an import: how many entries made it in out of how many were
/// attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub total: usize,
}

impl ImportSummary {
    pub fn failed(&self) -> usize {
        self.total - self.imported
    }

    pub fn is_complete(&self) -> bool {
        self.imported == self.total
    }
}

/// Snapshot the whole library, stamped with the current time.
pub fn export_all(library: &Library) -> Result<BackupDocument> {
    export_all_at(library, timestamp_now())
}

pub fn export_all_at(library: &Library, export_date: String) -> Result<BackupDocument> {
    let songs = library.list()?;
    if songs.is_empty() {
        return Err(LibraryError::EmptyLibrary);
    }

    let songs: Vec<BackupSong> = songs
        .iter()
        .map(|song| BackupSong {
            name: song.name.clone(),
            audio: codec::encode(&song.audio),
            image: song.image.as_ref().map(codec::encode),
            added_date: Some(song.added_date.clone()),
        })
        .collect();

    info!(songs = songs.len(), "exported library");
    Ok(BackupDocument {
        version: BACKUP_VERSION,
        export_date,
        songs,
    })
}

/// Import an already deserialized document.
pub fn import_all(library: &Library, document: &BackupDocument) -> Result<ImportSummary> {
    check_version(Some(document.version))?;
    let entries = document.songs.iter().cloned().map(Ok);
    Ok(import_entries(library, entries))
}

/// Parse backup text and import it. Only a broken document envelope is
/// fatal; a song entry of the wrong shape counts as one failed entry.
pub fn import_json(library: &Library, text: &str) -> Result<ImportSummary> {
    let document: Value = serde_json::from_str(text)
        .map_err(|err| LibraryError::format(format!("not valid JSON: {err}")))?;
    let envelope = document
        .as_object()
        .ok_or_else(|| LibraryError::format("document is not an object"))?;

    check_version(envelope.get("version").and_then(Value::as_u64))?;
    let songs = envelope
        .get("songs")
        .and_then(Value::as_array)
        .ok_or_else(|| LibraryError::format("missing songs list"))?;

    let entries = songs.iter().map(|entry| {
        BackupSong::deserialize(entry)
            .map_err(|err| LibraryError::format(format!("malformed song entry: {err}")))
    });
    Ok(import_entries(library, entries))
}

fn check_version(version: Option<u64>) -> Result<()> {
    match version {
        Some(BACKUP_VERSION) => Ok(()),
        Some(other) => Err(LibraryError::format(format!(
            "unsupported backup version {other}"
        ))),
        None => Err(LibraryError::format("missing backup version")),
    }
}

fn import_entries<I>(library: &Library, entries: I) -> ImportSummary
where
    I: IntoIterator<Item = Result<BackupSong>>,
{
    let mut summary = ImportSummary {
        imported: 0,
        total: 0,
    };

    for (index, entry) in entries.into_iter().enumerate() {
        summary.total += 1;
        match entry.and_then(|song| import_entry(library, &song)) {
            Ok(id) => {
                summary.imported += 1;
                debug!(index, id, "imported song");
            }
            Err(err) => warn!(index, error = %err, "skipping backup entry"),
        }
    }

    info!(
        imported = summary.imported,
        total = summary.total,
        "imported backup"
    );
    summary
}

fn import_entry(library: &Library, song: &BackupSong) -> Result<i64> {
    let audio = codec::decode(&song.audio)?;
    let image = song.image.as_deref().map(codec::decode).transpose()?;
    let added_date = song.added_date.clone().unwrap_or_else(timestamp_now);

    library.restore(&song.name, &audio, image.as_ref(), &added_date)
}

/// `toddler-music-backup-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{FILE_PREFIX}{}.json", date.format("%Y-%m-%d"))
}

/// Export the library into `dir` using today's file name and return the path
/// that was written.
pub fn write_backup(library: &Library, dir: &Path) -> Result<PathBuf> {
    let document = export_all(library)?;
    let text = serde_json::to_string_pretty(&document)
        .map_err(|err| LibraryError::format(err.to_string()))?;

    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(Utc::now().date_naive()));
    fs::write(&path, text)?;

    info!(path = %path.display(), "wrote backup file");
    Ok(path)
}

/// Read a backup file and import its songs. A file that is not UTF-8 text is
/// a malformed document, not a storage fault.
pub fn read_backup(library: &Library, path: &Path) -> Result<ImportSummary> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|err| LibraryError::format(format!("backup is not UTF-8 text: {err}")))?;
    import_json(library, &text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::Blob;

    fn seeded_library() -> Library {
        let library = Library::open_in_memory().unwrap();
        library
            .add("Lullaby", &Blob::new("audio/mpeg", vec![1, 2, 3]), None)
            .unwrap();
        library
            .add(
                "Nursery Rhyme",
                &Blob::new("audio/ogg", vec![4, 5, 6]),
                Some(&Blob::new("image/png", vec![7, 8])),
            )
            .unwrap();
        library
    }

    #[test]
    fn empty_library_refuses_export() {
        let library = Library::open_in_memory().unwrap();
        assert!(matches!(
            export_all(&library),
            Err(LibraryError::EmptyLibrary)
        ));
    }

    #[test]
    fn export_encodes_every_song_in_listing_order() {
        let library = seeded_library();
        let document = export_all_at(&library, "2024-05-01T08:00:00.000Z".into()).unwrap();

        assert_eq!(document.version, BACKUP_VERSION);
        assert_eq!(document.export_date, "2024-05-01T08:00:00.000Z");
        let names: Vec<&str> = document.songs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Lullaby", "Nursery Rhyme"]);
        assert_eq!(document.songs[0].audio, "data:audio/mpeg;base64,AQID");
        assert_eq!(document.songs[0].image, None);
        assert_eq!(
            document.songs[1].image.as_deref(),
            Some("data:image/png;base64,Bwg=")
        );
    }

    #[test]
    fn serialized_document_uses_camel_case_and_null_image() {
        let library = seeded_library();
        let document = export_all_at(&library, "2024-05-01T08:00:00.000Z".into()).unwrap();
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(value["version"], json!(1));
        assert_eq!(value["exportDate"], json!("2024-05-01T08:00:00.000Z"));
        assert!(value["songs"][0]["image"].is_null());
        assert!(value["songs"][0]["addedDate"].is_string());
        assert!(value["songs"][0].get("id").is_none());
    }

    #[test]
    fn import_is_additive_and_preserves_existing_ids() {
        let source = seeded_library();
        let document = export_all(&source).unwrap();

        let target = Library::open_in_memory().unwrap();
        let existing = target
            .add("Existing", &Blob::new("audio/wav", vec![9]), None)
            .unwrap();

        let summary = import_all(&target, &document).unwrap();
        assert_eq!(summary, ImportSummary { imported: 2, total: 2 });
        assert!(summary.is_complete());

        let songs = target.list().unwrap();
        assert_eq!(songs.len(), 3);
        assert_eq!(songs[0].id, existing);
        assert_eq!(songs[0].name, "Existing");
    }

    #[test]
    fn import_keeps_payloads_and_added_date() {
        let source = seeded_library();
        let original = source.list().unwrap();
        let document = export_all(&source).unwrap();

        let target = Library::open_in_memory().unwrap();
        import_all(&target, &document).unwrap();

        let restored = target.list().unwrap();
        for (before, after) in original.iter().zip(&restored) {
            assert_eq!(before.name, after.name);
            assert_eq!(before.audio, after.audio);
            assert_eq!(before.image, after.image);
            assert_eq!(before.added_date, after.added_date);
        }
    }

    #[test]
    fn malformed_audio_is_counted_not_fatal() {
        let text = json!({
            "version": 1,
            "exportDate": "2024-05-01T08:00:00.000Z",
            "songs": [
                { "name": "A", "audio": "data:audio/mpeg;base64,AQID", "image": null, "addedDate": "2024-01-01T00:00:00.000Z" },
                { "name": "B", "audio": "not a token", "image": null, "addedDate": "2024-01-01T00:00:00.000Z" },
                { "name": "C", "audio": "data:audio/mpeg;base64,BAUG", "image": null, "addedDate": "2024-01-01T00:00:00.000Z" }
            ]
        })
        .to_string();

        let library = Library::open_in_memory().unwrap();
        let summary = import_json(&library, &text).unwrap();
        assert_eq!(summary, ImportSummary { imported: 2, total: 3 });
        assert_eq!(summary.failed(), 1);

        let names: Vec<String> = library.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["A", "C"]);
    }

    #[test]
    fn rejected_add_is_counted_not_fatal() {
        let text = json!({
            "version": 1,
            "songs": [
                { "name": "A", "audio": "data:audio/mpeg;base64,AQID" },
                { "name": "   ", "audio": "data:audio/mpeg;base64,AQID" },
                { "name": "Silent", "audio": "data:audio/mpeg;base64," },
                { "name": "C", "audio": "data:audio/mpeg;base64,BAUG" }
            ]
        })
        .to_string();

        let library = Library::open_in_memory().unwrap();
        let summary = import_json(&library, &text).unwrap();
        assert_eq!(summary, ImportSummary { imported: 2, total: 4 });

        let names: Vec<String> = library.list().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["A", "C"]);
    }

    #[test]
    fn wrongly_shaped_entry_is_counted_not_fatal() {
        let text = json!({
            "version": 1,
            "songs": [
                { "name": "A", "audio": "data:audio/mpeg;base64,AQID" },
                { "name": "No audio" },
                42
            ]
        })
        .to_string();

        let library = Library::open_in_memory().unwrap();
        let summary = import_json(&library, &text).unwrap();
        assert_eq!(summary, ImportSummary { imported: 1, total: 3 });

        let song = &library.list().unwrap()[0];
        assert!(song.added_date.ends_with('Z'));
    }

    #[test]
    fn broken_envelope_is_a_format_fault() {
        let library = Library::open_in_memory().unwrap();
        for text in [
            "not json",
            "[]",
            r#"{"songs": []}"#,
            r#"{"version": 2, "songs": []}"#,
            r#"{"version": "1", "songs": []}"#,
            r#"{"version": 1}"#,
            r#"{"version": 1, "songs": {}}"#,
        ] {
            let err = import_json(&library, text).unwrap_err();
            assert!(matches!(err, LibraryError::Format(_)), "{text}: {err}");
        }
        assert_eq!(library.count().unwrap(), 0);
    }

    #[test]
    fn typed_import_checks_version() {
        let library = Library::open_in_memory().unwrap();
        let document = BackupDocument {
            version: 7,
            export_date: String::new(),
            songs: Vec::new(),
        };
        assert!(matches!(
            import_all(&library, &document),
            Err(LibraryError::Format(_))
        ));
    }

    #[test]
    fn non_utf8_backup_file_is_a_format_fault() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, [0xff, 0xfe, b'{', b'}']).unwrap();

        let library = Library::open_in_memory().unwrap();
        let err = read_backup(&library, &path).unwrap_err();
        assert!(matches!(err, LibraryError::Format(_)), "{err}");
        assert!(!err.is_storage());
    }

    #[test]
    fn missing_backup_file_is_a_storage_fault() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::open_in_memory().unwrap();
        let err = read_backup(&library, &dir.path().join("absent.json")).unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(date), "toddler-music-backup-2024-03-09.json");
    }

    #[test]
    fn backup_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = seeded_library();
        let path = write_backup(&source, dir.path()).unwrap();
        assert!(path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(FILE_PREFIX)));

        let target = Library::open_in_memory().unwrap();
        let summary = read_backup(&target, &path).unwrap();
        assert_eq!(summary, ImportSummary { imported: 2, total: 2 });
    }
}
