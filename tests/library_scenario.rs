use std::collections::HashSet;

use toddler_music::{
    export_all, import_all, import_json, Blob, Library, LibraryError, MusicBox, SongUpdate,
};

fn lullaby_audio() -> Blob {
    Blob::new("audio/mpeg", b"ID3\x04lullaby".to_vec())
}

fn rhyme_audio() -> Blob {
    Blob::new("audio/ogg", b"OggSrhyme".to_vec())
}

fn rhyme_icon() -> Blob {
    Blob::new("image/png", b"\x89PNG\r\n".to_vec())
}

#[test]
fn add_list_export_and_reimport() {
    let library = Library::open_in_memory().unwrap();
    let lullaby = library.add("Lullaby", &lullaby_audio(), None).unwrap();
    let rhyme = library
        .add("Nursery Rhyme", &rhyme_audio(), Some(&rhyme_icon()))
        .unwrap();
    assert_eq!((lullaby, rhyme), (1, 2));

    let ids: HashSet<i64> = library.list().unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, HashSet::from([1, 2]));

    let document = export_all(&library).unwrap();
    assert_eq!(document.songs.len(), 2);

    // Re-importing into the same library is additive and never overwrites.
    let summary = import_all(&library, &document).unwrap();
    assert_eq!((summary.imported, summary.total), (2, 2));
    let ids: HashSet<i64> = library.list().unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, HashSet::from([1, 2, 3, 4]));

    // A fresh library gets its own ids and identical content.
    let fresh = Library::open_in_memory().unwrap();
    let summary = import_all(&fresh, &document).unwrap();
    assert_eq!((summary.imported, summary.total), (2, 2));
    let restored = fresh.list().unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[1].audio, rhyme_audio());
    assert_eq!(restored[1].image, Some(rhyme_icon()));
}

#[test]
fn json_text_survives_the_trip() {
    let library = Library::open_in_memory().unwrap();
    library.add("Lullaby", &lullaby_audio(), None).unwrap();
    let text = serde_json::to_string(&export_all(&library).unwrap()).unwrap();

    let target = Library::open_in_memory().unwrap();
    let existing = target.add("Already here", &rhyme_audio(), None).unwrap();
    let summary = import_json(&target, &text).unwrap();

    assert_eq!((summary.imported, summary.total), (1, 1));
    assert_eq!(target.count().unwrap(), 2);
    assert_eq!(target.get(existing).unwrap().name, "Already here");
}

#[test]
fn empty_library_signals_instead_of_exporting() {
    let library = Library::open_in_memory().unwrap();
    assert!(matches!(export_all(&library), Err(LibraryError::EmptyLibrary)));
}

#[test]
fn icon_and_delete_through_the_context() {
    let mut music_box = MusicBox::new(Library::open_in_memory().unwrap());
    let id = music_box.add_song("Lullaby", &lullaby_audio()).unwrap();

    let song = music_box.set_icon(id, rhyme_icon()).unwrap();
    assert_eq!(song.audio, lullaby_audio());
    assert!(song.has_icon());

    music_box.play(id).unwrap();
    music_box.delete_song(id).unwrap();
    assert_eq!(music_box.playback().current(), None);

    let err = music_box
        .library()
        .update(id, &SongUpdate::icon(rhyme_icon()))
        .unwrap_err();
    assert!(matches!(err, LibraryError::NotFound(_)));
}

#[test]
fn library_persists_between_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.sqlite");

    let music_box = MusicBox::open(&path).unwrap();
    music_box.add_song("Lullaby", &lullaby_audio()).unwrap();
    let backup_path = music_box.export_backup(&dir.path().join("backups")).unwrap();
    music_box.close().unwrap();

    let music_box = MusicBox::open(&path).unwrap();
    assert_eq!(music_box.songs().unwrap().len(), 1);
    let summary = music_box.import_backup(&backup_path).unwrap();
    assert_eq!((summary.imported, summary.total), (1, 1));
    assert_eq!(music_box.songs().unwrap().len(), 2);
}
