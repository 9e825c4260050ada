use std::path::PathBuf;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Song;

/// What the typed path will be used for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PathPurpose {
    AddSong,
    SetIcon { song_id: i64, song_name: String },
    ImportBackup,
}

impl PathPurpose {
    pub(crate) fn title(&self) -> String {
        match self {
            PathPurpose::AddSong => "Add Song".to_string(),
            PathPurpose::SetIcon { song_name, .. } => format!("Set Icon for '{song_name}'"),
            PathPurpose::ImportBackup => "Import Backup".to_string(),
        }
    }

    pub(crate) fn hint(&self) -> &'static str {
        match self {
            PathPurpose::AddSong => "Path to an audio file. The file name becomes the song name.",
            PathPurpose::SetIcon { .. } => "Path to an image file.",
            PathPurpose::ImportBackup => "Path to a toddler-music-backup-*.json file.",
        }
    }
}

/// Single-field form that collects a file path.
#[derive(Clone)]
pub(crate) struct PathForm {
    pub(crate) purpose: PathPurpose,
    pub(crate) path: String,
    pub(crate) error: Option<String>,
}

impl PathForm {
    pub(crate) fn new(purpose: PathPurpose) -> Self {
        Self {
            purpose,
            path: String::new(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.path.push(ch);
        self.error = None;
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.path.pop();
    }

    /// Validate the input and return a path that exists on disk.
    pub(crate) fn parse_path(&self) -> Result<PathBuf> {
        let raw = self.path.trim();
        if raw.is_empty() {
            return Err(anyhow!("A file path is required."));
        }
        let path = PathBuf::from(raw);
        if !path.is_file() {
            return Err(anyhow!("No file at {}.", path.display()));
        }
        Ok(path)
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        let (display, style) = if self.path.is_empty() {
            ("<required>".to_string(), Style::default().fg(Color::DarkGray))
        } else {
            (self.path.clone(), Style::default().fg(Color::Yellow))
        };

        Line::from(vec![Span::raw("Path: "), Span::styled(display, style)])
    }

    pub(crate) fn value_len(&self) -> usize {
        self.path.chars().count()
    }
}

/// State for confirming permanent song deletion.
pub(crate) struct ConfirmSongDelete {
    pub(crate) song_id: i64,
    pub(crate) name: String,
}

impl ConfirmSongDelete {
    pub(crate) fn from(song: &Song) -> Self {
        Self {
            song_id: song.id,
            name: song.name.clone(),
        }
    }
}
