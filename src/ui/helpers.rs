use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::error::LibraryError;
use crate::models::Song;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Footer text for a library error. Faults of the storage medium get a hint
/// that nothing was changed.
pub(crate) fn describe_library_error(err: &LibraryError) -> String {
    if err.is_storage() {
        format!("{err}. The library was not changed.")
    } else {
        err.to_string()
    }
}

/// Second line of a song row: icon state and the date part of `added_date`.
pub(crate) fn song_meta(song: &Song) -> String {
    let icon = if song.has_icon() {
        "Has custom image"
    } else {
        "Using placeholder"
    };
    let added = song.added_date.split('T').next().unwrap_or_default();
    if added.is_empty() {
        icon.to_string()
    } else {
        format!("{icon} · added {added}")
    }
}

/// Human readable byte count for the status footer.
pub(crate) fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f < KIB {
        format!("{bytes} B")
    } else if bytes_f < KIB * KIB {
        format!("{:.1} KiB", bytes_f / KIB)
    } else {
        format!("{:.1} MiB", bytes_f / (KIB * KIB))
    }
}
