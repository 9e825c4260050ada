use std::cmp::min;
use std::mem;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::error::LibraryError;
use crate::media::song_name_from_path;
use crate::models::{Blob, Song};
use crate::music_box::MusicBox;
use crate::playback::PlaybackChange;

use super::forms::{ConfirmSongDelete, PathForm, PathPurpose};
use super::helpers::{
    centered_rect, describe_library_error, format_size, song_meta, surface_error,
};
use super::screens::LibraryScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the "now playing" banner.
const BANNER_HEIGHT: u16 = 3;
/// Height allocation per song card.
const SONG_CARD_HEIGHT: u16 = 4;

/// Fine-grained modes scoped to the library screen.
enum Mode {
    Normal,
    EnteringPath(PathForm),
    ConfirmSongDelete(ConfirmSongDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Parent administration state: the library context, the visible song list
/// and whatever dialog is open.
pub struct App {
    music_box: MusicBox,
    backup_dir: PathBuf,
    screen: LibraryScreen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(music_box: MusicBox, backup_dir: PathBuf) -> Result<Self> {
        let songs = music_box.songs().context("failed to load songs")?;
        Ok(Self {
            music_box,
            backup_dir,
            screen: LibraryScreen::new(songs),
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Hand the library context back, for example to close it on exit.
    pub fn into_music_box(self) -> MusicBox {
        self.music_box
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::EnteringPath(form) => self.handle_path_form(code, form)?,
            Mode::ConfirmSongDelete(confirm) => self.handle_confirm_song_delete(code, confirm)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.screen.move_selection(-1),
            KeyCode::Down => self.screen.move_selection(1),
            KeyCode::PageUp => self.screen.move_selection(-5),
            KeyCode::PageDown => self.screen.move_selection(5),
            KeyCode::Home => self.screen.select_first(),
            KeyCode::End => self.screen.select_last(),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_playback()?,
            KeyCode::Char('s') => {
                if self.music_box.stop().is_some() {
                    self.set_status("Stopped.", StatusKind::Info);
                }
            }
            KeyCode::Char('a') | KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::EnteringPath(PathForm::new(PathPurpose::AddSong)));
            }
            KeyCode::Char('i') => {
                if let Some(song) = self.screen.current_song() {
                    let purpose = PathPurpose::SetIcon {
                        song_id: song.id,
                        song_name: song.name.clone(),
                    };
                    self.clear_status();
                    return Ok(Mode::EnteringPath(PathForm::new(purpose)));
                }
                self.set_status("No song selected.", StatusKind::Error);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(song) = self.screen.current_song() {
                    return Ok(Mode::ConfirmSongDelete(ConfirmSongDelete::from(song)));
                }
                self.set_status("No song selected.", StatusKind::Error);
            }
            KeyCode::Char('x') => self.export_backup(),
            KeyCode::Char('m') => {
                self.clear_status();
                return Ok(Mode::EnteringPath(PathForm::new(PathPurpose::ImportBackup)));
            }
            KeyCode::Char('r') => {
                self.reload_songs(None)?;
                self.set_status("Library reloaded.", StatusKind::Info);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_path_form(&mut self, code: KeyCode, mut form: PathForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter => {
                let outcome = form
                    .parse_path()
                    .and_then(|path| self.apply_path(&form.purpose, &path));
                match outcome {
                    Ok(message) => {
                        self.set_status(message, StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        form.error = Some(surface_error(&err));
                        Ok(Mode::EnteringPath(form))
                    }
                }
            }
            KeyCode::Backspace => {
                form.backspace();
                Ok(Mode::EnteringPath(form))
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
                Ok(Mode::EnteringPath(form))
            }
            _ => Ok(Mode::EnteringPath(form)),
        }
    }

    fn handle_confirm_song_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmSongDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.music_box.delete_song(confirm.song_id) {
                    Ok(_) => {
                        self.reload_songs(None)?;
                        self.set_status(format!("Deleted '{}'.", confirm.name), StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        self.set_status(describe_library_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmSongDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmSongDelete(confirm)),
        }
    }

    /// Run the action a path form was opened for and describe the result.
    fn apply_path(&mut self, purpose: &PathPurpose, path: &Path) -> Result<String> {
        match purpose {
            PathPurpose::AddSong => {
                let name = song_name_from_path(path);
                let audio = Blob::from_file(path).context("failed to read audio file")?;
                let size = format_size(audio.len());
                let id = self
                    .music_box
                    .add_song(&name, &audio)
                    .context("failed to add song")?;
                self.reload_songs(Some(id))?;
                Ok(format!("\"{name}\" added successfully ({size})."))
            }
            PathPurpose::SetIcon { song_id, song_name } => {
                let image = Blob::from_file(path).context("failed to read image file")?;
                self.music_box
                    .set_icon(*song_id, image)
                    .context("failed to set icon")?;
                self.reload_songs(Some(*song_id))?;
                Ok(format!("Icon updated for '{song_name}'."))
            }
            PathPurpose::ImportBackup => {
                let summary = self
                    .music_box
                    .import_backup(path)
                    .context("failed to import backup")?;
                self.reload_songs(None)?;
                if summary.is_complete() {
                    Ok(format!("Imported {} songs.", summary.imported))
                } else {
                    Ok(format!(
                        "Imported {} of {} songs ({} failed).",
                        summary.imported,
                        summary.total,
                        summary.failed()
                    ))
                }
            }
        }
    }

    fn toggle_playback(&mut self) -> Result<()> {
        let Some(song) = self.screen.current_song().cloned() else {
            self.set_status("No song selected.", StatusKind::Error);
            return Ok(());
        };

        match self.music_box.play(song.id) {
            Ok(PlaybackChange::Started { .. }) => {
                self.set_status(format!("Selected '{}'.", song.name), StatusKind::Info)
            }
            Ok(PlaybackChange::Stopped { .. }) => self.set_status("Stopped.", StatusKind::Info),
            Err(LibraryError::NotFound(_)) => {
                self.reload_songs(None)?;
                self.set_status("That song no longer exists.", StatusKind::Error);
            }
            Err(err) => self.set_status(describe_library_error(&err), StatusKind::Error),
        }
        Ok(())
    }

    fn export_backup(&mut self) {
        match self.music_box.export_backup(&self.backup_dir) {
            Ok(path) => self.set_status(
                format!("Backup written to {}.", path.display()),
                StatusKind::Info,
            ),
            Err(LibraryError::EmptyLibrary) => {
                self.set_status("No songs to export.", StatusKind::Info)
            }
            Err(err) => self.set_status(describe_library_error(&err), StatusKind::Error),
        }
    }

    fn reload_songs(&mut self, focus_id: Option<i64>) -> Result<()> {
        let songs = self.music_box.songs().context("failed to reload songs")?;
        self.screen.set_songs(songs, focus_id);
        Ok(())
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(BANNER_HEIGHT.min(area.height)),
                Constraint::Min(0),
                Constraint::Length(footer_height),
            ])
            .split(area);

        self.draw_now_playing(frame, chunks[0]);
        self.draw_song_list(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::EnteringPath(form) => self.draw_path_form(frame, area, form),
            Mode::ConfirmSongDelete(confirm) => self.draw_confirm_song_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_now_playing(&self, frame: &mut Frame, area: Rect) {
        // Resolved from the loaded list; this runs every frame and must not
        // hit the database.
        let text = match self.screen.active_song(self.music_box.playback()) {
            Some(song) => Span::styled(
                format!("♪ {}", song.name),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            None => Span::styled("♪ Not playing", Style::default().fg(Color::DarkGray)),
        };

        let paragraph = Paragraph::new(Line::from(text))
            .block(Block::default().borders(Borders::ALL).title("Toddler Music"))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn draw_song_list(&self, frame: &mut Frame, area: Rect) {
        if self.screen.songs.is_empty() {
            let message = Paragraph::new("No songs yet. Press 'a' to add one.")
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }
        self.render_song_cards(frame, area, &self.screen.songs, self.screen.selected);
    }

    fn render_song_cards(&self, frame: &mut Frame, area: Rect, songs: &[Song], selected: usize) {
        if area.height == 0 {
            return;
        }

        let card_height = SONG_CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = songs.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = min(start + capacity, len);
        let visible_len = end.saturating_sub(start);
        if visible_len == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..visible_len)
            .map(|_| Constraint::Length(SONG_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in rows.iter().enumerate() {
            let song_index = start + idx;
            if chunk.height == 0 || song_index >= len {
                continue;
            }

            let song = &songs[song_index];
            let playing = self.music_box.playback().is_active(song.id);
            let mut block = Block::default().borders(Borders::ALL);
            let mut paragraph_style = Style::default();
            if song_index == selected {
                block = block.style(Style::default().fg(Color::Yellow));
                paragraph_style = Style::default().fg(Color::Yellow);
            }

            let marker = if playing { "♪ " } else { "" };
            let badge = if song.has_icon() {
                "[img]".to_string()
            } else {
                format!("[{}]", song.initial())
            };
            let lines = vec![
                Line::from(vec![
                    Span::styled(format!("{badge} "), Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!("{marker}{}", song.name),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(song_meta(song), Style::default().fg(Color::Gray))),
            ];

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .style(paragraph_style);
            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::EnteringPath(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Confirm   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::ConfirmSongDelete(_) => Line::from(vec![
                Span::styled("[Y]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[N/Esc]", key_style),
                Span::raw(" Keep"),
            ]),
            Mode::Normal => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Play/Stop   "),
                Span::styled("[a]", key_style),
                Span::raw(" Add   "),
                Span::styled("[i]", key_style),
                Span::raw(" Icon   "),
                Span::styled("[d]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[x]", key_style),
                Span::raw(" Export   "),
                Span::styled("[m]", key_style),
                Span::raw(" Import   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_path_form(&self, frame: &mut Frame, area: Rect, form: &PathForm) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(form.purpose.title())
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            Line::from(Span::styled(
                form.purpose.hint(),
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
            form.build_line(),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

        let cursor_x = inner.x + "Path: ".len() as u16 + form.value_len() as u16;
        let cursor_y = inner.y + 2;
        if cursor_x < inner.x + inner.width && cursor_y < inner.y + inner.height {
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    fn draw_confirm_song_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSongDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Song").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete \"{}\"?", confirm.name)),
            Line::from("Playback stops if this song is playing."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
