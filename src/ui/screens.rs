use crate::models::Song;
use crate::playback::PlaybackPointer;

/// Song list shown on the admin screen plus the selection cursor.
pub(crate) struct LibraryScreen {
    pub(crate) songs: Vec<Song>,
    pub(crate) selected: usize,
}

impl LibraryScreen {
    pub(crate) fn new(songs: Vec<Song>) -> Self {
        let mut screen = Self { songs, selected: 0 };
        screen.ensure_in_bounds();
        screen
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.selected)
    }

    /// The listed song the pointer references, if it is in the list.
    pub(crate) fn active_song(&self, playback: &PlaybackPointer) -> Option<&Song> {
        self.songs.iter().find(|song| playback.is_active(song.id))
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.songs.is_empty() {
            return;
        }
        let last = self.songs.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.songs.len().saturating_sub(1);
    }

    /// Replace the list after a reload, keeping the cursor on `focus_id` when
    /// that song is still present.
    pub(crate) fn set_songs(&mut self, songs: Vec<Song>, focus_id: Option<i64>) {
        self.songs = songs;
        if let Some(id) = focus_id {
            if let Some(index) = self.songs.iter().position(|song| song.id == id) {
                self.selected = index;
                return;
            }
        }
        self.ensure_in_bounds();
    }

    fn ensure_in_bounds(&mut self) {
        if self.selected >= self.songs.len() {
            self.selected = self.songs.len().saturating_sub(1);
        }
    }
}
