//! Application model types: `App` and `Page`.
//!
//! The `App` struct holds the library, the playback controller, the page
//! being shown and the cursor/input state used by the UI and runtime.

use std::path::PathBuf;

use tracing::info;

use crate::audio::PlaybackController;
use crate::config::StartPage;
use crate::library::{Batch, IngestError, Library, Song, parse_dropped_paths};

/// The pages reachable from the sidebar.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Home,
    Search,
    Library,
    Upload,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::Search, Page::Library, Page::Upload];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Search => "Search",
            Page::Library => "Your Library",
            Page::Upload => "Upload",
        }
    }

    /// The page after this one in sidebar order, wrapping.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Pages with a text input line.
    pub fn has_input(self) -> bool {
        matches!(self, Page::Search | Page::Upload)
    }
}

impl From<StartPage> for Page {
    fn from(p: StartPage) -> Self {
        match p {
            StartPage::Home => Page::Home,
            StartPage::Search => Page::Search,
            StartPage::Library => Page::Library,
            StartPage::Upload => Page::Upload,
        }
    }
}

/// Greeting for the Home page by local hour (0-23).
pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning"
    } else if hour < 18 {
        "Good afternoon"
    } else {
        "Good evening"
    }
}

/// The main application model.
pub struct App {
    pub library: Library,
    pub playback: PlaybackController,
    pub page: Page,
    /// Library index under the cursor; always part of `visible_indices`
    /// when that list is non-empty.
    pub selected: usize,
    pub search_query: String,
    pub upload_input: String,
    /// Typed characters go to the page's input line.
    pub input_active: bool,
    /// Dismissable message shown over the current page.
    pub notice: Option<String>,
    /// Batches being extracted in the background.
    pub pending_batches: usize,
    pub metadata_window: bool,
}

impl App {
    pub fn new(playback: PlaybackController, start_page: Page) -> Self {
        let mut app = Self {
            library: Library::new(),
            playback,
            page: Page::Home,
            selected: 0,
            search_query: String::new(),
            upload_input: String::new(),
            input_active: false,
            notice: None,
            pending_batches: 0,
            metadata_window: false,
        };
        app.navigate(start_page);
        app
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Show `page`. Pages with an input line start in input mode.
    pub fn navigate(&mut self, page: Page) {
        self.page = page;
        self.input_active = page.has_input();
        self.ensure_selected_visible();
    }

    pub fn cycle_page(&mut self) {
        self.navigate(self.page.next());
    }

    /// Note that a batch was handed to the background importer.
    pub fn begin_batch(&mut self) {
        self.pending_batches += 1;
    }

    pub fn is_ingesting(&self) -> bool {
        self.pending_batches > 0
    }

    /// Merge a finished batch into the library. Navigation is left to the caller.
    pub fn commit_batch(&mut self, batch: Batch) {
        self.pending_batches = self.pending_batches.saturating_sub(1);
        info!(
            songs = batch.songs.len(),
            skipped = batch.skipped(),
            "batch committed"
        );
        let selected_id = self.library.get(self.selected).map(|s| s.id.clone());
        self.library.add_songs(batch.songs);
        // The cursor follows its song through the re-sort.
        if let Some(index) = selected_id.and_then(|id| self.library.find_index_by_id(&id)) {
            self.selected = index;
        }
        self.ensure_selected_visible();
    }

    /// Record a rejected batch; the library is untouched.
    pub fn reject_batch(&mut self, err: &IngestError) {
        self.pending_batches = self.pending_batches.saturating_sub(1);
        self.notice = Some(err.to_string());
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Library indices listed on the current page, in display order.
    pub fn visible_indices(&self) -> Vec<usize> {
        match self.page {
            Page::Home | Page::Library => (0..self.library.len()).collect(),
            Page::Search => self.library.search(&self.search_query),
            Page::Upload => Vec::new(),
        }
    }

    /// The song under the cursor, if the page lists any.
    pub fn selected_song(&self) -> Option<&Song> {
        if self.visible_indices().contains(&self.selected) {
            self.library.get(self.selected)
        } else {
            None
        }
    }

    /// Play the song under the cursor.
    pub fn play_selected(&mut self) -> bool {
        let Some(id) = self.selected_song().map(|s| s.id.clone()) else {
            return false;
        };
        self.playback.play(&self.library, &id)
    }

    pub fn toggle_play(&mut self) {
        self.playback.toggle_play(&self.library);
    }

    pub fn next_song(&mut self) {
        self.playback.next(&self.library);
    }

    pub fn prev_song(&mut self) {
        self.playback.prev(&self.library);
    }

    pub fn change_volume(&mut self, delta: f32) {
        let v = self.playback.volume() + delta;
        self.playback.set_volume(v);
    }

    /// Append a typed character to the active input line.
    pub fn push_input_char(&mut self, c: char) {
        match self.page {
            Page::Search => {
                self.search_query.push(c);
                self.ensure_selected_visible();
            }
            Page::Upload => self.upload_input.push(c),
            _ => {}
        }
    }

    pub fn pop_input_char(&mut self) {
        match self.page {
            Page::Search => {
                self.search_query.pop();
                self.ensure_selected_visible();
            }
            Page::Upload => {
                self.upload_input.pop();
            }
            _ => {}
        }
    }

    /// Paths typed on the Upload page; clears the input line.
    pub fn take_upload_paths(&mut self) -> Vec<PathBuf> {
        let text = std::mem::take(&mut self.upload_input);
        parse_dropped_paths(&text)
    }

    /// Move the cursor to `selected` when it is not listed on this page.
    fn ensure_selected_visible(&mut self) {
        let display = self.visible_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }

    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.visible_indices();
        let pos = display.iter().position(|&i| i == current)?;
        display.get((pos + 1) % display.len()).copied()
    }

    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.visible_indices();
        let pos = display.iter().position(|&i| i == current)?;
        display
            .get((pos + display.len() - 1) % display.len())
            .copied()
    }

    /// Move the cursor to the next listed song.
    pub fn select_next(&mut self) {
        if let Some(next) = self.next_in_view_from(self.selected) {
            self.selected = next;
        }
    }

    /// Move the cursor to the previous listed song.
    pub fn select_prev(&mut self) {
        if let Some(prev) = self.prev_in_view_from(self.selected) {
            self.selected = prev;
        }
    }
}
