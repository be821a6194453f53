use super::model::{Song, SongId};

/// The in-memory song collection.
///
/// Sorted by title after every batch commit. There is no update or
/// removal; songs only arrive through `add_songs`.
#[derive(Debug, Clone, Default)]
pub struct Library {
    songs: Vec<Song>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch into the collection and re-sort everything by title.
    ///
    /// Titles compare case-folded first, then by raw text; the sort is stable
    /// so identical titles keep their arrival order.
    pub fn add_songs(&mut self, new_songs: Vec<Song>) {
        let mut merged = std::mem::take(&mut self.songs);
        merged.extend(new_songs);
        merged.sort_by_cached_key(|s| (s.title.to_lowercase(), s.title.clone()));
        self.songs = merged;
    }

    pub fn find_index_by_id(&self, id: &SongId) -> Option<usize> {
        self.songs.iter().position(|s| &s.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    pub fn get_by_id(&self, id: &SongId) -> Option<&Song> {
        self.songs.iter().find(|s| &s.id == id)
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Indices of songs whose title, artist or album contains `query`,
    /// ignoring case. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<usize> {
        if query.is_empty() {
            return (0..self.songs.len()).collect();
        }
        let needle = query.to_lowercase();
        self.songs
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                s.title.to_lowercase().contains(&needle)
                    || s.artist.to_lowercase().contains(&needle)
                    || s.album.to_lowercase().contains(&needle)
            })
            .map(|(i, _)| i)
            .collect()
    }
}
