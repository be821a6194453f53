//! The playback controller: binds the current song to the audio output.
//!
//! The current song is held by id and resolved to a library position only
//! when a transport action runs, so re-sorting the library mid-playback
//! never redirects playback to another song.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, error, trace};

use crate::library::{Library, Song, SongId};

use super::types::{AudioEvent, PlaybackState};

/// The single audio output the controller drives.
pub trait AudioOutput {
    /// Replace the loaded source. The output answers with a can-play or
    /// load-failed event for the same source.
    fn load(&mut self, source: &Path);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position: Duration);
    fn set_volume(&mut self, volume: f32);
}

pub struct PlaybackController {
    output: Box<dyn AudioOutput>,
    current: Option<SongId>,
    is_playing: bool,
    state: PlaybackState,
    /// Song and source last handed to `output.load`. The same file can back
    /// more than one song, so both identify a load.
    loaded: Option<(SongId, PathBuf)>,
    /// Position in seconds.
    progress: f64,
    /// Length in seconds, once the output reports it.
    duration: Option<f64>,
    volume: f32,
}

impl PlaybackController {
    pub fn new(mut output: Box<dyn AudioOutput>, volume: f32) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        output.set_volume(volume);
        Self {
            output,
            current: None,
            is_playing: false,
            state: PlaybackState::Idle,
            loaded: None,
            progress: 0.0,
            duration: None,
            volume,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_id(&self) -> Option<&SongId> {
        self.current.as_ref()
    }

    pub fn current_index(&self, library: &Library) -> Option<usize> {
        self.current
            .as_ref()
            .and_then(|id| library.find_index_by_id(id))
    }

    pub fn current_song<'a>(&self, library: &'a Library) -> Option<&'a Song> {
        self.current.as_ref().and_then(|id| library.get_by_id(id))
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Select the song with `id` and start playing it.
    ///
    /// Returns `false` (and changes nothing) when the id is unknown.
    pub fn play(&mut self, library: &Library, id: &SongId) -> bool {
        if library.find_index_by_id(id).is_none() {
            debug!(id = %id, "play requested for unknown song");
            return false;
        }
        self.current = Some(id.clone());
        self.is_playing = true;
        self.sync(library);
        true
    }

    /// Flip play/pause. With nothing selected, starts the first song.
    pub fn toggle_play(&mut self, library: &Library) {
        if self.current_index(library).is_some() {
            self.is_playing = !self.is_playing;
            self.sync(library);
        } else if let Some(first) = library.get(0) {
            self.current = Some(first.id.clone());
            self.is_playing = true;
            self.sync(library);
        }
    }

    /// Advance circularly. Does nothing when no song is selected.
    pub fn next(&mut self, library: &Library) {
        self.step(library, true);
    }

    /// Go back circularly. Does nothing when no song is selected.
    pub fn prev(&mut self, library: &Library) {
        self.step(library, false);
    }

    fn step(&mut self, library: &Library, forward: bool) {
        let Some(index) = self.current_index(library) else {
            return;
        };
        let len = library.len();
        let target = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        let Some(song) = library.get(target) else {
            return;
        };
        self.current = Some(song.id.clone());
        self.is_playing = true;
        self.sync(library);
    }

    /// Relocate playback to `seconds`, updating `progress` right away.
    pub fn seek(&mut self, seconds: f64) {
        if self.loaded.is_none() || !seconds.is_finite() {
            return;
        }
        let mut target = seconds.max(0.0);
        if let Some(d) = self.duration {
            target = target.min(d);
        }
        self.progress = target;
        self.output.seek(Duration::from_secs_f64(target));
    }

    pub fn seek_by(&mut self, delta_seconds: f64) {
        self.seek(self.progress + delta_seconds);
    }

    /// Apply `volume`, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
        self.output.set_volume(self.volume);
    }

    pub fn on_event(&mut self, library: &Library, event: AudioEvent) {
        match event {
            AudioEvent::CanPlay { source, duration } => self.on_can_play(&source, duration),
            AudioEvent::LoadFailed { source, error } => self.on_load_failed(&source, &error),
            AudioEvent::TimeUpdate { source, position } => self.on_time_update(&source, position),
            AudioEvent::Ended { source } => self.on_ended(library, &source),
        }
    }

    fn is_loaded(&self, source: &Path) -> bool {
        self.loaded.as_ref().is_some_and(|(_, path)| path == source)
    }

    pub fn on_can_play(&mut self, source: &Path, duration: Option<Duration>) {
        if !self.is_loaded(source) || self.state != PlaybackState::Loading {
            // A newer load superseded this one.
            trace!(source = %source.display(), "stale can-play ignored");
            return;
        }
        self.duration = duration.map(|d| d.as_secs_f64());
        if self.is_playing {
            self.output.play();
            self.state = PlaybackState::Playing;
        } else {
            self.state = PlaybackState::Paused;
        }
        debug!(source = %source.display(), state = ?self.state, "source ready");
    }

    pub fn on_load_failed(&mut self, source: &Path, err: &str) {
        if !self.is_loaded(source) {
            trace!(source = %source.display(), "stale load failure ignored");
            return;
        }
        error!(source = %source.display(), error = %err, "failed to start playback");
        self.loaded = None;
        self.is_playing = false;
        self.state = PlaybackState::Idle;
    }

    pub fn on_time_update(&mut self, source: &Path, position: Duration) {
        if self.is_loaded(source) && self.state != PlaybackState::Loading {
            self.progress = position.as_secs_f64();
        }
    }

    /// Natural end of track: same transition as `next`.
    pub fn on_ended(&mut self, library: &Library, source: &Path) {
        if !self.is_loaded(source) {
            return;
        }
        if let Some(d) = self.duration {
            self.progress = d;
        }
        self.next(library);
    }

    /// Make the output match the selected song and the play flag.
    ///
    /// A different song is loaded fresh, even when it shares a file, and
    /// playback starts on can-play. The loaded song only toggles play/pause.
    fn sync(&mut self, library: &Library) {
        let Some(song) = self.current_song(library) else {
            return;
        };

        let same_load = self
            .loaded
            .as_ref()
            .is_some_and(|(id, path)| *id == song.id && *path == song.source);
        if !same_load {
            let source = song.source.clone();
            debug!(source = %source.display(), "loading source");
            self.output.load(&source);
            self.loaded = Some((song.id.clone(), source));
            self.state = PlaybackState::Loading;
            self.progress = 0.0;
            self.duration = None;
            return;
        }

        if self.state == PlaybackState::Loading {
            // can-play will honour the current play flag
            return;
        }

        if self.is_playing {
            self.output.play();
            self.state = PlaybackState::Playing;
        } else {
            self.output.pause();
            self.state = PlaybackState::Paused;
        }
    }
}
