//! Audio-related small types.
//!
//! Commands flow from the controller to the audio thread; events flow back
//! to the event loop and are fed into the controller.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Where the controller is in its load/play cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded.
    #[default]
    Idle,
    /// A source was handed to the output and is not ready yet.
    Loading,
    Playing,
    Paused,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    /// Replace the current source; the thread answers with `CanPlay` or `LoadFailed`.
    Load(PathBuf),
    /// Start or resume. Restarts the source from the top when it already ended.
    Play,
    Pause,
    /// Jump to an absolute position in the current source.
    Seek(Duration),
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// The source is decoded and ready; `duration` when the stream knows it.
    CanPlay {
        source: PathBuf,
        duration: Option<Duration>,
    },
    LoadFailed { source: PathBuf, error: String },
    /// Periodic playback position while playing.
    TimeUpdate { source: PathBuf, position: Duration },
    /// The source played through to its end.
    Ended { source: PathBuf },
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    Output(String),
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("audio thread is gone")]
    Disconnected,
}
