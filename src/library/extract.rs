//! Best-effort metadata extraction for a single audio file.
//!
//! Extraction never fails outright. Each phase (duration, tags, stream
//! analysis) degrades to defaults on its own, and only a file that cannot
//! be opened as audio at all is dropped.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use rodio::{Decoder, Source};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::IngestSettings;
use crate::format::format_duration;

use super::model::{AudioQuality, Song, SongId};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

const DEFAULT_PICTURE_MIME: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode audio: {0}")]
    Decode(String),
    #[error("failed to read tags: {0}")]
    Tags(#[from] lofty::error::LoftyError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0} phase panicked")]
    Panicked(&'static str),
}

/// Tag fields found in the file. Blank values are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagData {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub picture: Option<EmbeddedPicture>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPicture {
    pub mime: String,
    pub data: Vec<u8>,
}

impl EmbeddedPicture {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

/// What decoding the stream told us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_rate: u32,
}

/// The media capabilities extraction relies on.
///
/// `SystemProbe` is the real implementation; tests substitute their own.
pub trait MediaProbe: Sync {
    /// Open `path` as playable audio and report its length.
    fn duration(&self, path: &Path) -> Result<Duration, ExtractError>;
    /// Read embedded tags from the file contents.
    fn read_tags(&self, bytes: &[u8]) -> Result<TagData, ExtractError>;
    /// Decode the file contents far enough to learn the stream format.
    fn decode(&self, bytes: Arc<[u8]>) -> Result<StreamInfo, ExtractError>;
}

/// `rodio` for decoding, `lofty` for tags and container headers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl MediaProbe for SystemProbe {
    fn duration(&self, path: &Path) -> Result<Duration, ExtractError> {
        let file = File::open(path).map_err(|source| ExtractError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| ExtractError::Decode(e.to_string()))?;

        match decoder.total_duration() {
            Some(d) => Ok(d),
            // Some streams don't carry a frame count; the container header usually does.
            None => Ok(lofty::read_from_path(path)?.properties().duration()),
        }
    }

    fn read_tags(&self, bytes: &[u8]) -> Result<TagData, ExtractError> {
        let tagged = Probe::new(Cursor::new(bytes)).guess_file_type()?.read()?;

        let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
            return Ok(TagData::default());
        };

        let picture = tag.pictures().first().map(|p| EmbeddedPicture {
            mime: p
                .mime_type()
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_PICTURE_MIME.to_string()),
            data: p.data().to_vec(),
        });

        Ok(TagData {
            title: non_blank(tag.title()),
            artist: non_blank(tag.artist()),
            album: non_blank(tag.album()),
            picture,
        })
    }

    fn decode(&self, bytes: Arc<[u8]>) -> Result<StreamInfo, ExtractError> {
        let decoder =
            Decoder::new(Cursor::new(bytes)).map_err(|e| ExtractError::Decode(e.to_string()))?;
        let sample_rate: u32 = decoder.sample_rate().into();
        if sample_rate == 0 {
            return Err(ExtractError::Decode("stream reports no sample rate".into()));
        }
        Ok(StreamInfo { sample_rate })
    }
}

fn non_blank(value: Option<Cow<'_, str>>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract a `Song` from `path`.
///
/// Returns `None` only when the file cannot be opened or read as audio and
/// `keep_unplayable` is off.
pub fn extract<P: MediaProbe + ?Sized>(
    path: &Path,
    id: SongId,
    settings: &IngestSettings,
    probe: &P,
) -> Option<Song> {
    let duration = match probe.duration(path) {
        Ok(d) => d,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot load file as audio");
            return settings
                .keep_unplayable
                .then(|| unplayable_song(path, id, settings));
        }
    };

    let bytes: Arc<[u8]> = match std::fs::read(path) {
        Ok(b) => b.into(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read file contents");
            return settings
                .keep_unplayable
                .then(|| unplayable_song(path, id, settings));
        }
    };
    let file_size = bytes.len() as u64;

    // Tag reading and decoding share the buffer and finish in either order.
    let (tags, stream) = thread::scope(|s| {
        let tags = s.spawn(|| probe.read_tags(&bytes));
        let stream = s.spawn(|| probe.decode(Arc::clone(&bytes)));
        (join_phase(tags, "tag"), join_phase(stream, "decode"))
    });

    Some(assemble(path, id, duration, file_size, tags, stream, settings))
}

fn join_phase<T>(
    handle: ScopedJoinHandle<'_, Result<T, ExtractError>>,
    phase: &'static str,
) -> Result<T, ExtractError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(ExtractError::Panicked(phase)))
}

/// Combine the phase results into a record, applying the fallbacks.
pub(crate) fn assemble(
    path: &Path,
    id: SongId,
    duration: Duration,
    file_size: u64,
    tags: Result<TagData, ExtractError>,
    stream: Result<StreamInfo, ExtractError>,
    settings: &IngestSettings,
) -> Song {
    let fallback_title = title_from_filename(path);

    let (title, artist, album, artwork) = match tags {
        Ok(t) => (
            t.title.unwrap_or(fallback_title),
            t.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            t.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            t.picture.map(|p| p.to_data_uri()),
        ),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no readable tags, using filename");
            (
                fallback_title,
                UNKNOWN_ARTIST.to_string(),
                UNKNOWN_ALBUM.to_string(),
                None,
            )
        }
    };

    let secs = duration.as_secs_f64();
    let (sample_rate, bitrate) = match stream {
        Ok(info) => (Some(info.sample_rate), bitrate_kbps(file_size, secs)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "audio analysis failed");
            (None, None)
        }
    };

    Song {
        id,
        title,
        artist,
        album,
        duration: format_duration(secs),
        artwork,
        source: path.to_path_buf(),
        audio_quality: Some(AudioQuality {
            format: format_of(path),
            bitrate,
            sample_rate,
            bit_depth: Some(settings.assumed_bit_depth),
        }),
    }
}

fn unplayable_song(path: &Path, id: SongId, settings: &IngestSettings) -> Song {
    Song {
        id,
        title: title_from_filename(path),
        artist: UNKNOWN_ARTIST.to_string(),
        album: UNKNOWN_ALBUM.to_string(),
        duration: format_duration(0.0),
        artwork: None,
        source: path.to_path_buf(),
        audio_quality: Some(AudioQuality {
            format: format_of(path),
            bit_depth: Some(settings.assumed_bit_depth),
            ..AudioQuality::default()
        }),
    }
}

/// Average bitrate in kbps from the file size.
///
/// Undefined for a zero or unknown duration; that case is reported and
/// yields no bitrate.
pub fn bitrate_kbps(file_size: u64, duration_secs: f64) -> Option<u32> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        warn!(file_size, duration_secs, "bitrate undefined without a duration");
        return None;
    }
    Some((file_size as f64 * 8.0 / duration_secs / 1000.0).round() as u32)
}

/// The file name with its last extension removed.
pub fn title_from_filename(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

fn format_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_uppercase)
        .filter(|s| !s.is_empty())
}
