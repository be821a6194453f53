//! Utilities for creating `rodio` sinks from playable sources.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::AudioError;

/// Create a paused `Sink` for `source` that starts playback at `start_at`.
///
/// Also returns the stream's total duration when the decoder knows it.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    source: &Path,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>), AudioError> {
    let file = File::open(source).map_err(|e| AudioError::Open {
        path: source.to_path_buf(),
        source: e,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    let total = decoder.total_duration();

    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let decoded = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(decoded);
    sink.pause();
    Ok((sink, total))
}
