use std::fmt;
use std::path::PathBuf;

/// Stable identifier of a song for the lifetime of the process.
///
/// Built from the ingestion batch timestamp and the file's position in
/// that batch, e.g. `1718000000000-3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SongId(String);

impl SongId {
    pub fn new(batch_stamp: u128, index: usize) -> Self {
        Self(format!("{batch_stamp}-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Technical description of the encoded audio. Every field is optional:
/// a field is absent when the measurement it comes from failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioQuality {
    /// Upper-cased file extension, e.g. `FLAC`.
    pub format: Option<String>,
    /// Average bitrate in kbps.
    pub bitrate: Option<u32>,
    /// Sample rate in Hz.
    pub sample_rate: Option<u32>,
    pub bit_depth: Option<u8>,
}

impl AudioQuality {
    /// Assemble the `24 BIT 44.1 KHZ 1411 KBPS FLAC` descriptor.
    ///
    /// Missing or zero components are left out; `None` when nothing remains.
    pub fn descriptor(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        if let Some(depth) = self.bit_depth.filter(|d| *d > 0) {
            parts.push(format!("{depth} BIT"));
        }
        if let Some(rate) = self.sample_rate.filter(|r| *r > 0) {
            // One decimal, and `48.0` prints as `48`.
            let khz = (f64::from(rate) / 100.0).round() / 10.0;
            parts.push(format!("{khz} KHZ"));
        }
        if let Some(kbps) = self.bitrate.filter(|b| *b > 0) {
            parts.push(format!("{kbps} KBPS"));
        }
        if let Some(format) = self.format.as_deref().filter(|f| !f.is_empty()) {
            parts.push(format.to_string());
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// One ingested audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Preformatted `M:SS`, computed once at ingestion.
    pub duration: String,
    /// Embedded picture as a `data:<mime>;base64,...` URI.
    pub artwork: Option<String>,
    /// Playable source identity handed to the audio output.
    pub source: PathBuf,
    pub audio_quality: Option<AudioQuality>,
}

impl Song {
    pub fn quality_descriptor(&self) -> Option<String> {
        self.audio_quality.as_ref().and_then(AudioQuality::descriptor)
    }

    /// MIME type of the embedded artwork, read back from the data URI.
    pub fn artwork_mime(&self) -> Option<&str> {
        self.artwork
            .as_deref()
            .and_then(|uri| uri.strip_prefix("data:"))
            .and_then(|rest| rest.split(';').next())
    }
}
