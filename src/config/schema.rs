use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/streamsic/config.toml` or `~/.config/streamsic/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `STREAMSIC__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub ingest: IngestSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial output volume in `[0, 1]`.
    pub volume: f32,
    /// Volume change applied by `+` / `-`.
    pub volume_step: f32,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            volume_step: 0.05,
            quit_fade_out_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text shown in the top header.
    pub header_text: String,

    /// Which song fields to show on each list row, and in what order.
    ///
    /// Example: ["title", "artist", "album", "duration"]
    pub row_fields: Vec<SongField>,

    /// Separator used to join `row_fields`.
    pub row_separator: String,

    /// Page shown at startup.
    pub start_page: StartPage,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: "Discover your next favorite song".to_string(),
            row_fields: vec![
                SongField::Title,
                SongField::Artist,
                SongField::Album,
                SongField::Duration,
            ],
            row_separator: " • ".to_string(),
            start_page: StartPage::Home,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to seek when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SongField {
    Title,
    Artist,
    Album,
    Duration,
    /// The assembled `24 BIT 44.1 KHZ ... FLAC` descriptor.
    Quality,
    Filename,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartPage {
    Home,
    Search,
    #[serde(alias = "your-library", alias = "your_library")]
    Library,
    Upload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// File extensions accepted for ingestion (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Bit depth reported for every ingested file.
    pub assumed_bit_depth: u8,
    /// Keep a minimal `0:00` record for files that cannot be opened as audio.
    pub keep_unplayable: bool,
    /// Whether to recurse into dropped directories.
    pub recursive: bool,
    /// Whether to follow symlinks while expanding directories.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["flac".into(), "wav".into()],
            assumed_bit_depth: 24,
            keep_unplayable: false,
            recursive: true,
            follow_links: true,
            include_hidden: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. `info` or `streamsic=debug`.
    /// `STREAMSIC_LOG` overrides it.
    pub level: String,
    /// Log file; defaults to `$XDG_STATE_HOME/streamsic/streamsic.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
