use crate::config::SongField;

use super::model::Song;

/// Build a list row for `song` according to the configured `fields` and separator.
///
/// Blank values are skipped; falls back to the title when no parts were produced.
pub fn row_from_fields(song: &Song, fields: &[SongField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in fields {
        let value = match f {
            SongField::Title => Some(song.title.clone()),
            SongField::Artist => Some(song.artist.clone()),
            SongField::Album => Some(song.album.clone()),
            SongField::Duration => Some(song.duration.clone()),
            SongField::Quality => song.quality_descriptor(),
            SongField::Filename => song
                .source
                .file_name()
                .and_then(|s| s.to_str())
                .map(str::to_string),
        };
        if let Some(v) = value {
            let v = v.trim();
            if !v.is_empty() {
                parts.push(v.to_string());
            }
        }
    }

    if parts.is_empty() {
        song.title.clone()
    } else {
        parts.join(sep)
    }
}
