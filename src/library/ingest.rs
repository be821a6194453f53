//! Batch ingestion: filter the dropped paths, extract every file, and hand
//! back the whole batch at once.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;
use walkdir::WalkDir;

use crate::config::IngestSettings;

use super::extract::{MediaProbe, extract};
use super::model::{Song, SongId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("No supported files found. Please upload {formats} files.")]
    NoSupportedFiles { formats: String },
}

/// The outcome of one ingestion batch.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub songs: Vec<Song>,
    /// Files that passed the extension filter.
    pub accepted: usize,
}

impl Batch {
    /// Accepted files that produced no song.
    pub fn skipped(&self) -> usize {
        self.accepted.saturating_sub(self.songs.len())
    }
}

fn normalized_extensions(settings: &IngestSettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn is_supported(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// `FLAC or WAV` style listing of the accepted formats.
pub fn formats_phrase(settings: &IngestSettings) -> String {
    let exts: Vec<String> = normalized_extensions(settings)
        .into_iter()
        .map(|e| e.to_ascii_uppercase())
        .collect();
    match exts.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} or {}", rest.join(", "), last),
    }
}

/// Expand directories and keep only files with an accepted extension.
///
/// Files named directly are kept even when they do not exist yet; they fail
/// later, at extraction, and count as processed.
pub fn collect_candidates(paths: &[PathBuf], settings: &IngestSettings) -> Vec<PathBuf> {
    let exts = normalized_extensions(settings);
    let mut files: Vec<PathBuf> = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut walker = WalkDir::new(path)
                .follow_links(settings.follow_links)
                .sort_by_file_name();

            // Non-recursive = only the dropped directory itself.
            let depth_cap = if settings.recursive {
                settings.max_depth
            } else {
                Some(1)
            };
            if let Some(d) = depth_cap {
                walker = walker.max_depth(d);
            }

            for entry in walker
                .into_iter()
                .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
                .filter_map(Result::ok)
            {
                let p = entry.path();
                if p.is_file() && is_supported(p, &exts) {
                    files.push(absolute(p));
                }
            }
        } else if is_supported(path, &exts) {
            files.push(absolute(path));
        }
    }

    files
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Ingest one batch of dropped paths.
///
/// Every accepted file is extracted on its own scoped thread; the call
/// returns once all of them have finished, successfully or not. Completion
/// order has no effect on the result because the library sorts on commit.
pub fn ingest<P: MediaProbe + ?Sized>(
    paths: &[PathBuf],
    settings: &IngestSettings,
    probe: &P,
) -> Result<Batch, IngestError> {
    let files = collect_candidates(paths, settings);
    if files.is_empty() {
        return Err(IngestError::NoSupportedFiles {
            formats: formats_phrase(settings),
        });
    }

    let batch_stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    info!(files = files.len(), batch = %batch_stamp, "ingesting batch");

    // Bound the number of files held in memory at once.
    let width = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .max(2);

    let mut songs: Vec<Song> = Vec::with_capacity(files.len());
    for (chunk_idx, chunk) in files.chunks(width).enumerate() {
        thread::scope(|s| {
            let handles: Vec<_> = chunk
                .iter()
                .enumerate()
                .map(|(i, path)| {
                    let id = SongId::new(batch_stamp, chunk_idx * width + i);
                    (path, s.spawn(move || extract(path, id, settings, probe)))
                })
                .collect();

            for (path, handle) in handles {
                match handle.join() {
                    Ok(Some(song)) => songs.push(song),
                    Ok(None) => {}
                    Err(_) => error!(path = %path.display(), "extraction panicked"),
                }
            }
        });
    }

    let batch = Batch {
        songs,
        accepted: files.len(),
    };
    info!(
        added = batch.songs.len(),
        skipped = batch.skipped(),
        "batch complete"
    );
    Ok(batch)
}

/// Split the text a terminal delivers when files are dropped onto it into paths.
///
/// Handles whitespace/newline separation, single and double quotes,
/// backslash escapes and `file://` URIs.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (Some(_), '\\') => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_token = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }

    tokens
        .into_iter()
        .filter(|t| !t.is_empty())
        .filter_map(|t| {
            if !t.starts_with("file:") {
                return Some(PathBuf::from(t));
            }
            let path = Url::parse(&t).ok().and_then(|u| u.to_file_path().ok());
            if path.is_none() {
                debug!(uri = %t, "dropped URI is not a local file");
            }
            path
        })
        .collect()
}
