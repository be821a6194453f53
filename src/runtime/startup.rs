use std::env;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use tracing::info;

use crate::app::App;
use crate::audio::{AudioPlayer, PlaybackController};
use crate::config;

use super::ingest_task::{IngestEvent, start_ingest};

/// Paths given on the command line.
fn cli_paths() -> Vec<PathBuf> {
    env::args_os().skip(1).map(PathBuf::from).collect()
}

/// Build the app on the configured start page and queue the command-line paths.
pub fn build_app(
    player: &AudioPlayer,
    settings: &config::Settings,
    tx: &Sender<IngestEvent>,
) -> App {
    let controller = PlaybackController::new(Box::new(player.clone()), settings.audio.volume);
    let mut app = App::new(controller, settings.ui.start_page.into());

    let paths = cli_paths();
    if !paths.is_empty() {
        info!(paths = paths.len(), "ingesting command-line paths");
    }
    start_ingest(&mut app, paths, &settings.ingest, tx);
    app
}
