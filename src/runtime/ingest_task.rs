//! Background batch ingestion.
//!
//! Extraction blocks on file IO and decoding, so each batch runs on its
//! own thread and reports back exactly once.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;

use tracing::{debug, warn};

use crate::app::{App, Page};
use crate::config::IngestSettings;
use crate::library::{Batch, IngestError, SystemProbe, ingest};

#[derive(Debug)]
pub enum IngestEvent {
    /// The whole batch has been extracted (or rejected up front).
    Finished(Result<Batch, IngestError>),
}

/// Hand `paths` to a background importer. Empty input is ignored.
pub fn start_ingest(
    app: &mut App,
    paths: Vec<PathBuf>,
    settings: &IngestSettings,
    tx: &Sender<IngestEvent>,
) {
    if paths.is_empty() {
        debug!("nothing to ingest");
        return;
    }
    app.begin_batch();
    let settings = settings.clone();
    let tx = tx.clone();
    thread::spawn(move || {
        debug!(paths = paths.len(), "ingest started");
        let result = ingest(&paths, &settings, &SystemProbe);
        // The receiver is gone only during shutdown.
        let _ = tx.send(IngestEvent::Finished(result));
    });
}

/// Apply a finished batch: commit then show the library, or surface the rejection.
pub fn finish_ingest(app: &mut App, event: IngestEvent) {
    match event {
        IngestEvent::Finished(Ok(batch)) => {
            app.commit_batch(batch);
            app.navigate(Page::Library);
        }
        IngestEvent::Finished(Err(e)) => {
            warn!(error = %e, "batch rejected");
            app.reject_batch(&e);
        }
    }
}
