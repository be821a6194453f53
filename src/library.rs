//! Song library: the data model, metadata extraction, batch ingestion and
//! the in-memory collection the views browse.

mod display;
mod extract;
mod ingest;
mod model;
mod state;

pub use display::row_from_fields;
pub use extract::{
    EmbeddedPicture, ExtractError, MediaProbe, StreamInfo, SystemProbe, TagData, UNKNOWN_ALBUM,
    UNKNOWN_ARTIST, extract,
};
pub use ingest::{Batch, IngestError, formats_phrase, ingest, parse_dropped_paths};
pub use model::{AudioQuality, Song, SongId};
pub use state::Library;
