//! Application state shared by the views and the runtime: the library,
//! the playback controller, and which page and song the user is looking at.

mod model;

pub use model::*;
