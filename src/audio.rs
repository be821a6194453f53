//! Audio output and playback control.
//!
//! A dedicated thread owns the rodio output stream and executes
//! [`AudioCmd`]s; it reports progress back as [`AudioEvent`]s. The
//! [`PlaybackController`] decides which source should be loaded and
//! whether it should be playing.

mod controller;
mod player;
mod sink;
mod thread;
mod types;

pub use controller::{AudioOutput, PlaybackController};
pub use player::AudioPlayer;
pub use types::*;

#[cfg(test)]
mod tests;
