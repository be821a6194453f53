use std::path::Path;
use std::sync::{Arc, Mutex};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use super::controller::AudioOutput;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioError, AudioEvent};

/// Handle to the process-wide audio output.
///
/// `new` acquires the output device, `shutdown` releases it; there is no
/// implicit on-demand initialization. Clones share the same audio thread.
#[derive(Clone)]
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    join: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AudioPlayer {
    /// Open the default output device. Events are delivered on the returned receiver.
    pub fn new(initial_volume: f32) -> Result<(Self, Receiver<AudioEvent>), AudioError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (events_tx, events_rx) = mpsc::channel::<AudioEvent>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(), AudioError>>(1);

        let audio_handle = spawn_audio_thread(rx, events_tx, ready_tx, initial_volume);

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = audio_handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = audio_handle.join();
                return Err(AudioError::Disconnected);
            }
        }

        Ok((
            Self {
                tx,
                join: Arc::new(Mutex::new(Some(audio_handle))),
            },
            events_rx,
        ))
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), AudioError> {
        self.tx.send(cmd).map_err(|_| AudioError::Disconnected)
    }

    /// Fade out, stop, and wait for the audio thread to release the device.
    pub fn shutdown(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }

    fn send_or_warn(&self, cmd: AudioCmd) {
        if let Err(e) = self.send(cmd) {
            warn!(error = %e, "audio command dropped");
        }
    }
}

impl AudioOutput for AudioPlayer {
    fn load(&mut self, source: &Path) {
        self.send_or_warn(AudioCmd::Load(source.to_path_buf()));
    }

    fn play(&mut self) {
        self.send_or_warn(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send_or_warn(AudioCmd::Pause);
    }

    fn seek(&mut self, position: Duration) {
        self.send_or_warn(AudioCmd::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send_or_warn(AudioCmd::SetVolume(volume));
    }
}
