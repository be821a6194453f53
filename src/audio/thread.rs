use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, info, warn};

use super::sink::create_sink_at;
use super::types::{AudioCmd, AudioError, AudioEvent};

/// How often the thread checks for end-of-track and reports the position.
const TICK: Duration = Duration::from_millis(200);

/// Spawn the thread that owns the output stream.
///
/// The stream is opened on the thread itself (it is not `Send`); the outcome
/// is reported once through `ready` before any command is processed.
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<AudioEvent>,
    ready: SyncSender<Result<(), AudioError>>,
    initial_volume: f32,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(AudioError::Output(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));
        info!("audio output opened");

        let mut source: Option<PathBuf> = None;
        let mut sink: Option<Sink> = None;
        let mut paused = true;
        let mut ended = false;
        let mut volume = initial_volume;

        // Track start time and accumulated elapsed when paused.
        let mut started_at: Option<Instant> = None;
        let mut accumulated = Duration::ZERO;

        fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
            if fade_out_ms == 0 {
                sink.set_volume(0.0);
                return;
            }
            let steps: u64 = 20;
            let step_ms = (fade_out_ms / steps).max(1);
            for step in 1..=steps {
                let t = step as f32 / steps as f32;
                sink.set_volume(from * (1.0 - t));
                thread::sleep(Duration::from_millis(step_ms));
            }
            sink.set_volume(0.0);
        }

        loop {
            match rx.recv_timeout(TICK) {
                Ok(cmd) => match cmd {
                    AudioCmd::Load(path) => {
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        paused = true;
                        ended = false;
                        started_at = None;
                        accumulated = Duration::ZERO;

                        match create_sink_at(&stream, &path, Duration::ZERO, volume) {
                            Ok((new_sink, duration)) => {
                                debug!(source = %path.display(), "source loaded");
                                sink = Some(new_sink);
                                source = Some(path.clone());
                                let _ = events.send(AudioEvent::CanPlay {
                                    source: path,
                                    duration,
                                });
                            }
                            Err(e) => {
                                source = None;
                                let _ = events.send(AudioEvent::LoadFailed {
                                    source: path,
                                    error: e.to_string(),
                                });
                            }
                        }
                    }

                    AudioCmd::Play => {
                        let Some(path) = source.as_ref() else {
                            continue;
                        };
                        // Playing an exhausted source starts it over.
                        let exhausted = sink.as_ref().map_or(true, |s| s.empty());
                        if exhausted {
                            match create_sink_at(&stream, path, Duration::ZERO, volume) {
                                Ok((new_sink, _)) => {
                                    sink = Some(new_sink);
                                    accumulated = Duration::ZERO;
                                }
                                Err(e) => {
                                    warn!(error = %e, "cannot restart source");
                                    let _ = events.send(AudioEvent::LoadFailed {
                                        source: path.clone(),
                                        error: e.to_string(),
                                    });
                                    continue;
                                }
                            }
                        }
                        if let Some(ref s) = sink {
                            s.play();
                            if paused || exhausted {
                                started_at = Some(Instant::now());
                            }
                            paused = false;
                            ended = false;
                        }
                    }

                    AudioCmd::Pause => {
                        if let Some(ref s) = sink {
                            if !paused {
                                s.pause();
                                if let Some(st) = started_at.take() {
                                    accumulated += st.elapsed();
                                }
                                paused = true;
                            }
                        }
                    }

                    AudioCmd::Seek(position) => {
                        // Rebuild the current sink and skip into the file.
                        // This uses `Source::skip_duration` (works for common formats).
                        let Some(path) = source.as_ref() else {
                            continue;
                        };
                        if let Some(s) = sink.take() {
                            s.stop();
                        }
                        match create_sink_at(&stream, path, position, volume) {
                            Ok((new_sink, _)) => {
                                if paused {
                                    started_at = None;
                                } else {
                                    new_sink.play();
                                    started_at = Some(Instant::now());
                                }
                                sink = Some(new_sink);
                                accumulated = position;
                                ended = false;
                                let _ = events.send(AudioEvent::TimeUpdate {
                                    source: path.clone(),
                                    position,
                                });
                            }
                            Err(e) => {
                                warn!(error = %e, "seek failed");
                            }
                        }
                    }

                    AudioCmd::SetVolume(v) => {
                        volume = v;
                        if let Some(ref s) = sink {
                            s.set_volume(v);
                        }
                    }

                    AudioCmd::Quit { fade_out_ms } => {
                        if let Some(ref s) = sink {
                            if !paused {
                                // Fade out gently before stopping.
                                fade_out_sink(s, volume, fade_out_ms);
                            }
                            s.stop();
                        }
                        info!("audio output released");
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    // periodic check for end-of-track and position reporting
                    let (Some(s), Some(path)) = (sink.as_ref(), source.as_ref()) else {
                        continue;
                    };
                    if paused || ended {
                        continue;
                    }
                    if s.empty() {
                        ended = true;
                        paused = true;
                        started_at = None;
                        let _ = events.send(AudioEvent::Ended {
                            source: path.clone(),
                        });
                    } else {
                        let position =
                            accumulated + started_at.map_or(Duration::ZERO, |st| st.elapsed());
                        let _ = events.send(AudioEvent::TimeUpdate {
                            source: path.clone(),
                            position,
                        });
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
