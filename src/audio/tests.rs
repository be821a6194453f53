use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::library::Library;
use crate::library::tests::song;

/// Records every command instead of producing sound.
#[derive(Clone, Default)]
struct RecordingOutput {
    log: Arc<Mutex<Vec<AudioCmd>>>,
}

impl RecordingOutput {
    fn push(&self, cmd: AudioCmd) {
        self.log.lock().unwrap().push(cmd);
    }
}

impl AudioOutput for RecordingOutput {
    fn load(&mut self, source: &Path) {
        self.push(AudioCmd::Load(source.to_path_buf()));
    }

    fn play(&mut self) {
        self.push(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.push(AudioCmd::Pause);
    }

    fn seek(&mut self, position: Duration) {
        self.push(AudioCmd::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.push(AudioCmd::SetVolume(volume));
    }
}

fn controller() -> (PlaybackController, Arc<Mutex<Vec<AudioCmd>>>) {
    let out = RecordingOutput::default();
    let log = out.log.clone();
    let ctl = PlaybackController::new(Box::new(out), 0.8);
    log.lock().unwrap().clear();
    (ctl, log)
}

fn take(log: &Arc<Mutex<Vec<AudioCmd>>>) -> Vec<AudioCmd> {
    std::mem::take(&mut *log.lock().unwrap())
}

fn library(titles: &[&str]) -> Library {
    let mut lib = Library::new();
    lib.add_songs(
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| song(&i.to_string(), t))
            .collect(),
    );
    lib
}

fn src(title: &str) -> PathBuf {
    PathBuf::from(format!("/music/{title}.flac"))
}

fn ready(ctl: &mut PlaybackController, title: &str) {
    ctl.on_can_play(&src(title), Some(Duration::from_secs(180)));
}

#[test]
fn toggle_with_nothing_selected_starts_first_song() {
    let lib = library(&["b", "a", "c"]);
    let (mut ctl, log) = controller();

    ctl.toggle_play(&lib);

    assert_eq!(ctl.current_index(&lib), Some(0));
    assert_eq!(ctl.current_song(&lib).unwrap().title, "a");
    assert!(ctl.is_playing());
    assert_eq!(ctl.state(), PlaybackState::Loading);
    assert_eq!(take(&log), vec![AudioCmd::Load(src("a"))]);

    ready(&mut ctl, "a");
    assert_eq!(ctl.state(), PlaybackState::Playing);
    assert_eq!(ctl.duration(), Some(180.0));
    assert_eq!(take(&log), vec![AudioCmd::Play]);
}

#[test]
fn toggle_on_empty_library_does_nothing() {
    let lib = Library::new();
    let (mut ctl, log) = controller();

    ctl.toggle_play(&lib);

    assert!(ctl.current_id().is_none());
    assert!(!ctl.is_playing());
    assert!(take(&log).is_empty());
}

#[test]
fn toggling_the_loaded_song_never_reloads_it() {
    let lib = library(&["a"]);
    let (mut ctl, log) = controller();
    let id = lib.get(0).unwrap().id.clone();

    assert!(ctl.play(&lib, &id));
    ready(&mut ctl, "a");
    take(&log);

    ctl.toggle_play(&lib);
    assert!(!ctl.is_playing());
    assert_eq!(ctl.state(), PlaybackState::Paused);
    ctl.toggle_play(&lib);
    assert!(ctl.is_playing());

    assert_eq!(take(&log), vec![AudioCmd::Pause, AudioCmd::Play]);
}

#[test]
fn play_unknown_id_is_rejected() {
    let lib = library(&["a"]);
    let (mut ctl, log) = controller();
    let foreign = song("5", "elsewhere").id;

    assert!(!ctl.play(&lib, &foreign));
    assert!(ctl.current_id().is_none());
    assert!(take(&log).is_empty());
}

#[test]
fn next_and_prev_wrap_around() {
    let lib = library(&["a", "b", "c"]);
    let (mut ctl, _log) = controller();
    let last = lib.get(2).unwrap().id.clone();
    ctl.play(&lib, &last);

    ctl.next(&lib);
    assert_eq!(ctl.current_index(&lib), Some(0));

    ctl.prev(&lib);
    assert_eq!(ctl.current_index(&lib), Some(2));

    ctl.prev(&lib);
    assert_eq!(ctl.current_index(&lib), Some(1));
    assert!(ctl.is_playing());
}

#[test]
fn next_and_prev_without_selection_do_nothing() {
    let lib = library(&["a", "b"]);
    let (mut ctl, log) = controller();

    ctl.next(&lib);
    ctl.prev(&lib);

    assert!(ctl.current_id().is_none());
    assert!(take(&log).is_empty());
}

#[test]
fn pausing_before_ready_keeps_source_paused() {
    let lib = library(&["a"]);
    let (mut ctl, log) = controller();
    ctl.toggle_play(&lib);
    ctl.toggle_play(&lib);
    take(&log);

    ready(&mut ctl, "a");

    assert_eq!(ctl.state(), PlaybackState::Paused);
    assert!(take(&log).is_empty());
}

#[test]
fn stale_can_play_is_ignored() {
    let lib = library(&["a", "b"]);
    let (mut ctl, log) = controller();
    ctl.toggle_play(&lib);
    ctl.next(&lib);
    take(&log);

    ready(&mut ctl, "a");
    assert_eq!(ctl.state(), PlaybackState::Loading);
    assert!(take(&log).is_empty());

    ready(&mut ctl, "b");
    assert_eq!(ctl.state(), PlaybackState::Playing);
    assert_eq!(take(&log), vec![AudioCmd::Play]);
}

#[test]
fn ended_advances_like_next() {
    let lib = library(&["a", "b"]);
    let (mut ctl, log) = controller();
    ctl.toggle_play(&lib);
    ready(&mut ctl, "a");
    take(&log);

    ctl.on_ended(&lib, &src("a"));
    assert_eq!(ctl.current_song(&lib).unwrap().title, "b");
    assert_eq!(take(&log), vec![AudioCmd::Load(src("b"))]);

    ready(&mut ctl, "b");
    ctl.on_ended(&lib, &src("b"));
    assert_eq!(ctl.current_index(&lib), Some(0));
}

#[test]
fn ended_on_single_song_replays_without_reload() {
    let lib = library(&["only"]);
    let (mut ctl, log) = controller();
    ctl.toggle_play(&lib);
    ready(&mut ctl, "only");
    take(&log);

    ctl.on_ended(&lib, &src("only"));

    assert!(ctl.is_playing());
    assert_eq!(take(&log), vec![AudioCmd::Play]);
}

#[test]
fn ended_for_old_source_is_ignored() {
    let lib = library(&["a", "b"]);
    let (mut ctl, _log) = controller();
    ctl.toggle_play(&lib);
    ctl.next(&lib);

    ctl.on_ended(&lib, &src("a"));

    assert_eq!(ctl.current_song(&lib).unwrap().title, "b");
}

#[test]
fn current_song_survives_resort() {
    let mut lib = library(&["m", "z"]);
    let (mut ctl, _log) = controller();
    let m = lib.get(0).unwrap().id.clone();
    ctl.play(&lib, &m);

    lib.add_songs(vec![song("7", "a")]);

    assert_eq!(ctl.current_index(&lib), Some(1));
    assert_eq!(ctl.current_song(&lib).unwrap().title, "m");

    ctl.next(&lib);
    assert_eq!(ctl.current_song(&lib).unwrap().title, "z");
}

#[test]
fn seek_is_optimistic_and_clamped() {
    let lib = library(&["a"]);
    let (mut ctl, log) = controller();

    ctl.seek(10.0);
    assert!(take(&log).is_empty());

    ctl.toggle_play(&lib);
    ready(&mut ctl, "a");
    take(&log);

    ctl.seek(42.5);
    assert_eq!(ctl.progress(), 42.5);
    ctl.seek(1000.0);
    assert_eq!(ctl.progress(), 180.0);
    ctl.seek_by(-500.0);
    assert_eq!(ctl.progress(), 0.0);

    assert_eq!(
        take(&log),
        vec![
            AudioCmd::Seek(Duration::from_secs_f64(42.5)),
            AudioCmd::Seek(Duration::from_secs(180)),
            AudioCmd::Seek(Duration::ZERO),
        ]
    );
}

#[test]
fn time_updates_only_track_the_loaded_source() {
    let lib = library(&["a", "b"]);
    let (mut ctl, _log) = controller();
    ctl.toggle_play(&lib);
    ready(&mut ctl, "a");

    ctl.on_time_update(&src("a"), Duration::from_secs(12));
    assert_eq!(ctl.progress(), 12.0);

    ctl.on_time_update(&src("b"), Duration::from_secs(99));
    assert_eq!(ctl.progress(), 12.0);
}

#[test]
fn volume_is_clamped() {
    let (mut ctl, log) = controller();

    ctl.set_volume(1.7);
    assert_eq!(ctl.volume(), 1.0);
    ctl.set_volume(-0.2);
    assert_eq!(ctl.volume(), 0.0);
    ctl.set_volume(f32::NAN);
    assert_eq!(ctl.volume(), 0.0);

    assert_eq!(
        take(&log),
        vec![AudioCmd::SetVolume(1.0), AudioCmd::SetVolume(0.0)]
    );
}

#[test]
fn song_sharing_a_file_is_loaded_fresh() {
    let lib = library(&["a", "a"]);
    let (mut ctl, log) = controller();
    let first = lib.get(0).unwrap().id.clone();
    let second = lib.get(1).unwrap().id.clone();

    ctl.play(&lib, &first);
    ready(&mut ctl, "a");
    ctl.on_time_update(&src("a"), Duration::from_secs(42));
    take(&log);

    assert!(ctl.play(&lib, &second));
    assert_eq!(ctl.current_id(), Some(&second));
    assert_eq!(ctl.state(), PlaybackState::Loading);
    assert_eq!(ctl.progress(), 0.0);
    assert_eq!(take(&log), vec![AudioCmd::Load(src("a"))]);
}

#[test]
fn load_failure_resets_and_next_toggle_reloads() {
    let lib = library(&["a"]);
    let (mut ctl, log) = controller();
    ctl.toggle_play(&lib);
    take(&log);

    ctl.on_event(
        &lib,
        AudioEvent::LoadFailed {
            source: src("a"),
            error: "unsupported format".into(),
        },
    );
    assert_eq!(ctl.state(), PlaybackState::Idle);
    assert!(!ctl.is_playing());

    ctl.toggle_play(&lib);
    assert_eq!(take(&log), vec![AudioCmd::Load(src("a"))]);
}
