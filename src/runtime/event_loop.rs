use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, Page};
use crate::audio::AudioEvent;
use crate::config;
use crate::library::parse_dropped_paths;
use crate::runtime::ingest_task::{IngestEvent, finish_ingest, start_ingest};
use crate::ui;

/// Channels the event loop drains on every iteration.
pub struct Channels<'a> {
    pub audio_events: &'a Receiver<AudioEvent>,
    pub ingest_rx: &'a Receiver<IngestEvent>,
    pub ingest_tx: &'a Sender<IngestEvent>,
}

/// Main terminal event loop: handles input, drops, UI drawing and audio
/// events. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    channels: &Channels<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = channels.audio_events.try_recv() {
            app.playback.on_event(&app.library, ev);
        }

        while let Ok(ev) = channels.ingest_rx.try_recv() {
            finish_ingest(app, ev);
        }

        terminal.draw(|f| ui::draw(f, app, settings))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, settings, app, channels.ingest_tx) {
                        break;
                    }
                }
                // Files dropped onto the terminal arrive as a bracketed paste.
                Event::Paste(text) => {
                    let paths = parse_dropped_paths(&text);
                    debug!(paths = paths.len(), "paths dropped");
                    start_ingest(app, paths, &settings.ingest, channels.ingest_tx);
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    ingest_tx: &Sender<IngestEvent>,
) -> bool {
    if app.notice.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.dismiss_notice();
        }
        return false;
    }

    if app.input_active {
        handle_input_key(key, settings, app, ingest_tx);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            app.navigate(Page::ALL[idx]);
        }
        KeyCode::Tab => app.cycle_page(),
        KeyCode::Char('/') => app.navigate(Page::Search),
        KeyCode::Char('u') => app.navigate(Page::Upload),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter => {
            let already_playing = app.playback.is_playing()
                && app.selected_song().map(|s| &s.id) == app.playback.current_id();
            if !already_playing {
                app.play_selected();
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => app.toggle_play(),
        KeyCode::Char('l') => app.next_song(),
        KeyCode::Char('h') => app.prev_song(),
        KeyCode::Char('L') => app.playback.seek_by(settings.controls.scrub_seconds as f64),
        KeyCode::Char('H') => app.playback.seek_by(-(settings.controls.scrub_seconds as f64)),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_volume(settings.audio.volume_step),
        KeyCode::Char('-') => app.change_volume(-settings.audio.volume_step),
        KeyCode::Char('K') => app.toggle_metadata_window(),
        KeyCode::Esc if app.metadata_window => app.toggle_metadata_window(),
        _ => {}
    }

    false
}

/// Keys while the Search or Upload input line has focus.
fn handle_input_key(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    ingest_tx: &Sender<IngestEvent>,
) {
    match key.code {
        KeyCode::Esc => app.input_active = false,
        KeyCode::Tab => app.cycle_page(),
        KeyCode::Backspace => app.pop_input_char(),
        KeyCode::Down => app.select_next(),
        KeyCode::Up => app.select_prev(),
        KeyCode::Enter => match app.page {
            Page::Upload => {
                let paths = app.take_upload_paths();
                start_ingest(app, paths, &settings.ingest, ingest_tx);
            }
            // Leave the query line for the result list.
            _ => app.input_active = false,
        },
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if !c.is_control() {
                app.push_input_char(c);
            }
        }
        _ => {}
    }
}
