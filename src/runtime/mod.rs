use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, warn};

use crate::audio::AudioPlayer;
use crate::logging;

mod event_loop;
mod ingest_task;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();

    match logging::init(&settings.logging) {
        Ok(path) => info!(log = %path.display(), "streamsic starting"),
        // Not fatal; the player works without a log.
        Err(e) => eprintln!("streamsic: logging disabled: {e}"),
    }
    if let Some(problem) = config_problem {
        warn!("{problem}");
    }

    let (player, audio_events) = AudioPlayer::new(settings.audio.volume).map_err(|e| {
        error!(error = %e, "cannot open audio output");
        e
    })?;
    let fade_out = Duration::from_millis(settings.audio.quit_fade_out_ms);

    let (ingest_tx, ingest_rx) = mpsc::channel();
    let mut app = startup::build_app(&player, &settings, &ingest_tx);

    if let Err(e) = enable_raw_mode() {
        player.shutdown(Duration::ZERO);
        return Err(e.into());
    }
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let channels = event_loop::Channels {
        audio_events: &audio_events,
        ingest_rx: &ingest_rx,
        ingest_tx: &ingest_tx,
    };
    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &channels);

    player.shutdown(fade_out);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("streamsic stopped");
    run_result
}
