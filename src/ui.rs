//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use chrono::Timelike;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Page, greeting};
use crate::audio::PlaybackState;
use crate::config::Settings;
use crate::format::format_duration;
use crate::library::{Song, formats_phrase, row_from_fields};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("1-4/tab".to_string(), "pages".to_string());
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("enter".to_string(), "play selected song".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next song".to_string());
    // H/L is filled dynamically from config.
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("/".to_string(), "search".to_string());
    map.insert("u".to_string(), "upload".to_string());
    map.insert("K".to_string(), "details".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "1-4/tab", "j/k", "h/l", "H/L", "enter", "space/p", "+/-", "/", "u", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] seek -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn left_pad() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

fn state_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Idle => "Stopped",
        PlaybackState::Loading => "Loading",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
    }
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, settings: &Settings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" streamsic ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(1)])
        .split(chunks[1]);

    draw_sidebar(frame, app, body[0]);

    let display = app.visible_indices();
    match app.page {
        Page::Home => draw_home(frame, app, &display, settings, body[1]),
        Page::Search => draw_search(frame, app, &display, settings, body[1]),
        Page::Library => {
            let title = format!(" Your Library ({}) ", app.library.len());
            let hint = empty_library_hint(settings);
            draw_song_list(frame, app, &display, &title, &hint, settings, body[1]);
        }
        Page::Upload => draw_upload(frame, app, settings, body[1]),
    }

    draw_player_bar(frame, app, chunks[2]);

    // Overlays stay inside the page area so header/player/footer remain visible.
    if app.metadata_window {
        draw_details(frame, app, body[1]);
    }
    if let Some(notice) = &app.notice {
        let area = centered_rect_sized(64, 5, body[1]);
        frame.render_widget(Clear, area);
        let p = Paragraph::new(notice.as_str())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .padding(left_pad())
                    .title(" notice (esc closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(p, area);
    }

    let footer = Paragraph::new(controls_text(settings.controls.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_pad()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let mut items: Vec<ListItem> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, p)| ListItem::new(format!("{} {}", i + 1, p.title())))
        .collect();
    items.push(ListItem::new(""));
    items.push(ListItem::new("PLAYLISTS").bold());
    items.push(ListItem::new("  No playlists yet").dim());

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" STREAMSIC ")
                .title_alignment(Alignment::Center),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Page::ALL.iter().position(|p| *p == app.page));
    frame.render_stateful_widget(list, area, &mut state);
}

fn empty_library_hint(settings: &Settings) -> String {
    format!(
        "Your collection is empty. Press u to upload {} files.",
        formats_phrase(&settings.ingest)
    )
}

fn draw_home(frame: &mut Frame, app: &App, display: &[usize], settings: &Settings, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let hour = chrono::Local::now().hour();
    let hello = Paragraph::new(greeting(hour))
        .bold()
        .block(Block::default().borders(Borders::ALL).padding(left_pad()));
    frame.render_widget(hello, parts[0]);

    let hint = empty_library_hint(settings);
    draw_song_list(frame, app, display, " All Songs ", &hint, settings, parts[1]);
}

fn input_line(label: &str, text: &str, active: bool) -> String {
    if active {
        format!("{label}{text}_")
    } else {
        format!("{label}{text}")
    }
}

fn draw_search(frame: &mut Frame, app: &App, display: &[usize], settings: &Settings, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let input = Paragraph::new(input_line("/ ", &app.search_query, app.input_active)).block(
        Block::default()
            .borders(Borders::ALL)
            .padding(left_pad())
            .title(" What do you want to listen to? "),
    );
    frame.render_widget(input, parts[0]);

    let title = if app.search_query.is_empty() {
        " Browse all music ".to_string()
    } else {
        format!(" Results for \"{}\" ", app.search_query)
    };
    let hint = if app.library.is_empty() {
        empty_library_hint(settings)
    } else {
        "No results found. Try a different title, artist or album.".to_string()
    };
    draw_song_list(frame, app, display, &title, &hint, settings, parts[1]);
}

fn draw_upload(frame: &mut Frame, app: &App, settings: &Settings, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let formats = formats_phrase(&settings.ingest);
    let mut lines = vec![
        "Drop files or folders onto this window, or type paths below and press enter.".to_string(),
        String::new(),
        format!("Supported formats: {formats}"),
    ];
    if app.is_ingesting() {
        lines.push(String::new());
        lines.push("Importing...".to_string());
    }
    let info = Paragraph::new(lines.join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .padding(left_pad())
                .title(" Upload Music "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(info, parts[0]);

    let input = Paragraph::new(input_line("> ", &app.upload_input, app.input_active))
        .block(Block::default().borders(Borders::ALL).padding(left_pad()).title(" paths "));
    frame.render_widget(input, parts[1]);
}

fn draw_song_list(
    frame: &mut Frame,
    app: &App,
    display: &[usize],
    title: &str,
    empty_hint: &str,
    settings: &Settings,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    if display.is_empty() {
        let p = Paragraph::new(empty_hint)
            .dim()
            .block(block.padding(left_pad()))
            .wrap(Wrap { trim: true });
        frame.render_widget(p, area);
        return;
    }

    // Only build items for the window around the cursor.
    let total = display.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = sel_pos.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let current = app.playback.current_id();
    let items: Vec<ListItem> = display[start..end]
        .iter()
        .filter_map(|&i| app.library.get(i))
        .map(|song| {
            let row = row_from_fields(song, &settings.ui.row_fields, &settings.ui.row_separator);
            if current == Some(&song.id) {
                ListItem::new(format!("♪ {row}")).bold()
            } else {
                ListItem::new(format!("  {row}"))
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(selected_pos_in_visible));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_player_bar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .padding(left_pad())
        .title(" now playing ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let playback = &app.playback;
    let Some(song) = playback.current_song(&app.library) else {
        let idle = Paragraph::new("Nothing playing").dim();
        frame.render_widget(idle, rows[0]);
        return;
    };

    let art = if song.artwork.is_some() { "[art]" } else { "[ - ]" };
    let mut parts = vec![
        format!("{art} {} - {}", song.title, song.artist),
        state_label(playback.state()).to_string(),
        format!("Vol {:.0}%", playback.volume() * 100.0),
    ];
    if let Some(q) = song.quality_descriptor() {
        parts.push(q);
    }
    frame.render_widget(Paragraph::new(parts.join(" • ")), rows[0]);

    let total = playback
        .duration()
        .map(format_duration)
        .unwrap_or_else(|| song.duration.clone());
    let label = format!("{} / {}", format_duration(playback.progress()), total);
    let ratio = match playback.duration() {
        Some(d) if d > 0.0 => (playback.progress() / d).clamp(0.0, 1.0),
        _ => 0.0,
    };
    let gauge = Gauge::default().ratio(ratio).label(label);
    frame.render_widget(gauge, rows[1]);
}

/// Every field of the song under the cursor, or the playing song when the
/// page lists none.
fn details_text(song: &Song) -> String {
    let quality = song.quality_descriptor().unwrap_or_else(|| "-".to_string());
    let artwork = song.artwork_mime().unwrap_or("none");
    format!(
        "Title: {}\nArtist: {}\nAlbum: {}\nDuration: {}\nQuality: {}\nArtwork: {}\nPath: {}\nId: {}",
        song.title,
        song.artist,
        song.album,
        song.duration,
        quality,
        artwork,
        song.source.display(),
        song.id
    )
}

fn draw_details(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_sized(72, 11, area);
    frame.render_widget(Clear, popup_area);

    let song = app
        .selected_song()
        .or_else(|| app.playback.current_song(&app.library));
    let meta = song
        .map(details_text)
        .unwrap_or_else(|| "No song selected".to_string());
    let p = Paragraph::new(meta)
        .block(
            Block::default()
                .padding(left_pad())
                .borders(Borders::ALL)
                .title(" details (K closes) "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(p, popup_area);
}
