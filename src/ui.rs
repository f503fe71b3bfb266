//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::audio::{AudioPlatform, ContextState};
use crate::config::{ControlsSettings, UiSettings};
use crate::playback::PlaybackState;
use crate::store::{KeyValueStore, RepeatMode};
use crate::visualizer::SpectrumWidget;

const SPECTRUM_HEIGHT: u16 = 10;

/// Render the controls help text, incorporating the seek step.
fn controls_text(controls: &ControlsSettings) -> String {
    [
        ("j/k", "up/down".to_string()),
        ("gg/G", "top/bottom".to_string()),
        ("enter", "play selected".to_string()),
        ("space/p", "play/pause".to_string()),
        ("h/l", "prev/next".to_string()),
        ("H/L", format!("seek -/+{}%", controls.seek_step_percent)),
        ("-/+", "volume".to_string()),
        ("J/K", "move track".to_string()),
        ("zz", "jump to current".to_string()),
        ("d", "remove".to_string()),
        ("a", "add".to_string()),
        ("e/i", "export/import".to_string()),
        ("s", "shuffle".to_string()),
        ("r", "repeat".to_string()),
        ("q", "quit".to_string()),
    ]
    .iter()
    .map(|(k, v)| format!("[{k}] {v}"))
    .collect::<Vec<String>>()
    .join(" | ")
}

/// Format seconds as `MM:SS`; negative or non-finite input shows `00:00`.
pub fn format_time(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn repeat_text(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::None => "REPEAT: Off",
        RepeatMode::All => "REPEAT: All",
        RepeatMode::One => "REPEAT: One",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// First visible row and the selected row within a window of `height`.
fn visible_window(total: usize, selected: usize, height: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected.min(total.saturating_sub(1)));
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn status_text<P: AudioPlatform, S: KeyValueStore>(app: &App<P, S>) -> String {
    let mut parts: Vec<String> = Vec::new();
    let playback = app.playback();

    parts.push(format!(" {}", app.playback_state().label()));
    if let Some(track) = app.current_track() {
        let total = if playback.duration() > 0.0 {
            playback.duration()
        } else {
            track.duration
        };
        parts.push(format!(
            "Song: {} [{} / {}]",
            track.name,
            format_time(playback.current_time()),
            format_time(total)
        ));
    }

    let settings = &app.playlist().settings;
    parts.push(format!("VOL: {:.0}%", app.playlist().volume * 100.0));
    parts.push(repeat_text(settings.repeat).to_string());
    parts.push(if settings.shuffle {
        "SHUFFLE: On".to_string()
    } else {
        "SHUFFLE: Off".to_string()
    });

    if app.graph().context_state() == Some(ContextState::Suspended) {
        parts.push("OUTPUT: Suspended".to_string());
    }
    if app.playback_state() == PlaybackState::Errored {
        if let Some(err) = playback.error() {
            parts.push(err.to_string());
        }
    }
    if let Some(msg) = app.status() {
        parts.push(msg.to_string());
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw<P: AudioPlatform, S: KeyValueStore>(
    frame: &mut Frame,
    app: &App<P, S>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let spectrum_height = if ui_settings.show_visualizer {
        SPECTRUM_HEIGHT
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(spectrum_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" tunebox ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(app))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Track list: only build items for the visible window.
    {
        let tracks = app.tracks();
        let current = app.playlist().current_index();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let (start, end, selected_in_view) =
            visible_window(tracks.len(), app.selected, list_height);

        let items: Vec<ListItem> = tracks[start..end]
            .iter()
            .enumerate()
            .map(|(offset, track)| {
                let marker = if current == Some(start + offset) {
                    "♪ "
                } else {
                    "  "
                };
                let length = if track.has_duration() {
                    format!("  ({})", format_time(track.duration))
                } else {
                    String::new()
                };
                ListItem::new(format!("{marker}{}{length}", track.name))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if !tracks.is_empty() {
            state.select(Some(selected_in_view));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    if ui_settings.show_visualizer {
        let magnitudes = app.visualizer().frame().unwrap_or(&[]);
        let spectrum = SpectrumWidget::new(magnitudes)
            .block(Block::default().borders(Borders::ALL).title(" spectrum "));
        frame.render_widget(spectrum, chunks[3]);
    }

    if let Some(prompt) = app.prompt() {
        let area = centered_rect_sized(72, 3, chunks[2]);
        frame.render_widget(Clear, area);
        let input = Paragraph::new(format!("{}▏", prompt.input)).bold().block(
            Block::default()
                .borders(Borders::ALL)
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(prompt.kind.title())
                .title_bottom(" enter confirms, esc cancels "),
        );
        frame.render_widget(input, area);
    }

    let footer = Paragraph::new(controls_text(controls_settings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(59.9), "00:59");
        assert_eq!(format_time(61.0), "01:01");
        assert_eq!(format_time(3_600.0), "60:00");
        assert_eq!(format_time(-4.0), "00:00");
        assert_eq!(format_time(f64::NAN), "00:00");
    }

    #[test]
    fn window_keeps_the_selection_centered() {
        assert_eq!(visible_window(5, 3, 10), (0, 5, 3));
        assert_eq!(visible_window(100, 50, 10), (45, 55, 5));
        assert_eq!(visible_window(100, 2, 10), (0, 10, 2));
        assert_eq!(visible_window(100, 99, 10), (90, 100, 9));
        assert_eq!(visible_window(0, 0, 10), (0, 0, 0));
    }

    #[test]
    fn controls_mention_the_seek_step() {
        let controls = ControlsSettings {
            seek_step_percent: 10,
            ..ControlsSettings::default()
        };
        assert!(controls_text(&controls).contains("[H/L] seek -/+10%"));
    }
}
