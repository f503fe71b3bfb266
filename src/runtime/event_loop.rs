use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, PromptKind};
use crate::audio::AudioPlatform;
use crate::config;
use crate::store::KeyValueStore;
use crate::ui;

/// Two-key prefixes (`gg`, `zz`) waiting for their second key.
#[derive(Default)]
pub struct EventLoopState {
    pending_gg: bool,
    pending_zz: bool,
}

/// Main terminal event loop: input, playback events and one redraw per
/// frame. Returns `Ok(())` when the user quits.
pub fn run<P: AudioPlatform, S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App<P, S>,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame_interval = Duration::from_secs(1) / settings.ui.frame_rate.max(1);
    let mut state = EventLoopState::default();
    let mut next_frame = Instant::now();

    loop {
        let now = Instant::now();
        app.tick(now);

        if now >= next_frame {
            app.frame();
            terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;
            next_frame = now + frame_interval;
        }

        let wait = next_frame.saturating_duration_since(Instant::now());
        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, &mut state) {
                    break;
                }
                // Show the effect of a key press without waiting a frame.
                next_frame = Instant::now();
            }
        }
    }

    Ok(())
}

/// Apply one key press. Returns `true` when the user asked to quit.
fn handle_key_event<P: AudioPlatform, S: KeyValueStore>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App<P, S>,
    state: &mut EventLoopState,
) -> bool {
    if app.prompt().is_some() {
        match key.code {
            KeyCode::Esc => app.cancel_prompt(),
            KeyCode::Enter => app.submit_prompt(),
            KeyCode::Backspace => {
                if let Some(prompt) = app.prompt_mut() {
                    prompt.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(prompt) = app.prompt_mut() {
                    prompt.push(c);
                }
            }
            _ => {}
        }
        return false;
    }

    let gg = std::mem::take(&mut state.pending_gg);
    let zz = std::mem::take(&mut state.pending_zz);

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('g') => {
            if gg {
                app.cursor_top();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.cursor_bottom(),
        KeyCode::Char('z') => {
            if zz {
                app.cursor_to_current();
            } else {
                state.pending_zz = true;
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(),
        KeyCode::Char('J') => app.move_selected_down(),
        KeyCode::Char('K') => app.move_selected_up(),
        KeyCode::Enter => app.play_selected(),
        KeyCode::Char('p') | KeyCode::Char(' ') => app.toggle_play_pause(),
        KeyCode::Char('l') => app.next(),
        KeyCode::Char('h') => app.previous(),
        KeyCode::Char('L') | KeyCode::Right => {
            app.seek_relative(settings.controls.seek_step_percent, 1);
        }
        KeyCode::Char('H') | KeyCode::Left => {
            app.seek_relative(settings.controls.seek_step_percent, -1);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.change_volume(settings.controls.volume_step);
        }
        KeyCode::Char('-') => {
            app.change_volume(-settings.controls.volume_step);
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            app.remove_track(app.selected);
        }
        KeyCode::Char('a') => app.open_prompt(PromptKind::AddPath),
        KeyCode::Char('e') => app.open_prompt(PromptKind::Export),
        KeyCode::Char('i') => app.open_prompt(PromptKind::Import),
        KeyCode::Char('s') => {
            app.toggle_shuffle();
        }
        KeyCode::Char('r') => {
            app.cycle_repeat();
        }
        KeyCode::Esc => app.clear_status(),
        _ => {}
    }

    false
}
