//! Application root: the playlist plus everything that acts on it.
//!
//! `App` owns the persisted `PlaylistState`, the `TrackStore`, the audio
//! graph, the playback controller and the visualization loop. Every
//! playlist mutation is written back in full before the method returns.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audio::{AudioGraphService, AudioPlatform, ContextState, clamp_volume};
use crate::config::{LibrarySettings, Settings};
use crate::error::PlayerError;
use crate::library::{Track, upload};
use crate::playback::{
    PlaybackController, PlaybackNotice, PlaybackState, next_index, prev_index, shuffled_index,
};
use crate::store::{KeyValueStore, PlaylistState, RepeatMode, TrackStore};
use crate::visualizer::VisualizationLoop;

use super::prompt::{Prompt, PromptKind};

pub struct App<P: AudioPlatform, S: KeyValueStore> {
    playlist: PlaylistState,
    store: TrackStore<S>,
    graph: AudioGraphService<P>,
    controller: PlaybackController,
    visualizer: VisualizationLoop,
    library: LibrarySettings,

    /// Cursor in the track list; independent of the current track.
    pub selected: usize,
    status: Option<String>,
    prompt: Option<Prompt>,

    suspend_after: Option<Duration>,
    idle_since: Option<Instant>,
}

impl<P: AudioPlatform, S: KeyValueStore> App<P, S> {
    /// Build the root from persisted state and put the cursor on the
    /// current track. The current track is loaded but not started, and the
    /// output device stays closed until the first play.
    pub fn new(platform: P, store: TrackStore<S>, settings: &Settings) -> Self {
        let playlist = store.load_state();
        let time_update = Duration::from_millis(settings.audio.time_update_ms.max(1));
        let suspend_after = match settings.audio.suspend_after_idle_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let mut app = Self {
            playlist,
            store,
            graph: AudioGraphService::new(platform),
            controller: PlaybackController::new(time_update),
            visualizer: VisualizationLoop::new(),
            library: settings.library.clone(),
            selected: 0,
            status: None,
            prompt: None,
            suspend_after,
            idle_since: None,
        };

        info!(
            tracks = app.playlist.tracks.len(),
            current = ?app.playlist.current_track_id,
            "playlist restored"
        );
        // Nothing is bound yet; the controller keeps the level for later.
        let _ = app.controller.set_volume(&mut app.graph, app.playlist.volume);
        app.restore_current();
        app
    }

    fn restore_current(&mut self) {
        match self.playlist.current_index() {
            Some(idx) => {
                self.selected = idx;
                self.load_index(idx);
            }
            None => {
                if self.playlist.current_track_id.take().is_some() {
                    debug!("stored current track is gone; clearing selection");
                    self.persist();
                }
                self.selected = 0;
            }
        }
    }

    pub fn playlist(&self) -> &PlaylistState {
        &self.playlist
    }

    pub fn tracks(&self) -> &[Track] {
        &self.playlist.tracks
    }

    pub fn has_tracks(&self) -> bool {
        !self.playlist.tracks.is_empty()
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn graph(&self) -> &AudioGraphService<P> {
        &self.graph
    }

    pub fn store(&self) -> &TrackStore<S> {
        &self.store
    }

    pub fn visualizer(&self) -> &VisualizationLoop {
        &self.visualizer
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.current_track()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // ---- persistence ----

    fn persist(&mut self) {
        self.playlist.settings.current_index = self.playlist.current_index().unwrap_or(0);
        if !self.store.save_state(&self.playlist) {
            self.set_status("could not save playlist");
        }
    }

    // ---- playlist mutations ----

    /// Import files and directories; returns how many tracks were added.
    ///
    /// If nothing was current, the first new track becomes current and is
    /// loaded without starting playback.
    pub fn add_paths<T: AsRef<Path>>(&mut self, paths: &[T]) -> usize {
        let added = upload(paths, &self.library);
        if added.is_empty() {
            self.set_status("no audio files found");
            return 0;
        }

        let count = added.len();
        let first_new = self.playlist.tracks.len();
        self.playlist.tracks.extend(added);
        info!(count, "tracks added");

        if self.playlist.current_index().is_none() {
            self.playlist.current_track_id = Some(self.playlist.tracks[first_new].id.clone());
            self.selected = first_new;
            self.persist();
            self.load_index(first_new);
        } else {
            self.persist();
        }

        self.set_status(format!(
            "added {count} track{}",
            if count == 1 { "" } else { "s" }
        ));
        count
    }

    /// Remove the track at `index`. Removing the current track stops
    /// playback and clears the selection.
    pub fn remove_track(&mut self, index: usize) -> Option<Track> {
        if index >= self.playlist.tracks.len() {
            return None;
        }
        let removed = self.playlist.tracks.remove(index);

        if self.playlist.current_track_id.as_deref() == Some(removed.id.as_str()) {
            self.controller.unload(&mut self.graph);
            self.visualizer.stop();
            self.playlist.current_track_id = None;
        }

        let len = self.playlist.tracks.len();
        if index < self.selected {
            self.selected -= 1;
        }
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        self.persist();
        debug!(track = %removed.id, "track removed");
        Some(removed)
    }

    /// Move the track at `from` to position `to`; the cursor follows it.
    pub fn move_track(&mut self, from: usize, to: usize) -> bool {
        let len = self.playlist.tracks.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let track = self.playlist.tracks.remove(from);
        self.playlist.tracks.insert(to, track);
        if self.selected == from {
            self.selected = to;
        }
        self.persist();
        true
    }

    pub fn move_selected_up(&mut self) {
        if self.selected > 0 {
            self.move_track(self.selected, self.selected - 1);
        }
    }

    pub fn move_selected_down(&mut self) {
        self.move_track(self.selected, self.selected + 1);
    }

    /// Forget every track and persisted slot.
    pub fn clear_playlist(&mut self) {
        self.controller.unload(&mut self.graph);
        self.visualizer.stop();
        if !self.store.clear_all() {
            warn!("clearing the store failed");
        }
        let volume = self.playlist.volume;
        self.playlist = PlaylistState {
            volume,
            ..PlaylistState::default()
        };
        self.selected = 0;
        self.persist();
        self.set_status("playlist cleared");
    }

    // ---- selection and transport ----

    fn load_index(&mut self, index: usize) -> bool {
        let Some(track) = self.playlist.tracks.get(index) else {
            return false;
        };
        let track = track.clone();
        self.visualizer.stop();
        match self.controller.load(&mut self.graph, &track) {
            Ok(()) => true,
            Err(e) => {
                self.set_status(e.to_string());
                false
            }
        }
    }

    /// Make the track at `index` current and load it without playing.
    pub fn select_track(&mut self, index: usize) -> bool {
        let Some(track) = self.playlist.tracks.get(index) else {
            return false;
        };
        self.playlist.current_track_id = Some(track.id.clone());
        self.selected = index;
        self.persist();
        self.load_index(index)
    }

    /// Make the track at `index` current and start it.
    pub fn play_track(&mut self, index: usize) {
        if self.select_track(index) {
            self.play();
        }
    }

    /// Play the track under the cursor, unless it is already playing.
    pub fn play_selected(&mut self) {
        let already = self.controller.is_playing()
            && self.playlist.current_index() == Some(self.selected);
        if !already && self.has_tracks() {
            self.play_track(self.selected);
        }
    }

    fn play(&mut self) {
        match self.controller.play(&mut self.graph) {
            Ok(()) => self.clear_status(),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn toggle_play_pause(&mut self) {
        match self.controller.state() {
            PlaybackState::Empty | PlaybackState::Errored => {
                let target = self.playlist.current_index().or(if self.has_tracks() {
                    Some(self.selected.min(self.playlist.tracks.len() - 1))
                } else {
                    None
                });
                match target {
                    Some(idx) => self.play_track(idx),
                    None => self.set_status("playlist is empty"),
                }
            }
            PlaybackState::Playing => self.controller.pause(&mut self.graph),
            _ => self.play(),
        }
    }

    pub fn next(&mut self) {
        let len = self.playlist.tracks.len();
        let current = self.playlist.current_index();
        let target = if self.playlist.settings.shuffle {
            shuffled_index(len, current, &mut rand::rng())
        } else {
            next_index(len, current)
        };
        if let Some(idx) = target {
            self.play_track(idx);
        }
    }

    pub fn previous(&mut self) {
        let target = prev_index(self.playlist.tracks.len(), self.playlist.current_index());
        if let Some(idx) = target {
            self.play_track(idx);
        }
    }

    /// Seek by `steps` multiples of `percent` of the track duration.
    pub fn seek_relative(&mut self, percent: u8, steps: i32) {
        let duration = self.controller.duration();
        if duration <= 0.0 {
            return;
        }
        let fraction =
            self.controller.current_time() / duration + steps as f64 * percent as f64 / 100.0;
        if let Err(e) = self.controller.seek_fraction(&mut self.graph, fraction) {
            self.set_status(e.to_string());
        }
    }

    /// Set the persisted volume; applied to the gain stage when bound.
    pub fn set_volume(&mut self, level: f32) -> f32 {
        let level = clamp_volume(level);
        self.playlist.volume = level;
        let _ = self.controller.set_volume(&mut self.graph, level);
        self.persist();
        level
    }

    pub fn change_volume(&mut self, delta: f32) -> f32 {
        self.set_volume(self.playlist.volume + delta)
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.playlist.settings.repeat = self.playlist.settings.repeat.cycled();
        self.persist();
        self.playlist.settings.repeat
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.playlist.settings.shuffle = !self.playlist.settings.shuffle;
        self.persist();
        self.playlist.settings.shuffle
    }

    // ---- cursor ----

    pub fn cursor_down(&mut self) {
        if let Some(next) = next_index(self.playlist.tracks.len(), Some(self.selected)) {
            self.selected = next;
        }
    }

    pub fn cursor_up(&mut self) {
        if let Some(prev) = prev_index(self.playlist.tracks.len(), Some(self.selected)) {
            self.selected = prev;
        }
    }

    pub fn cursor_top(&mut self) {
        self.selected = 0;
    }

    pub fn cursor_bottom(&mut self) {
        self.selected = self.playlist.tracks.len().saturating_sub(1);
    }

    /// Put the cursor on the current track.
    pub fn cursor_to_current(&mut self) {
        if let Some(idx) = self.playlist.current_index() {
            self.selected = idx;
        }
    }

    // ---- event pumping ----

    /// Apply playback events and housekeeping; call once per loop turn.
    pub fn tick(&mut self, now: Instant) {
        for notice in self.controller.pump_events(&mut self.graph) {
            match notice {
                PlaybackNotice::DurationResolved { track_id, seconds } => {
                    self.resolve_duration(&track_id, seconds);
                }
                PlaybackNotice::Ended { track_id } => self.advance_after(&track_id),
                PlaybackNotice::Failed { message } => self.set_status(message),
            }
        }

        if self.controller.is_playing() {
            self.visualizer.start();
            self.idle_since = None;
        } else {
            self.visualizer.stop();
            self.suspend_if_idle(now);
        }
    }

    /// Sample the spectrum for this redraw.
    pub fn frame(&mut self) -> bool {
        self.visualizer.on_frame(&mut self.graph)
    }

    fn resolve_duration(&mut self, track_id: &str, seconds: f64) {
        let Some(idx) = self.playlist.index_of(track_id) else {
            return;
        };
        let track = &mut self.playlist.tracks[idx];
        if track.has_duration() || seconds <= 0.0 {
            return;
        }
        track.duration = seconds;
        debug!(track = %track_id, seconds, "duration resolved");
        self.persist();
    }

    fn advance_after(&mut self, ended_id: &str) {
        let len = self.playlist.tracks.len();
        if len == 0 {
            self.controller.unload(&mut self.graph);
            return;
        }

        if self.playlist.settings.repeat == RepeatMode::One
            && self.playlist.index_of(ended_id).is_some()
        {
            self.play();
            return;
        }

        let current = self.playlist.index_of(ended_id);
        let target = if self.playlist.settings.shuffle {
            shuffled_index(len, current, &mut rand::rng())
        } else {
            next_index(len, current)
        };
        if let Some(idx) = target {
            debug!(from = %ended_id, to = idx, "auto-advance");
            self.play_track(idx);
        }
    }

    fn suspend_if_idle(&mut self, now: Instant) {
        let Some(limit) = self.suspend_after else {
            return;
        };
        let since = *self.idle_since.get_or_insert(now);
        if now.duration_since(since) >= limit
            && self.graph.context_state() == Some(ContextState::Running)
        {
            debug!("suspending idle audio output");
            self.graph.suspend();
        }
    }

    // ---- backup ----

    pub fn export_to(&mut self, path: &Path) -> Result<(), PlayerError> {
        fs::write(path, self.store.export_data())?;
        info!(path = %path.display(), "playlist exported");
        Ok(())
    }

    /// Overwrite persisted slots from a backup and reload the playlist.
    pub fn import_from(&mut self, path: &Path) -> Result<(), PlayerError> {
        let json = fs::read_to_string(path)?;
        if !self.store.import_data(&json) {
            return Err(PlayerError::StorageFailure(format!(
                "{} is not a playlist backup",
                path.display()
            )));
        }
        info!(path = %path.display(), "playlist imported");

        self.controller.unload(&mut self.graph);
        self.visualizer.stop();
        self.playlist = self.store.load_state();
        self.restore_current();
        Ok(())
    }

    // ---- prompt ----

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt::new(kind));
    }

    pub fn prompt_mut(&mut self) -> Option<&mut Prompt> {
        self.prompt.as_mut()
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Close the prompt and act on its input.
    pub fn submit_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let Some(path) = prompt.path() else {
            return;
        };
        match prompt.kind {
            PromptKind::AddPath => {
                self.add_paths(&[path]);
            }
            PromptKind::Export => match self.export_to(&path) {
                Ok(()) => self.set_status(format!("exported to {}", path.display())),
                Err(e) => self.set_status(e.to_string()),
            },
            PromptKind::Import => match self.import_from(&path) {
                Ok(()) => self.set_status(format!("imported {}", path.display())),
                Err(e) => self.set_status(e.to_string()),
            },
        }
    }

    /// Stop playback, persist and close the audio context.
    pub fn shutdown(&mut self) {
        self.visualizer.stop();
        self.controller.unload(&mut self.graph);
        self.persist();
        self.graph.shutdown();
        info!("shut down");
    }
}
