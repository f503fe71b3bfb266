use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::PlayerError;
use crate::library::Track;

use super::kv::KeyValueStore;
use super::model::{DEFAULT_VOLUME, ExportBundle, PlaylistSettings, PlaylistState};

const TRACKS_KEY: &str = "tunebox_tracks";
const CURRENT_TRACK_KEY: &str = "tunebox_current_track";
const VOLUME_KEY: &str = "tunebox_volume";
const PLAYLIST_KEY: &str = "tunebox_playlist_state";

/// Persists playlist slots as JSON.
///
/// Nothing here fails the caller: reads log and fall back to the default,
/// writes log and report `false`.
pub struct TrackStore<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> TrackStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn backend(&self) -> &S {
        &self.kv
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PlayerError> {
        match self.kv.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn read_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.read(key) {
            Ok(Some(v)) => v,
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "failed to read slot, using default");
                default
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .map_err(PlayerError::from)
            .and_then(|raw| self.kv.set(key, &raw));
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to write slot");
                false
            }
        }
    }

    pub fn load_tracks(&self) -> Vec<Track> {
        self.read_or(TRACKS_KEY, Vec::new())
    }

    pub fn save_tracks(&mut self, tracks: &[Track]) -> bool {
        self.write(TRACKS_KEY, tracks)
    }

    pub fn load_current_track_id(&self) -> Option<String> {
        self.read_or(CURRENT_TRACK_KEY, None)
    }

    pub fn save_current_track_id(&mut self, id: Option<&str>) -> bool {
        self.write(CURRENT_TRACK_KEY, &id)
    }

    pub fn load_volume(&self) -> f32 {
        let v: f32 = self.read_or(VOLUME_KEY, DEFAULT_VOLUME);
        if v.is_finite() {
            v.clamp(0.0, 1.0)
        } else {
            DEFAULT_VOLUME
        }
    }

    pub fn save_volume(&mut self, volume: f32) -> bool {
        self.write(VOLUME_KEY, &volume)
    }

    pub fn load_playlist_settings(&self) -> PlaylistSettings {
        self.read_or(PLAYLIST_KEY, PlaylistSettings::default())
    }

    pub fn save_playlist_settings(&mut self, settings: &PlaylistSettings) -> bool {
        self.write(PLAYLIST_KEY, settings)
    }

    /// Load all four slots.
    pub fn load_state(&self) -> PlaylistState {
        PlaylistState {
            tracks: self.load_tracks(),
            current_track_id: self.load_current_track_id(),
            volume: self.load_volume(),
            settings: self.load_playlist_settings(),
        }
    }

    /// Persist all four slots; `true` only if every write succeeded.
    pub fn save_state(&mut self, state: &PlaylistState) -> bool {
        let tracks = self.save_tracks(&state.tracks);
        let current = self.save_current_track_id(state.current_track_id.as_deref());
        let volume = self.save_volume(state.volume);
        let settings = self.save_playlist_settings(&state.settings);
        tracks && current && volume && settings
    }

    /// Bundle every slot, as currently stored, into one JSON document.
    pub fn export_data(&self) -> String {
        let bundle = ExportBundle {
            tracks: Some(self.load_tracks()),
            current_track_id: Some(self.load_current_track_id()),
            volume: Some(self.load_volume()),
            playlist_state: Some(self.load_playlist_settings()),
            exported_at: Some(Utc::now()),
        };
        serde_json::to_string_pretty(&bundle).unwrap_or_else(|e| {
            warn!(error = %e, "failed to serialise export");
            "{}".to_string()
        })
    }

    /// Overwrite each slot present in `json`. Returns `false` when the
    /// document cannot be parsed or a write fails.
    pub fn import_data(&mut self, json: &str) -> bool {
        let bundle: ExportBundle = match serde_json::from_str(json) {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "rejecting malformed import");
                return false;
            }
        };

        let mut ok = true;
        if let Some(tracks) = &bundle.tracks {
            ok &= self.save_tracks(tracks);
        }
        if let Some(current) = &bundle.current_track_id {
            ok &= self.save_current_track_id(current.as_deref());
        }
        if let Some(volume) = bundle.volume {
            ok &= self.save_volume(volume.clamp(0.0, 1.0));
        }
        if let Some(settings) = &bundle.playlist_state {
            ok &= self.save_playlist_settings(settings);
        }
        ok
    }

    /// Remove every slot.
    pub fn clear_all(&mut self) -> bool {
        let mut ok = true;
        for key in [TRACKS_KEY, CURRENT_TRACK_KEY, VOLUME_KEY, PLAYLIST_KEY] {
            if let Err(e) = self.kv.remove(key) {
                warn!(key, error = %e, "failed to clear slot");
                ok = false;
            }
        }
        ok
    }
}
