use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::library::Track;

pub const DEFAULT_VOLUME: f32 = 0.7;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Keep going in playlist order, wrapping at the end.
    #[default]
    None,
    /// Replay the current track when it ends.
    One,
    /// Wrap at the end of the playlist.
    All,
}

impl RepeatMode {
    /// Cycle `None -> All -> One -> None`.
    pub fn cycled(self) -> Self {
        match self {
            Self::None => Self::All,
            Self::All => Self::One,
            Self::One => Self::None,
        }
    }
}

/// The persisted `playlistState` slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistSettings {
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub current_index: usize,
}

/// Everything the player persists, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistState {
    pub tracks: Vec<Track>,
    pub current_track_id: Option<String>,
    pub volume: f32,
    pub settings: PlaylistSettings,
}

impl Default for PlaylistState {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            current_track_id: None,
            volume: DEFAULT_VOLUME,
            settings: PlaylistSettings::default(),
        }
    }
}

impl PlaylistState {
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_track_id
            .as_deref()
            .and_then(|id| self.index_of(id))
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index().map(|i| &self.tracks[i])
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }
}

/// Single-document backup of every persisted slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<Track>>,
    /// Outer `None` = field absent; `Some(None)` = explicitly no selection.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_track_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_state: Option<PlaylistSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

fn present<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(d).map(Some)
}
