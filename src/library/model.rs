use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the playlist.
///
/// `duration` is 0 until the decoder reports real metadata; it is then
/// written once, in place, without touching `id` or the track's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub name: String,
    /// Playable reference: absolute path of the audio file.
    pub source: PathBuf,
    /// Seconds; 0.0 means unknown.
    pub duration: f64,
    pub size: u64,
    pub mime: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Track {
    pub fn has_duration(&self) -> bool {
        self.duration > 0.0
    }
}
