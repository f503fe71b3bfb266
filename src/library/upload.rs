use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

/// MIME type a file declares through its extension.
pub fn declared_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "aif" | "aiff" => "audio/aiff",
        "weba" => "audio/webm",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => return None,
    };
    Some(mime)
}

fn has_fallback_extension(path: &Path, settings: &LibrarySettings) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .any(|e| !e.is_empty() && e == ext)
}

/// Decide whether `path` is accepted as audio, and with which type string.
///
/// The declared type wins when it is `audio/*`; otherwise the configured
/// extension list is the fallback. Anything else is skipped.
pub fn accepted_mime(path: &Path, settings: &LibrarySettings) -> Option<String> {
    match declared_mime(path) {
        Some(m) if m.starts_with("audio/") => Some(m.to_string()),
        declared => {
            if has_fallback_extension(path, settings) {
                Some(declared.unwrap_or("audio/unknown").to_string())
            } else {
                None
            }
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build a fresh `Track` for one accepted file.
pub fn track_from_file(path: &Path, mime: String) -> Track {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let source = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    Track {
        id: Uuid::new_v4().to_string(),
        name,
        source,
        duration: 0.0,
        size,
        mime,
        uploaded_at: Utc::now(),
    }
}

fn expand(path: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    if !path.is_dir() {
        return vec![path.to_path_buf()];
    }

    let mut walker = WalkDir::new(path)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

/// Turn a set of user-supplied paths into tracks, in the given order.
///
/// Directories are walked in file-name order. Files that are not audio are
/// skipped without a message.
pub fn upload<P: AsRef<Path>>(paths: &[P], settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks = Vec::new();
    for root in paths {
        for file in expand(root.as_ref(), settings) {
            if !file.is_file() {
                debug!(path = %file.display(), "skipping missing upload");
                continue;
            }
            match accepted_mime(&file, settings) {
                Some(mime) => tracks.push(track_from_file(&file, mime)),
                None => debug!(path = %file.display(), "skipping non-audio upload"),
            }
        }
    }
    tracks
}
