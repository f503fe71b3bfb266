use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use tempfile::tempdir;

use super::kv::{FileStore, KeyValueStore, MemoryStore};
use super::model::{PlaylistSettings, PlaylistState, RepeatMode};
use super::track_store::TrackStore;
use crate::library::Track;

fn t(id: &str, duration: f64) -> Track {
    Track {
        id: id.into(),
        name: format!("song-{id}"),
        source: PathBuf::from(format!("/music/{id}.mp3")),
        duration,
        size: 1024,
        mime: "audio/mpeg".into(),
        uploaded_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

#[test]
fn missing_slots_read_as_documented_defaults() {
    let store = TrackStore::new(MemoryStore::new());
    assert!(store.load_tracks().is_empty());
    assert_eq!(store.load_current_track_id(), None);
    assert!((store.load_volume() - 0.7).abs() < f32::EPSILON);
    assert_eq!(
        store.load_playlist_settings(),
        PlaylistSettings {
            shuffle: false,
            repeat: RepeatMode::None,
            current_index: 0,
        }
    );
}

#[test]
fn failing_backend_falls_back_and_reports_false() {
    let mut kv = MemoryStore::new();
    kv.fail = true;
    let mut store = TrackStore::new(kv);

    assert!(!store.save_tracks(&[t("a", 0.0)]));
    assert!(!store.save_volume(0.3));
    assert!(store.load_tracks().is_empty());
    assert!((store.load_volume() - 0.7).abs() < f32::EPSILON);
}

#[test]
fn corrupt_slot_reads_as_default() {
    let mut kv = MemoryStore::new();
    kv.set("tunebox_tracks", "{ not json").unwrap();
    kv.set("tunebox_volume", "\"loud\"").unwrap();
    let store = TrackStore::new(kv);

    assert!(store.load_tracks().is_empty());
    assert!((store.load_volume() - 0.7).abs() < f32::EPSILON);
}

#[test]
fn playlist_settings_use_camel_case_and_lowercase_repeat() {
    let mut store = TrackStore::new(MemoryStore::new());
    let settings = PlaylistSettings {
        shuffle: true,
        repeat: RepeatMode::All,
        current_index: 2,
    };
    assert!(store.save_playlist_settings(&settings));

    let raw = store.backend().get("tunebox_playlist_state").unwrap().unwrap();
    assert!(raw.contains("\"currentIndex\":2"));
    assert!(raw.contains("\"repeat\":\"all\""));
    assert_eq!(store.load_playlist_settings(), settings);
}

#[test]
fn export_then_import_reproduces_state() {
    let state = PlaylistState {
        tracks: vec![t("a", 12.5), t("b", 0.0)],
        current_track_id: Some("b".into()),
        volume: 0.25,
        settings: PlaylistSettings {
            shuffle: true,
            repeat: RepeatMode::One,
            current_index: 1,
        },
    };

    let mut source = TrackStore::new(MemoryStore::new());
    assert!(source.save_state(&state));
    let doc = source.export_data();
    assert!(doc.contains("exportedAt"));

    let mut target = TrackStore::new(MemoryStore::new());
    assert!(target.import_data(&doc));
    assert_eq!(target.load_state(), state);
}

#[test]
fn import_only_overwrites_present_fields() {
    let mut store = TrackStore::new(MemoryStore::new());
    store.save_tracks(&[t("keep", 1.0)]);
    store.save_current_track_id(Some("keep"));
    store.save_volume(0.4);

    assert!(store.import_data(r#"{ "volume": 0.9 }"#));
    assert_eq!(store.load_tracks().len(), 1);
    assert_eq!(store.load_current_track_id().as_deref(), Some("keep"));
    assert!((store.load_volume() - 0.9).abs() < f32::EPSILON);

    assert!(store.import_data(r#"{ "currentTrackId": null }"#));
    assert_eq!(store.load_current_track_id(), None);
    assert_eq!(store.load_tracks().len(), 1);
}

#[test]
fn import_rejects_malformed_documents() {
    let mut store = TrackStore::new(MemoryStore::new());
    store.save_volume(0.4);
    assert!(!store.import_data("not json"));
    assert!((store.load_volume() - 0.4).abs() < f32::EPSILON);
}

#[test]
fn file_store_persists_across_instances_and_clears() {
    let dir = tempdir().unwrap();
    {
        let mut store = TrackStore::new(FileStore::open(dir.path()).unwrap());
        assert!(store.save_tracks(&[t("a", 3.0)]));
        assert!(store.save_current_track_id(Some("a")));
    }

    let mut store = TrackStore::new(FileStore::open(dir.path()).unwrap());
    assert_eq!(store.load_tracks(), vec![t("a", 3.0)]);
    assert_eq!(store.load_current_track_id().as_deref(), Some("a"));

    assert!(store.clear_all());
    assert!(store.load_tracks().is_empty());
    assert!(store.clear_all());
}

#[test]
fn file_store_sanitises_keys() {
    let dir = tempdir().unwrap();
    let mut kv = FileStore::open(dir.path()).unwrap();
    kv.set("../escape", "1").unwrap();
    assert!(dir.path().join("___escape.json").exists());
    assert_eq!(kv.get("../escape").unwrap().as_deref(), Some("1"));
}
